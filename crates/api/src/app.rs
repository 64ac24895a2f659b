use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::models::{Activity, Course, Enrollment, Program, Question, Resource, Subject, Topic};
use domain::services::LanguageContext;
use persistence::DocumentStore;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{courses, enrollments, health, resources, topics, users};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Language selection for a request, falling back to the configured
    /// default when the requested language is not supported.
    pub fn language_context(&self, requested: Option<&str>) -> LanguageContext {
        LanguageContext::from_request(
            requested,
            &self.config.i18n.default_language,
            &self.config.i18n.supported_languages,
        )
    }
}

/// Standard routes for a resource: list/create on the collection path,
/// read/update/delete on the item path, plus soft delete and restore.
fn resource_routes<T: Resource>(path: &str) -> Router<AppState> {
    Router::new()
        .route(path, get(resources::list::<T>).post(resources::create::<T>))
        .route(
            &format!("{path}/:id"),
            get(resources::get_one::<T>)
                .patch(resources::update::<T>)
                .delete(resources::delete::<T>),
        )
        .route(
            &format!("{path}/:id/deactivate"),
            post(resources::deactivate::<T>),
        )
        .route(&format!("{path}/:id/restore"), post(resources::restore::<T>))
}

pub fn create_app(config: Config, store: Arc<dyn DocumentStore>) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        store,
        config: config.clone(),
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let catalog_routes = Router::new()
        .merge(resource_routes::<Program>("/api/v1/programs"))
        .merge(resource_routes::<Subject>("/api/v1/subjects"))
        .merge(resource_routes::<Question>("/api/v1/questions"))
        .merge(resource_routes::<Activity>("/api/v1/activities"))
        // Courses cascade to their topics on delete
        .route(
            "/api/v1/courses",
            get(resources::list::<Course>).post(resources::create::<Course>),
        )
        .route(
            "/api/v1/courses/:id",
            get(resources::get_one::<Course>)
                .patch(resources::update::<Course>)
                .delete(courses::delete_course),
        )
        .route(
            "/api/v1/courses/:id/deactivate",
            post(resources::deactivate::<Course>),
        )
        .route(
            "/api/v1/courses/:id/restore",
            post(resources::restore::<Course>),
        )
        .route("/api/v1/courses/:id/topics", get(courses::list_course_topics))
        // Topics check their course on create; enrollments also guard seats
        .route(
            "/api/v1/topics",
            get(resources::list::<Topic>).post(topics::create_topic),
        )
        .route(
            "/api/v1/topics/:id",
            get(resources::get_one::<Topic>)
                .patch(resources::update::<Topic>)
                .delete(resources::delete::<Topic>),
        )
        .route(
            "/api/v1/topics/:id/deactivate",
            post(resources::deactivate::<Topic>),
        )
        .route(
            "/api/v1/topics/:id/restore",
            post(resources::restore::<Topic>),
        )
        .route(
            "/api/v1/enrollments",
            get(resources::list::<Enrollment>).post(enrollments::create_enrollment),
        )
        .route(
            "/api/v1/enrollments/:id",
            get(resources::get_one::<Enrollment>)
                .patch(enrollments::update_enrollment)
                .delete(resources::delete::<Enrollment>),
        )
        .route(
            "/api/v1/enrollments/:id/deactivate",
            post(resources::deactivate::<Enrollment>),
        )
        .route(
            "/api/v1/enrollments/:id/restore",
            post(enrollments::restore_enrollment),
        )
        .route(
            "/api/v1/users/:id",
            get(users::get_user).put(users::save_user),
        );

    // Public routes (probes and scrape endpoint)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(catalog_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
