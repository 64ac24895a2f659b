//! Generic CRUD handlers shared by every catalog resource.
//!
//! Mounted per entity kind, e.g. `get(resources::list::<Program>)`.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{header::ETAG, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use domain::models::{Record, Resource};
use domain::services::LanguageContext;
use persistence::repositories::{BaseRepository, Page};
use persistence::store::{Filter, Query as StoreQuery};
use serde::{Deserialize, Serialize};
use shared::pagination::decode_cursor;
use tracing::info;

use crate::app::AppState;
use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::extractors::if_match::etag;
use crate::extractors::{Actor, ExpectedVersion, ValidatedJson};
use crate::middleware::metrics::record_resource_write;

const LANG_PARAM: &str = "lang";
const LIMIT_PARAM: &str = "limit";
const CURSOR_PARAM: &str = "cursor";
const INCLUDE_INACTIVE_PARAM: &str = "includeInactive";

/// A stored record plus, when `?lang=` was given, its language-resolved
/// projection.
#[derive(Debug, Serialize)]
pub struct RecordView<T, L> {
    #[serde(flatten)]
    pub record: Record<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localized: Option<L>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListData<V> {
    pub items: Vec<V>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

pub fn view<T: Resource>(record: Record<T>, languages: Option<&LanguageContext>) -> RecordView<T, T::Localized> {
    let localized = languages.map(|ctx| record.fields.localize(ctx));
    RecordView { record, localized }
}

pub fn page_view<T: Resource>(
    page: Page<T>,
    languages: Option<&LanguageContext>,
) -> ListData<RecordView<T, T::Localized>> {
    ListData {
        items: page.items.into_iter().map(|r| view(r, languages)).collect(),
        next_cursor: page.next_cursor,
    }
}

/// Pagination and language parameters common to list endpoints.
#[derive(Debug, Default)]
pub struct ListParams {
    pub lang: Option<String>,
    pub limit: Option<usize>,
    pub cursor: Option<String>,
    pub include_inactive: bool,
    pub filters: Vec<Filter>,
}

impl ListParams {
    /// Split raw query parameters into paging options and equality filters
    /// on the resource's filterable fields. Unknown parameters are rejected.
    pub fn parse(
        mut raw: HashMap<String, String>,
        filterable: &[&str],
    ) -> Result<Self, ApiError> {
        let limit = match raw.remove(LIMIT_PARAM) {
            Some(value) => Some(value.parse::<usize>().map_err(|_| {
                ApiError::Validation("limit must be a positive integer".to_string())
            })?),
            None => None,
        };
        let include_inactive = match raw.remove(INCLUDE_INACTIVE_PARAM) {
            Some(value) => value.parse::<bool>().map_err(|_| {
                ApiError::Validation("includeInactive must be true or false".to_string())
            })?,
            None => false,
        };
        let lang = raw.remove(LANG_PARAM);
        let cursor = raw.remove(CURSOR_PARAM);

        let mut fields: Vec<_> = raw.into_iter().collect();
        fields.sort();
        let mut filters = Vec::with_capacity(fields.len());
        for (field, value) in fields {
            if !filterable.contains(&field.as_str()) {
                return Err(ApiError::Validation(format!(
                    "Unknown query parameter: {}",
                    field
                )));
            }
            filters.push(Filter::eq(field, value));
        }

        Ok(Self {
            lang,
            limit,
            cursor,
            include_inactive,
            filters,
        })
    }

    /// Store query for these parameters, without ordering.
    pub fn to_query(&self) -> Result<StoreQuery, ApiError> {
        let mut query = StoreQuery::new();
        for filter in &self.filters {
            query = query.filter(filter.clone());
        }
        if let Some(cursor) = &self.cursor {
            query = query.start_after(decode_cursor(cursor)?);
        }
        query.limit = self.limit;
        Ok(query)
    }
}

/// List records, newest first.
///
/// GET /api/v1/<resource>?lang=&limit=&cursor=&includeInactive=&<field>=
pub async fn list<T: Resource>(
    State(state): State<AppState>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<ListData<RecordView<T, T::Localized>>>>, ApiError> {
    let params = ListParams::parse(raw, T::FILTERABLE)?;
    let query = params.to_query()?;
    let repo = BaseRepository::<T>::new(state.store.clone());

    let page = if params.include_inactive {
        repo.list(query).await?
    } else {
        repo.list_active(query).await?
    };

    let languages = params.lang.as_deref().map(|l| state.language_context(Some(l)));
    Ok(Json(ApiResponse::ok(page_view(page, languages.as_ref()))))
}

/// Fetch one record. Soft-deleted records are still returned.
///
/// GET /api/v1/<resource>/:id
pub async fn get_one<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(lang): Query<LangQuery>,
) -> Result<(HeaderMap, Json<ApiResponse<RecordView<T, T::Localized>>>), ApiError> {
    let repo = BaseRepository::<T>::new(state.store.clone());
    let record = repo.get_by_id(&id).await?;

    let languages = lang.lang.as_deref().map(|l| state.language_context(Some(l)));
    Ok((
        version_headers(record.version),
        Json(ApiResponse::ok(view(record, languages.as_ref()))),
    ))
}

/// Create a record.
///
/// POST /api/v1/<resource>
pub async fn create<T: Resource>(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(request): ValidatedJson<T::Create>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<RecordView<T, T::Localized>>>), ApiError> {
    let repo = BaseRepository::<T>::new(state.store.clone());
    let record = repo.create(&T::from_create(request), actor.id()).await?;
    created_response::<T>(record)
}

/// Shared tail of create handlers: log, count and wrap the new record.
pub fn created_response<T: Resource>(
    record: Record<T>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<RecordView<T, T::Localized>>>), ApiError> {
    info!(resource = T::NAME, id = %record.id, "Record created");
    record_resource_write(T::NAME, "create");
    Ok((
        StatusCode::CREATED,
        version_headers(record.version),
        Json(ApiResponse::with_message(
            view(record, None),
            format!("{} created", capitalize(T::NAME)),
        )),
    ))
}

/// Partially update a record. Honors `If-Match` when present.
///
/// PATCH /api/v1/<resource>/:id
pub async fn update<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    actor: Actor,
    ExpectedVersion(expected): ExpectedVersion,
    ValidatedJson(request): ValidatedJson<T::Update>,
) -> Result<(HeaderMap, Json<ApiResponse<RecordView<T, T::Localized>>>), ApiError> {
    let repo = BaseRepository::<T>::new(state.store.clone());
    let record = repo
        .update_with_version(&id, &request, expected, actor.id())
        .await?;

    info!(resource = T::NAME, id = %record.id, version = record.version, "Record updated");
    record_resource_write(T::NAME, "update");
    Ok((
        version_headers(record.version),
        Json(ApiResponse::with_message(
            view(record, None),
            format!("{} updated", capitalize(T::NAME)),
        )),
    ))
}

/// Permanently delete a record.
///
/// DELETE /api/v1/<resource>/:id
pub async fn delete<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let repo = BaseRepository::<T>::new(state.store.clone());
    if !repo.exists(&id).await? {
        return Err(ApiError::NotFound(format!("{} not found", capitalize(T::NAME))));
    }
    repo.delete(&id).await?;

    info!(resource = T::NAME, id = %id, "Record deleted");
    record_resource_write(T::NAME, "delete");
    Ok(Json(ApiResponse::with_message(
        (),
        format!("{} deleted", capitalize(T::NAME)),
    )))
}

/// Soft delete.
///
/// POST /api/v1/<resource>/:id/deactivate
pub async fn deactivate<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    actor: Actor,
) -> Result<Json<ApiResponse<RecordView<T, T::Localized>>>, ApiError> {
    let repo = BaseRepository::<T>::new(state.store.clone());
    let record = repo.deactivate(&id, actor.id()).await?;

    info!(resource = T::NAME, id = %id, "Record deactivated");
    record_resource_write(T::NAME, "deactivate");
    Ok(Json(ApiResponse::with_message(
        view(record, None),
        format!("{} deactivated", capitalize(T::NAME)),
    )))
}

/// Undo a soft delete.
///
/// POST /api/v1/<resource>/:id/restore
pub async fn restore<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    actor: Actor,
) -> Result<Json<ApiResponse<RecordView<T, T::Localized>>>, ApiError> {
    let repo = BaseRepository::<T>::new(state.store.clone());
    let record = repo.restore(&id, actor.id()).await?;

    info!(resource = T::NAME, id = %id, "Record restored");
    record_resource_write(T::NAME, "restore");
    Ok(Json(ApiResponse::with_message(
        view(record, None),
        format!("{} restored", capitalize(T::NAME)),
    )))
}

/// `ETag` header for a record version.
pub fn version_headers(version: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&etag(version)) {
        headers.insert(ETAG, value);
    }
    headers
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_list_params_split_filters() {
        let params = ListParams::parse(
            raw(&[("lang", "te"), ("limit", "10"), ("courseId", "c1")]),
            &["courseId"],
        )
        .unwrap();
        assert_eq!(params.lang.as_deref(), Some("te"));
        assert_eq!(params.limit, Some(10));
        assert!(!params.include_inactive);
        assert_eq!(params.filters, vec![Filter::eq("courseId", "c1")]);
    }

    #[test]
    fn test_list_params_reject_unknown_field() {
        let err = ListParams::parse(raw(&[("secret", "x")]), &["courseId"]).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg.contains("secret")));
    }

    #[test]
    fn test_list_params_reject_bad_limit() {
        assert!(ListParams::parse(raw(&[("limit", "many")]), &[]).is_err());
    }

    #[test]
    fn test_bad_cursor_is_validation_error() {
        let params = ListParams::parse(raw(&[("cursor", "%%%")]), &[]).unwrap();
        assert!(matches!(params.to_query(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("course"), "Course");
        assert_eq!(capitalize(""), "");
    }
}
