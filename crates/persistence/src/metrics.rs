//! Document store metrics.
//!
//! Every store backend times its operations through [`QueryTimer`] so both
//! backends report under the same histogram.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record the duration of one store operation.
pub fn record_store_duration(operation: &str, duration_secs: f64) {
    histogram!(
        "document_store_operation_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

/// Count an optimistic concurrency conflict on a collection.
pub fn record_version_conflict(collection: &str) {
    counter!(
        "document_store_version_conflicts_total",
        "collection" => collection.to_string()
    )
    .increment(1);
}

/// Record Postgres connection pool gauges.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times a store operation.
///
/// ```ignore
/// let timer = QueryTimer::new("get_document");
/// let result = sqlx::query_as::<_, DocumentRow>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    operation: String,
    start: Instant,
}

impl QueryTimer {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_store_duration(&self.operation, duration);
    }
}
