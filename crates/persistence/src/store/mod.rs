//! Document store abstraction.
//!
//! A store keeps JSON documents in named collections, addressed by string id.
//! It supports equality/range filters, ordering on a single field, cursor
//! continuation, a compare-and-swap replace keyed on the document's
//! `version` field, and atomic write batches.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use domain::models::record::VERSION_FIELD;
use serde_json::Value;
use shared::pagination::Cursor;
use std::cmp::Ordering;
use thiserror::Error;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Field map of a stored document (everything except the id).
pub type JsonMap = serde_json::Map<String, Value>;

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: JsonMap,
}

impl Document {
    /// The document's optimistic concurrency counter (0 when absent).
    pub fn version(&self) -> u64 {
        version_of(&self.data)
    }
}

pub(crate) fn version_of(data: &JsonMap) -> u64 {
    data.get(VERSION_FIELD).and_then(Value::as_u64).unwrap_or(0)
}

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("version mismatch on {collection}/{id}: expected {expected}, found {actual}")]
    VersionMismatch {
        collection: String,
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// True for failures worth retrying unchanged: timeouts, dropped
    /// connections, serialization failures and deadlocks.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Unavailable(_) => true,
            StoreError::Database(err) => match err {
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::WorkerCrashed => {
                    true
                }
                sqlx::Error::Database(db_err) => {
                    matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
                }
                _ => false,
            },
            StoreError::NotFound { .. } | StoreError::VersionMismatch { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    /// Matches documents where the field differs or is missing.
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    /// Field is an array containing the value.
    ArrayContains,
}

/// A predicate on one top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Ne, value)
    }

    /// Evaluates the filter against a document's fields.
    pub fn matches(&self, data: &JsonMap) -> bool {
        let field = data.get(&self.field);
        match self.op {
            FilterOp::Eq => field == Some(&self.value),
            FilterOp::Ne => field != Some(&self.value),
            FilterOp::ArrayContains => field
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(&self.value)),
            FilterOp::Lt | FilterOp::Lte | FilterOp::Gt | FilterOp::Gte => {
                let Some(field) = field.filter(|v| !v.is_null()) else {
                    return false;
                };
                let ord = compare_json(field, &self.value);
                match self.op {
                    FilterOp::Lt => ord == Ordering::Less,
                    FilterOp::Lte => ord != Ordering::Greater,
                    FilterOp::Gt => ord == Ordering::Greater,
                    _ => ord != Ordering::Less,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A filtered, ordered, limited read over one collection.
///
/// With `order_by` set, documents lacking the field are excluded and ties
/// are broken by id in the same direction. Without it, documents are ordered
/// by id ascending and the cursor's sort value is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub start_after: Option<Cursor>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn start_after(mut self, cursor: Cursor) -> Self {
        self.start_after = Some(cursor);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Value the ordering reads from a document, used to build cursors.
    pub fn sort_value(&self, doc: &Document) -> Value {
        match &self.order_by {
            Some(order) => doc.data.get(&order.field).cloned().unwrap_or(Value::Null),
            None => Value::Null,
        }
    }
}

/// One write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Set {
        collection: String,
        id: String,
        data: JsonMap,
    },
    Delete {
        collection: String,
        id: String,
    },
}

/// Writes committed all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, collection: &str, id: &str, data: JsonMap) -> &mut Self {
        self.ops.push(WriteOp::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            data,
        });
        self
    }

    pub fn delete(&mut self, collection: &str, id: &str) -> &mut Self {
        self.ops.push(WriteOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Storage backend contract.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Stores a new document under a store-generated id and returns the id.
    async fn add(&self, collection: &str, data: JsonMap) -> Result<String, StoreError>;

    /// Creates or overwrites the document at `id`.
    async fn set(&self, collection: &str, id: &str, data: JsonMap) -> Result<(), StoreError>;

    /// Overwrites the document at `id` only if its stored version equals
    /// `expected_version`.
    async fn replace(
        &self,
        collection: &str,
        id: &str,
        expected_version: u64,
        data: JsonMap,
    ) -> Result<(), StoreError>;

    /// Removes the document. Absent ids are not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Applies every write in the batch or none of them.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Cheap connectivity check for health probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Total order over JSON values, following Postgres `jsonb` ordering across
/// types: null < string < number < boolean < array < object.
pub fn compare_json(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::String(_) => 1,
            Value::Number(_) => 2,
            Value::Bool(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Orders two documents by (sort value, id) for `query`.
pub(crate) fn compare_documents(query: &Query, a: &Document, b: &Document) -> Ordering {
    let ord = match &query.order_by {
        Some(order) => {
            let va = a.data.get(&order.field).unwrap_or(&Value::Null);
            let vb = b.data.get(&order.field).unwrap_or(&Value::Null);
            compare_json(va, vb).then_with(|| a.id.cmp(&b.id))
        }
        None => a.id.cmp(&b.id),
    };
    match query.order_by.as_ref().map(|o| o.direction) {
        Some(Direction::Desc) => ord.reverse(),
        _ => ord,
    }
}

/// True if `doc` sorts strictly after `cursor` in `query`'s ordering.
pub(crate) fn is_after_cursor(query: &Query, cursor: &Cursor, doc: &Document) -> bool {
    let ord = match &query.order_by {
        Some(order) => {
            let value = doc.data.get(&order.field).unwrap_or(&Value::Null);
            compare_json(value, &cursor.sort_value).then_with(|| doc.id.as_str().cmp(&cursor.id))
        }
        None => doc.id.as_str().cmp(&cursor.id),
    };
    match query.order_by.as_ref().map(|o| o.direction) {
        Some(Direction::Desc) => ord == Ordering::Less,
        _ => ord == Ordering::Greater,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> JsonMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_filter_eq_and_ne() {
        let doc = data(json!({"status": "active", "isActive": true}));
        assert!(Filter::eq("status", "active").matches(&doc));
        assert!(!Filter::eq("status", "pending").matches(&doc));
        assert!(Filter::ne("isActive", false).matches(&doc));
        assert!(Filter::ne("isActive", false).matches(&data(json!({}))));
        assert!(!Filter::ne("isActive", false).matches(&data(json!({"isActive": false}))));
    }

    #[test]
    fn test_filter_ranges() {
        let doc = data(json!({"position": 5}));
        assert!(Filter::new("position", FilterOp::Gt, 4).matches(&doc));
        assert!(Filter::new("position", FilterOp::Gte, 5).matches(&doc));
        assert!(!Filter::new("position", FilterOp::Lt, 5).matches(&doc));
        assert!(Filter::new("position", FilterOp::Lte, 5).matches(&doc));
        assert!(!Filter::new("missing", FilterOp::Lt, 100).matches(&doc));
    }

    #[test]
    fn test_filter_array_contains() {
        let doc = data(json!({"subjectIds": ["s1", "s2"]}));
        assert!(Filter::new("subjectIds", FilterOp::ArrayContains, "s2").matches(&doc));
        assert!(!Filter::new("subjectIds", FilterOp::ArrayContains, "s3").matches(&doc));
    }

    #[test]
    fn test_compare_json_cross_type() {
        assert_eq!(compare_json(&json!("z"), &json!(1)), Ordering::Less);
        assert_eq!(compare_json(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_json(&json!(1.5), &json!(1)), Ordering::Greater);
        assert_eq!(compare_json(&Value::Null, &json!("a")), Ordering::Less);
    }

    #[test]
    fn test_version_of() {
        assert_eq!(version_of(&data(json!({"version": 7}))), 7);
        assert_eq!(version_of(&data(json!({}))), 0);
    }

    #[test]
    fn test_write_batch_builder() {
        let mut batch = WriteBatch::new();
        batch.delete("topics", "t1").delete("courses", "c1");
        assert_eq!(batch.len(), 2);
        assert!(matches!(&batch.into_ops()[1], WriteOp::Delete { collection, .. } if collection == "courses"));
    }
}
