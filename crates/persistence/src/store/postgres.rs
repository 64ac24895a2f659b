//! Postgres-backed document store.
//!
//! Documents live in a single `documents` table keyed by (collection, id)
//! with their fields in a JSONB column. Field names and values are always
//! bound as parameters.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    version_of, Direction, Document, DocumentStore, FilterOp, JsonMap, Query, StoreError,
    WriteBatch, WriteOp,
};
use crate::entities::DocumentRow;
use crate::metrics::QueryTimer;

/// Document store over a Postgres connection pool.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Creates a new PgDocumentStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Appends `data -> $field` for a bound field name.
fn push_field(qb: &mut QueryBuilder<'_, Postgres>, field: &str) {
    qb.push("(data -> ");
    qb.push_bind(field.to_string());
    qb.push("::text)");
}

fn build_query<'a>(collection: &str, query: &Query) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("SELECT id, data FROM documents WHERE collection = ");
    qb.push_bind(collection.to_string());

    for filter in &query.filters {
        qb.push(" AND ");
        let operator = match filter.op {
            FilterOp::Eq => " = ",
            FilterOp::Ne => " IS DISTINCT FROM ",
            FilterOp::Lt => " < ",
            FilterOp::Lte => " <= ",
            FilterOp::Gt => " > ",
            FilterOp::Gte => " >= ",
            FilterOp::ArrayContains => " @> ",
        };
        if matches!(
            filter.op,
            FilterOp::Lt | FilterOp::Lte | FilterOp::Gt | FilterOp::Gte
        ) {
            // jsonb null sorts below every other value
            push_field(&mut qb, &filter.field);
            qb.push(" <> 'null'::jsonb AND ");
        }
        push_field(&mut qb, &filter.field);
        qb.push(operator);
        let value = match filter.op {
            FilterOp::ArrayContains => Value::Array(vec![filter.value.clone()]),
            _ => filter.value.clone(),
        };
        qb.push_bind(Json(value));
        if matches!(filter.op, FilterOp::ArrayContains) {
            qb.push(" AND jsonb_typeof");
            push_field(&mut qb, &filter.field);
            qb.push(" = 'array'");
        }
    }

    let direction = query.order_by.as_ref().map(|o| o.direction);
    let (cmp, sql_dir) = match direction {
        Some(Direction::Desc) => (" < ", " DESC"),
        _ => (" > ", " ASC"),
    };

    if let Some(order) = &query.order_by {
        qb.push(" AND ");
        push_field(&mut qb, &order.field);
        qb.push(" IS NOT NULL AND ");
        push_field(&mut qb, &order.field);
        qb.push(" <> 'null'::jsonb");
    }

    if let Some(cursor) = &query.start_after {
        qb.push(" AND ");
        match &query.order_by {
            Some(order) => {
                qb.push("(");
                push_field(&mut qb, &order.field);
                qb.push(cmp);
                qb.push_bind(Json(cursor.sort_value.clone()));
                qb.push(" OR (");
                push_field(&mut qb, &order.field);
                qb.push(" = ");
                qb.push_bind(Json(cursor.sort_value.clone()));
                qb.push(" AND id COLLATE \"C\"");
                qb.push(cmp);
                qb.push_bind(cursor.id.clone());
                qb.push("))");
            }
            None => {
                qb.push("id COLLATE \"C\"");
                qb.push(cmp);
                qb.push_bind(cursor.id.clone());
            }
        }
    }

    qb.push(" ORDER BY ");
    if let Some(order) = &query.order_by {
        push_field(&mut qb, &order.field);
        qb.push(sql_dir);
        qb.push(", ");
    }
    qb.push("id COLLATE \"C\"");
    qb.push(sql_dir);

    if let Some(limit) = query.limit {
        qb.push(" LIMIT ");
        qb.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }

    qb
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let timer = QueryTimer::new("get_document");
        let result = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.map(Document::from))
    }

    async fn add(&self, collection: &str, data: JsonMap) -> Result<String, StoreError> {
        let timer = QueryTimer::new("add_document");
        let id = Uuid::new_v4().to_string();
        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(Json(data))
        .execute(&self.pool)
        .await;
        timer.record();
        result?;
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, data: JsonMap) -> Result<(), StoreError> {
        let timer = QueryTimer::new("set_document");
        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(data))
        .execute(&self.pool)
        .await;
        timer.record();
        result?;
        Ok(())
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        expected_version: u64,
        data: JsonMap,
    ) -> Result<(), StoreError> {
        let timer = QueryTimer::new("replace_document");
        let expected = i64::try_from(expected_version).unwrap_or(i64::MAX);
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET data = $4
            WHERE collection = $1
              AND id = $2
              AND COALESCE((data ->> 'version')::bigint, 0) = $3
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(expected)
        .bind(Json(data))
        .execute(&self.pool)
        .await;
        timer.record();

        if result?.rows_affected() == 1 {
            return Ok(());
        }

        // Nothing matched: either the document is gone or its version moved.
        match self.get(collection, id).await? {
            None => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
            Some(current) => Err(StoreError::VersionMismatch {
                collection: collection.to_string(),
                id: id.to_string(),
                expected: expected_version,
                actual: version_of(&current.data),
            }),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let timer = QueryTimer::new("delete_document");
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        result?;
        Ok(())
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let timer = QueryTimer::new(format!("query_{collection}"));
        let mut qb = build_query(collection, query);
        let result = qb
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await;
        timer.record();
        Ok(result?.into_iter().map(Document::from).collect())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let timer = QueryTimer::new("commit_batch");
        let mut tx = self.pool.begin().await?;

        for op in batch.into_ops() {
            match op {
                WriteOp::Set {
                    collection,
                    id,
                    data,
                } => {
                    sqlx::query(
                        r#"
                        INSERT INTO documents (collection, id, data)
                        VALUES ($1, $2, $3)
                        ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data
                        "#,
                    )
                    .bind(collection)
                    .bind(id)
                    .bind(Json(data))
                    .execute(&mut *tx)
                    .await?;
                }
                WriteOp::Delete { collection, id } => {
                    sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                        .bind(collection)
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        timer.record();
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
