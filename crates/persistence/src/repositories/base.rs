//! Generic repository over one document collection.
//!
//! Records are stored without their id (the id is the document key) and
//! with the bookkeeping fields of [`Record`] inlined next to the entity's own
//! fields. Every write goes through here, so timestamps, actors and versions
//! are stamped in one place.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use shared::pagination::{clamp_page_size, encode_cursor};
use shared::time::next_timestamp;
use std::marker::PhantomData;
use std::sync::Arc;

use domain::models::record::{ACTIVE_FIELD, CREATED_AT_FIELD, RESERVED_FIELDS, VERSION_FIELD};
use domain::models::{Entity, Record};

use crate::error::RepositoryError;
use crate::metrics::record_version_conflict;
use crate::store::{Direction, Document, DocumentStore, Filter, JsonMap, Query, StoreError, WriteBatch};

const UPDATED_AT_FIELD: &str = "updatedAt";
const CREATED_BY_FIELD: &str = "createdBy";
const UPDATED_BY_FIELD: &str = "updatedBy";

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<Record<T>>,
    /// Cursor for the next page, absent on the last page.
    pub next_cursor: Option<String>,
}

/// CRUD operations for entity kind `T`.
pub struct BaseRepository<T> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for BaseRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> BaseRepository<T> {
    /// Creates a new repository over the given store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Fetch one record, inactive or not.
    pub async fn get_by_id(&self, id: &str) -> Result<Record<T>, RepositoryError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(T::COLLECTION, id))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Record<T>>, RepositoryError> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    /// Fetch one record, treating soft-deleted records as absent.
    pub async fn get_active_by_id(&self, id: &str) -> Result<Record<T>, RepositoryError> {
        let record = self.get_by_id(id).await?;
        if record.is_active() {
            Ok(record)
        } else {
            Err(RepositoryError::not_found(T::COLLECTION, id))
        }
    }

    pub async fn exists(&self, id: &str) -> Result<bool, RepositoryError> {
        Ok(self.store.get(T::COLLECTION, id).await?.is_some())
    }

    /// Store a new record under a store-assigned id and return it as read back.
    pub async fn create(
        &self,
        fields: &T,
        actor: Option<&str>,
    ) -> Result<Record<T>, RepositoryError> {
        let data = new_document(fields, actor)?;
        let id = self.store.add(T::COLLECTION, data).await?;

        match self.store.get(T::COLLECTION, &id).await? {
            Some(doc) => decode(doc),
            None => {
                tracing::error!(collection = T::COLLECTION, id = %id, "Created record missing on read-back");
                Err(RepositoryError::ReadBackMissing {
                    collection: T::COLLECTION,
                    id,
                })
            }
        }
    }

    /// Store a record at a caller-chosen id, overwriting anything already there.
    pub async fn create_with_id(
        &self,
        id: &str,
        fields: &T,
        actor: Option<&str>,
    ) -> Result<Record<T>, RepositoryError> {
        let data = new_document(fields, actor)?;
        self.store.set(T::COLLECTION, id, data.clone()).await?;
        decode(Document {
            id: id.to_string(),
            data,
        })
    }

    /// Merge `patch` into the record and return the stored result.
    ///
    /// Keys owned by the record envelope are ignored; a `null` value removes
    /// the field.
    pub async fn update<P: Serialize + ?Sized>(
        &self,
        id: &str,
        patch: &P,
        actor: Option<&str>,
    ) -> Result<Record<T>, RepositoryError> {
        self.update_with_version(id, patch, None, actor).await
    }

    /// [`update`](Self::update), failing with `Conflict` unless the stored
    /// version equals `expected_version` when one is given.
    pub async fn update_with_version<P: Serialize + ?Sized>(
        &self,
        id: &str,
        patch: &P,
        expected_version: Option<u64>,
        actor: Option<&str>,
    ) -> Result<Record<T>, RepositoryError> {
        let patch = match serde_json::to_value(patch)? {
            Value::Object(map) => map,
            _ => return Err(RepositoryError::InvalidPatch),
        };

        self.mutate(id, expected_version, actor, move |data| {
            for (key, value) in patch {
                if RESERVED_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                if value.is_null() {
                    data.remove(&key);
                } else {
                    data.insert(key, value);
                }
            }
        })
        .await
    }

    /// Swap the record's entity fields for `fields` wholesale, keeping its
    /// bookkeeping. Fields absent from `fields` are removed.
    pub async fn replace_fields(
        &self,
        id: &str,
        fields: &T,
        expected_version: Option<u64>,
        actor: Option<&str>,
    ) -> Result<Record<T>, RepositoryError> {
        let replacement = match serde_json::to_value(fields)? {
            Value::Object(map) => map,
            _ => return Err(RepositoryError::InvalidPatch),
        };

        self.mutate(id, expected_version, actor, move |data| {
            data.retain(|key, _| RESERVED_FIELDS.contains(&key.as_str()));
            for (key, value) in replacement {
                if RESERVED_FIELDS.contains(&key.as_str()) || value.is_null() {
                    continue;
                }
                data.insert(key, value);
            }
        })
        .await
    }

    /// Dispatch to [`create`](Self::create) without an id, otherwise to
    /// [`update`](Self::update) with the full field set.
    pub async fn create_or_update(
        &self,
        id: Option<&str>,
        fields: &T,
        actor: Option<&str>,
    ) -> Result<Record<T>, RepositoryError> {
        match id {
            None => self.create(fields, actor).await,
            Some(id) => self.update(id, fields, actor).await,
        }
    }

    /// Soft delete.
    pub async fn deactivate(
        &self,
        id: &str,
        actor: Option<&str>,
    ) -> Result<Record<T>, RepositoryError> {
        self.mutate(id, None, actor, |data| {
            data.insert(ACTIVE_FIELD.to_string(), Value::Bool(false));
        })
        .await
    }

    /// Undo a soft delete.
    pub async fn restore(&self, id: &str, actor: Option<&str>) -> Result<Record<T>, RepositoryError> {
        self.mutate(id, None, actor, |data| {
            data.insert(ACTIVE_FIELD.to_string(), Value::Bool(true));
        })
        .await
    }

    /// Permanently remove a record. Absent ids are not an error.
    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.store.delete(T::COLLECTION, id).await?;
        Ok(())
    }

    /// Remove several records in one atomic batch.
    pub async fn delete_many(&self, ids: &[String]) -> Result<(), RepositoryError> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut batch = WriteBatch::new();
        for id in ids {
            batch.delete(T::COLLECTION, id);
        }
        self.store.commit(batch).await?;
        Ok(())
    }

    /// List one page of records.
    ///
    /// Without an explicit ordering, newest records come first. The query's
    /// limit is clamped to the allowed page size.
    pub async fn list(&self, query: Query) -> Result<Page<T>, RepositoryError> {
        let mut query = query;
        if query.order_by.is_none() {
            query = query.order_by(CREATED_AT_FIELD, Direction::Desc);
        }
        let page_size = clamp_page_size(query.limit);
        query.limit = Some(page_size + 1);

        let mut docs = self.store.query(T::COLLECTION, &query).await?;

        let next_cursor = if docs.len() > page_size {
            docs.truncate(page_size);
            docs.last()
                .map(|last| encode_cursor(&query.sort_value(last), &last.id))
        } else {
            None
        };

        let items = docs
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page { items, next_cursor })
    }

    /// Every record matching the query's filters, unpaged.
    ///
    /// For internal lookups over sets known to stay small; the query's limit
    /// and cursor are ignored.
    pub async fn find_all(&self, query: Query) -> Result<Vec<Record<T>>, RepositoryError> {
        let query = Query {
            start_after: None,
            limit: None,
            ..query
        };
        self.store
            .query(T::COLLECTION, &query)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// [`list`](Self::list) restricted to records not soft-deleted.
    pub async fn list_active(&self, query: Query) -> Result<Page<T>, RepositoryError> {
        self.list(query.filter(Filter::ne(ACTIVE_FIELD, false))).await
    }

    /// Read the current document, apply `change`, stamp the bookkeeping
    /// fields and write it back with a compare-and-swap on its version.
    async fn mutate<F>(
        &self,
        id: &str,
        expected_version: Option<u64>,
        actor: Option<&str>,
        change: F,
    ) -> Result<Record<T>, RepositoryError>
    where
        F: FnOnce(&mut JsonMap),
    {
        let current = self
            .store
            .get(T::COLLECTION, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(T::COLLECTION, id))?;
        let current_version = current.version();

        if let Some(expected) = expected_version {
            if expected != current_version {
                record_version_conflict(T::COLLECTION);
                return Err(RepositoryError::Conflict {
                    collection: T::COLLECTION,
                    id: id.to_string(),
                    expected,
                    actual: current_version,
                });
            }
        }

        let previous = current
            .data
            .get(UPDATED_AT_FIELD)
            .and_then(Value::as_i64)
            .and_then(DateTime::from_timestamp_micros);

        let mut data = current.data;
        change(&mut data);
        let updated_at = next_timestamp(previous, Utc::now());
        data.insert(UPDATED_AT_FIELD.to_string(), updated_at.timestamp_micros().into());
        if let Some(actor) = actor {
            data.insert(UPDATED_BY_FIELD.to_string(), actor.into());
        }
        data.insert(VERSION_FIELD.to_string(), (current_version + 1).into());

        let record = decode(Document {
            id: id.to_string(),
            data: data.clone(),
        })?;

        self.store
            .replace(T::COLLECTION, id, current_version, data)
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => RepositoryError::not_found(T::COLLECTION, id),
                StoreError::VersionMismatch {
                    expected, actual, ..
                } => {
                    record_version_conflict(T::COLLECTION);
                    tracing::warn!(
                        collection = T::COLLECTION,
                        id = %id,
                        expected,
                        actual,
                        "Concurrent write detected"
                    );
                    RepositoryError::Conflict {
                        collection: T::COLLECTION,
                        id: id.to_string(),
                        expected,
                        actual,
                    }
                }
                other => RepositoryError::Store(other),
            })?;

        Ok(record)
    }
}

/// Serialize a new entity and stamp creation bookkeeping.
fn new_document<T: Entity>(fields: &T, actor: Option<&str>) -> Result<JsonMap, RepositoryError> {
    let mut data = match serde_json::to_value(fields)? {
        Value::Object(map) => map,
        _ => return Err(RepositoryError::InvalidPatch),
    };
    for key in RESERVED_FIELDS {
        data.remove(*key);
    }

    let now = next_timestamp(None, Utc::now()).timestamp_micros();
    data.insert(CREATED_AT_FIELD.to_string(), now.into());
    data.insert(UPDATED_AT_FIELD.to_string(), now.into());
    if let Some(actor) = actor {
        data.insert(CREATED_BY_FIELD.to_string(), actor.into());
        data.insert(UPDATED_BY_FIELD.to_string(), actor.into());
    }
    data.insert(ACTIVE_FIELD.to_string(), Value::Bool(true));
    data.insert(VERSION_FIELD.to_string(), 1.into());
    Ok(data)
}

fn decode<T: Entity>(doc: Document) -> Result<Record<T>, RepositoryError> {
    let Document { id, mut data } = doc;
    data.insert("id".to_string(), Value::String(id.clone()));
    serde_json::from_value(Value::Object(data)).map_err(|source| RepositoryError::Decode {
        collection: T::COLLECTION,
        id,
        source,
    })
}
