//! Repository error type.

use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{collection} record {id} not found")]
    NotFound { collection: &'static str, id: String },

    #[error("{collection} record {id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        collection: &'static str,
        id: String,
        expected: u64,
        actual: u64,
    },

    /// A write succeeded but the record could not be read back.
    #[error("{collection} record {id} missing after write")]
    ReadBackMissing { collection: &'static str, id: String },

    /// A patch was not a JSON object.
    #[error("update payload must be an object")]
    InvalidPatch,

    #[error("stored {collection} record {id} is malformed: {source}")]
    Decode {
        collection: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(StoreError),
}

impl RepositoryError {
    /// True if retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            RepositoryError::Store(err) => err.is_transient(),
            _ => false,
        }
    }

    pub fn not_found(collection: &'static str, id: impl Into<String>) -> Self {
        RepositoryError::NotFound {
            collection,
            id: id.into(),
        }
    }
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        RepositoryError::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_follows_store() {
        let err = RepositoryError::from(StoreError::Unavailable("down".to_string()));
        assert!(err.is_transient());

        let err = RepositoryError::not_found("courses", "c1");
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "courses record c1 not found");
    }

    #[test]
    fn test_conflict_message() {
        let err = RepositoryError::Conflict {
            collection: "topics",
            id: "t1".to_string(),
            expected: 2,
            actual: 3,
        };
        assert!(err.to_string().contains("expected version 2, found 3"));
    }
}
