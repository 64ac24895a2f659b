//! Stored record envelope shared by every entity kind.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::multilingual::RequiresDefaultLanguage;
use crate::services::localization::LanguageContext;

/// Key of the optimistic concurrency counter inside a stored document.
pub const VERSION_FIELD: &str = "version";

/// Key of the soft-delete flag inside a stored document.
pub const ACTIVE_FIELD: &str = "isActive";

/// Key of the creation timestamp inside a stored document.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Keys owned by the record envelope. Partial updates may not touch them.
pub const RESERVED_FIELDS: &[&str] = &[
    "id",
    CREATED_AT_FIELD,
    "updatedAt",
    "createdBy",
    "updatedBy",
    ACTIVE_FIELD,
    VERSION_FIELD,
];

/// A kind of persisted record living in one collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the records are stored in.
    const COLLECTION: &'static str;
}

/// An entity kind exposed over the CRUD HTTP surface.
pub trait Resource: Entity {
    /// Request body accepted on create.
    type Create: DeserializeOwned + Validate + RequiresDefaultLanguage + Send + 'static;
    /// Partial update body; absent fields are left unchanged.
    type Update: DeserializeOwned
        + Serialize
        + Validate
        + RequiresDefaultLanguage
        + Send
        + Sync
        + 'static;
    /// Language-resolved projection returned alongside the record.
    type Localized: Serialize + Send + 'static;

    /// Singular noun used in messages and logs.
    const NAME: &'static str;

    /// String fields list endpoints accept as equality filters.
    const FILTERABLE: &'static [&'static str] = &[];

    fn from_create(request: Self::Create) -> Self;

    fn localize(&self, languages: &LanguageContext) -> Self::Localized;
}

/// A persisted entity: store-assigned id, the entity's own fields, and the
/// bookkeeping every record carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: String,
    #[serde(flatten)]
    pub fields: T,
    #[serde(with = "shared::time::micros")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "shared::time::micros")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub version: u64,
}

impl<T> Record<T> {
    /// Soft-deleted records have `isActive == false`; absence means active.
    pub fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }
}
