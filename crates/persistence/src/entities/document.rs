//! Document entity (database row mapping).

use sqlx::types::Json;
use sqlx::FromRow;

use crate::store::{Document, JsonMap};

/// Database row mapping for the documents table.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: String,
    pub data: Json<JsonMap>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            data: row.data.0,
        }
    }
}
