//! Database row mappings.

pub mod document;

pub use document::DocumentRow;
