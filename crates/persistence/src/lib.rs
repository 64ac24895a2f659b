//! Persistence layer for the campus admin backend.
//!
//! This crate contains:
//! - Database connection management
//! - The document store abstraction with Postgres and in-memory backends
//! - The generic base repository and per-entity repositories

pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;
pub mod store;

pub use error::RepositoryError;
pub use store::{DocumentStore, StoreError};
