//! Domain layer for the campus admin backend.
//!
//! This crate contains:
//! - The stored record envelope and the `Entity`/`Resource` contracts
//! - Education models (programs, subjects, courses, topics, enrollments,
//!   questions, activities, user profiles) and their request payloads
//! - Multilingual content values and language resolution

pub mod models;
pub mod services;
