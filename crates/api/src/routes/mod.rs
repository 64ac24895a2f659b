//! HTTP route handlers.

pub mod courses;
pub mod enrollments;
pub mod health;
pub mod resources;
pub mod topics;
pub mod users;
