//! Domain services.

pub mod localization;

pub use localization::LanguageContext;
