//! Language resolution for responses.

use crate::models::multilingual::{Content, Multilingual, DEFAULT_LANGUAGE};

/// Requested and fallback language for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageContext {
    pub language: String,
    pub fallback: String,
}

impl LanguageContext {
    pub fn new(language: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            fallback: fallback.into(),
        }
    }

    /// Builds a context from an optional `?lang=` value, falling back to the
    /// configured default. Unsupported languages resolve to the default.
    pub fn from_request(requested: Option<&str>, default_language: &str, supported: &[String]) -> Self {
        let language = requested
            .filter(|code| supported.iter().any(|s| s == code))
            .unwrap_or(default_language);
        Self::new(language, default_language)
    }

    pub fn resolve<T: Content>(&self, value: &Multilingual<T>) -> T {
        value.localized(&self.language, &self.fallback)
    }

    /// Resolves an optional field; absent fields resolve to empty.
    pub fn resolve_opt<T: Content>(&self, value: Option<&Multilingual<T>>) -> T {
        value.map(|v| self.resolve(v)).unwrap_or_default()
    }
}

impl Default for LanguageContext {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE, DEFAULT_LANGUAGE)
    }
}
