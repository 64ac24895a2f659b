//! Multilingual field values.
//!
//! A multilingual field is stored either as a single plain value (records
//! written before translations existed) or as a map from language code to
//! value. Resolution never fails: a missing translation falls back to the
//! fallback language, then to the first non-empty entry, then to an empty
//! value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

/// Default language when the deployment configures none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Content that can be stored per language.
pub trait Content: Clone + Default + PartialEq {
    /// True when there is nothing to show for this entry.
    fn is_blank(&self) -> bool;
}

impl Content for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Content for Vec<String> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

/// A value that is either plain or keyed by language code.
///
/// Language maps iterate in code order, which is the stable order used by
/// [`Multilingual::available_languages`] and by the first-non-empty fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Multilingual<T> {
    Plain(T),
    Localized(BTreeMap<String, T>),
}

/// Multilingual string field (titles, descriptions, prompts).
pub type MultilingualText = Multilingual<String>;

/// Multilingual list field (options, learning outcomes), resolved as a unit.
pub type MultilingualArray = Multilingual<Vec<String>>;

/// Raised when raw JSON has neither the plain nor the language-map shape.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed multilingual value: found {found}")]
pub struct MalformedMultilingual {
    pub found: &'static str,
}

impl<T: Content> Multilingual<T> {
    /// Creates a value seeded with `value` under `language`.
    pub fn new(value: T, language: &str) -> Self {
        let mut map = BTreeMap::new();
        map.insert(language.to_string(), value);
        Multilingual::Localized(map)
    }

    /// Returns a copy with `language` set to `value`; other entries are kept.
    ///
    /// A plain value is promoted to an entry under `plain_language` (the
    /// deployment's default language) first, so updating a legacy record
    /// never drops its original text.
    pub fn with_language(&self, language: &str, value: T, plain_language: &str) -> Self {
        let mut map = match self {
            Multilingual::Plain(existing) => {
                let mut map = BTreeMap::new();
                if !existing.is_blank() {
                    map.insert(plain_language.to_string(), existing.clone());
                }
                map
            }
            Multilingual::Localized(map) => map.clone(),
        };
        map.insert(language.to_string(), value);
        Multilingual::Localized(map)
    }

    /// Best available value for `language`.
    ///
    /// Plain values are returned unchanged for every language.
    pub fn localized(&self, language: &str, fallback: &str) -> T {
        match self {
            Multilingual::Plain(value) => value.clone(),
            Multilingual::Localized(map) => {
                let non_blank = |code: &str| map.get(code).filter(|v| !v.is_blank());
                non_blank(language)
                    .or_else(|| non_blank(fallback))
                    .or_else(|| map.values().find(|v| !v.is_blank()))
                    .cloned()
                    .unwrap_or_default()
            }
        }
    }

    /// Language codes that carry non-empty content, in code order.
    ///
    /// A non-empty plain value reports `plain_language`.
    pub fn available_languages<'a>(&'a self, plain_language: &'a str) -> Vec<&'a str> {
        match self {
            Multilingual::Plain(value) if value.is_blank() => Vec::new(),
            Multilingual::Plain(_) => vec![plain_language],
            Multilingual::Localized(map) => map
                .iter()
                .filter(|(_, v)| !v.is_blank())
                .map(|(code, _)| code.as_str())
                .collect(),
        }
    }

    /// True iff `language` has non-empty content. A non-empty plain value
    /// counts for every language.
    pub fn has_language_content(&self, language: &str) -> bool {
        match self {
            Multilingual::Plain(value) => !value.is_blank(),
            Multilingual::Localized(map) => map.get(language).is_some_and(|v| !v.is_blank()),
        }
    }

    /// True when no language has content.
    pub fn is_blank(&self) -> bool {
        match self {
            Multilingual::Plain(value) => value.is_blank(),
            Multilingual::Localized(map) => map.values().all(Content::is_blank),
        }
    }

    /// Language codes used as map keys (including empty entries).
    pub fn language_keys(&self) -> Vec<&str> {
        match self {
            Multilingual::Plain(_) => Vec::new(),
            Multilingual::Localized(map) => map.keys().map(String::as_str).collect(),
        }
    }
}

impl<T> Multilingual<T>
where
    T: Content + DeserializeOwned,
{
    /// Strictly parses a raw JSON value.
    ///
    /// Unlike serde's untagged fallback this names what was found, so a
    /// malformed map is distinguishable from a legacy plain value.
    pub fn from_json(value: &Value) -> Result<Self, MalformedMultilingual> {
        serde_json::from_value(value.clone()).map_err(|_| MalformedMultilingual {
            found: json_kind(value),
        })
    }

    /// [`from_json`](Self::from_json), reading a malformed value as an empty
    /// plain value. The failure is logged.
    pub fn from_json_lenient(value: &Value) -> Self {
        Self::from_json(value).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Unreadable multilingual value, resolving to empty");
            Multilingual::Plain(T::default())
        })
    }
}

impl From<&str> for MultilingualText {
    fn from(value: &str) -> Self {
        Multilingual::Plain(value.to_string())
    }
}

impl From<String> for MultilingualText {
    fn from(value: String) -> Self {
        Multilingual::Plain(value)
    }
}

/// Serde adapter for stored multilingual fields.
///
/// A stored value of the wrong shape decodes as empty instead of failing the
/// whole record. Request bodies keep the strict derive.
pub mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{Content, Multilingual};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Multilingual<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Content + DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Multilingual::from_json_lenient(&value))
    }

    /// Optional variant; `null` stays absent.
    pub mod option {
        use serde::de::DeserializeOwned;
        use serde::{Deserialize, Deserializer};
        use serde_json::Value;

        use crate::models::multilingual::{Content, Multilingual};

        pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Multilingual<T>>, D::Error>
        where
            D: Deserializer<'de>,
            T: Content + DeserializeOwned,
        {
            match Value::deserialize(deserializer)? {
                Value::Null => Ok(None),
                value => Ok(Some(Multilingual::from_json_lenient(&value))),
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object with non-conforming values",
    }
}

fn check_language_keys<T: Content>(value: &Multilingual<T>) -> Result<(), ValidationError> {
    for code in value.language_keys() {
        shared::validation::validate_language_code(code)?;
    }
    Ok(())
}

/// Validates the shape of a required multilingual text field: well-formed
/// language keys and content in at least one language. Which language must
/// be present is checked by [`RequiresDefaultLanguage`].
pub fn validate_required_text(value: &MultilingualText) -> Result<(), ValidationError> {
    check_language_keys(value)?;
    if value.is_blank() {
        let mut err = ValidationError::new("multilingual_required");
        err.message = Some("A value is required".into());
        return Err(err);
    }
    Ok(())
}

/// Validates the language keys of an optional multilingual text field.
pub fn validate_optional_text(value: &MultilingualText) -> Result<(), ValidationError> {
    check_language_keys(value)
}

/// Validates the language keys of an optional multilingual list field.
pub fn validate_optional_array(value: &MultilingualArray) -> Result<(), ValidationError> {
    check_language_keys(value)
}

/// Request bodies whose required multilingual fields must carry content in
/// the deployment's default language.
///
/// Runs after the `validator` rules, with the configured default language.
pub trait RequiresDefaultLanguage {
    fn check_default_language(&self, _default_language: &str) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// Adds a `multilingual_required` error for `field` unless `value` has
/// content in `language`.
pub fn require_language<T: Content>(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &Multilingual<T>,
    language: &str,
) {
    if !value.has_language_content(language) {
        let mut err = ValidationError::new("multilingual_required");
        err.message = Some(format!("A value in '{language}' is required").into());
        errors.add(field, err);
    }
}

/// `Ok` when no field recorded an error.
pub fn into_result(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
