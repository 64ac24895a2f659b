//! Course activity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::multilingual::{
    into_result, lenient, require_language, validate_optional_text, validate_required_text,
    MultilingualText, RequiresDefaultLanguage,
};
use super::record::{Entity, Resource};
use crate::services::LanguageContext;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    #[default]
    Assignment,
    Quiz,
    Discussion,
    Project,
}

/// Graded or ungraded work attached to a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub course_id: String,
    #[serde(deserialize_with = "lenient::deserialize")]
    pub title: MultilingualText,
    #[serde(
        default,
        deserialize_with = "lenient::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub instructions: Option<MultilingualText>,
    #[serde(default)]
    pub kind: ActivityKind,
    #[serde(
        default,
        with = "shared::time::micros::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<u32>,
}

impl Entity for Activity {
    const COLLECTION: &'static str = "activities";
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityRequest {
    #[validate(custom(function = "shared::validation::validate_document_id"))]
    pub course_id: String,

    #[validate(custom(function = "validate_required_text"))]
    pub title: MultilingualText,

    #[validate(custom(function = "validate_optional_text"))]
    pub instructions: Option<MultilingualText>,

    #[serde(default)]
    pub kind: ActivityKind,

    /// RFC 3339 on the wire; stored as epoch microseconds.
    pub due_at: Option<DateTime<Utc>>,

    #[validate(range(min = 1, max = 1000, message = "Max score must be between 1 and 1000"))]
    pub max_score: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_required_text"))]
    pub title: Option<MultilingualText>,

    #[serde(
        default,
        deserialize_with = "shared::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom(function = "validate_optional_text"))]
    pub instructions: Option<Option<MultilingualText>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ActivityKind>,

    /// Accepted as RFC 3339, written to the store as epoch microseconds.
    #[serde(
        default,
        deserialize_with = "shared::patch::nullable",
        serialize_with = "shared::time::micros::nullable::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_at: Option<Option<DateTime<Utc>>>,

    #[serde(
        default,
        deserialize_with = "shared::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(range(min = 1, max = 1000, message = "Max score must be between 1 and 1000"))]
    pub max_score: Option<Option<u32>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedActivity {
    pub title: String,
    pub instructions: String,
}

impl RequiresDefaultLanguage for CreateActivityRequest {
    fn check_default_language(&self, default_language: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_language(&mut errors, "title", &self.title, default_language);
        into_result(errors)
    }
}

impl RequiresDefaultLanguage for UpdateActivityRequest {
    fn check_default_language(&self, default_language: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.title {
            require_language(&mut errors, "title", title, default_language);
        }
        into_result(errors)
    }
}

impl Resource for Activity {
    type Create = CreateActivityRequest;
    type Update = UpdateActivityRequest;
    type Localized = LocalizedActivity;

    const NAME: &'static str = "activity";
    const FILTERABLE: &'static [&'static str] = &["courseId", "kind"];

    fn from_create(request: CreateActivityRequest) -> Self {
        Self {
            course_id: request.course_id,
            title: request.title,
            instructions: request.instructions,
            kind: request.kind,
            due_at: request.due_at.map(shared::time::truncate_to_micros),
            max_score: request.max_score,
        }
    }

    fn localize(&self, languages: &LanguageContext) -> LocalizedActivity {
        LocalizedActivity {
            title: languages.resolve(&self.title),
            instructions: languages.resolve_opt(self.instructions.as_ref()),
        }
    }
}
