//! Course topic models.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::multilingual::{
    into_result, lenient, require_language, validate_optional_text, validate_required_text,
    MultilingualText, RequiresDefaultLanguage,
};
use super::record::{Entity, Resource};
use crate::services::LanguageContext;

/// A unit of a course syllabus. Topics belong to exactly one course and are
/// removed with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub course_id: String,
    #[serde(deserialize_with = "lenient::deserialize")]
    pub title: MultilingualText,
    #[serde(
        default,
        deserialize_with = "lenient::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<MultilingualText>,
    #[serde(default)]
    pub position: u32,
}

impl Entity for Topic {
    const COLLECTION: &'static str = "topics";
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicRequest {
    #[validate(custom(function = "shared::validation::validate_document_id"))]
    pub course_id: String,

    #[validate(custom(function = "validate_required_text"))]
    pub title: MultilingualText,

    #[validate(custom(function = "validate_optional_text"))]
    pub summary: Option<MultilingualText>,

    #[serde(default)]
    #[validate(range(max = 999, message = "Position must be at most 999"))]
    pub position: u32,
}

/// Topics cannot move between courses; `courseId` is not updatable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTopicRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_required_text"))]
    pub title: Option<MultilingualText>,

    #[serde(
        default,
        deserialize_with = "shared::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom(function = "validate_optional_text"))]
    pub summary: Option<Option<MultilingualText>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 999, message = "Position must be at most 999"))]
    pub position: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedTopic {
    pub title: String,
    pub summary: String,
}

impl RequiresDefaultLanguage for CreateTopicRequest {
    fn check_default_language(&self, default_language: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_language(&mut errors, "title", &self.title, default_language);
        into_result(errors)
    }
}

impl RequiresDefaultLanguage for UpdateTopicRequest {
    fn check_default_language(&self, default_language: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.title {
            require_language(&mut errors, "title", title, default_language);
        }
        into_result(errors)
    }
}

impl Resource for Topic {
    type Create = CreateTopicRequest;
    type Update = UpdateTopicRequest;
    type Localized = LocalizedTopic;

    const NAME: &'static str = "topic";
    const FILTERABLE: &'static [&'static str] = &["courseId"];

    fn from_create(request: CreateTopicRequest) -> Self {
        Self {
            course_id: request.course_id,
            title: request.title,
            summary: request.summary,
            position: request.position,
        }
    }

    fn localize(&self, languages: &LanguageContext) -> LocalizedTopic {
        LocalizedTopic {
            title: languages.resolve(&self.title),
            summary: languages.resolve_opt(self.summary.as_ref()),
        }
    }
}
