//! Course models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationErrors};

use super::multilingual::{
    into_result, lenient, require_language, validate_optional_array, validate_optional_text,
    validate_required_text, MultilingualArray, MultilingualText, RequiresDefaultLanguage,
};
use super::record::{Entity, Resource};
use crate::services::LanguageContext;

/// Difficulty band of a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }
}

impl FromStr for CourseLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(CourseLevel::Beginner),
            "intermediate" => Ok(CourseLevel::Intermediate),
            "advanced" => Ok(CourseLevel::Advanced),
            _ => Err(format!("Invalid course level: {}", s)),
        }
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A course offered by the institution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(deserialize_with = "lenient::deserialize")]
    pub title: MultilingualText,
    pub code: String,
    #[serde(
        default,
        deserialize_with = "lenient::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<MultilingualText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
    #[serde(default)]
    pub subject_ids: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub learning_outcomes: Option<MultilingualArray>,
    #[serde(default)]
    pub level: CourseLevel,
}

impl Entity for Course {
    const COLLECTION: &'static str = "courses";
}

/// Request payload for creating a course.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[validate(custom(function = "validate_required_text"))]
    pub title: MultilingualText,

    #[validate(custom(function = "shared::validation::validate_catalog_code"))]
    pub code: String,

    #[validate(custom(function = "validate_optional_text"))]
    pub description: Option<MultilingualText>,

    #[validate(custom(function = "shared::validation::validate_document_id"))]
    pub program_id: Option<String>,

    #[serde(default)]
    #[validate(length(max = 20, message = "A course can reference at most 20 subjects"))]
    pub subject_ids: Vec<String>,

    #[validate(custom(function = "validate_optional_array"))]
    pub learning_outcomes: Option<MultilingualArray>,

    #[serde(default)]
    pub level: CourseLevel,
}

/// Request payload for updating a course.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_required_text"))]
    pub title: Option<MultilingualText>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_catalog_code"))]
    pub code: Option<String>,

    #[serde(
        default,
        deserialize_with = "shared::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom(function = "validate_optional_text"))]
    pub description: Option<Option<MultilingualText>>,

    #[serde(
        default,
        deserialize_with = "shared::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom(function = "shared::validation::validate_document_id"))]
    pub program_id: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20, message = "A course can reference at most 20 subjects"))]
    pub subject_ids: Option<Vec<String>>,

    #[serde(
        default,
        deserialize_with = "shared::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom(function = "validate_optional_array"))]
    pub learning_outcomes: Option<Option<MultilingualArray>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<CourseLevel>,
}

/// Course with its text resolved to one language.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedCourse {
    pub title: String,
    pub description: String,
    pub learning_outcomes: Vec<String>,
    pub available_languages: Vec<String>,
}

impl RequiresDefaultLanguage for CreateCourseRequest {
    fn check_default_language(&self, default_language: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_language(&mut errors, "title", &self.title, default_language);
        into_result(errors)
    }
}

impl RequiresDefaultLanguage for UpdateCourseRequest {
    fn check_default_language(&self, default_language: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.title {
            require_language(&mut errors, "title", title, default_language);
        }
        into_result(errors)
    }
}

impl Resource for Course {
    type Create = CreateCourseRequest;
    type Update = UpdateCourseRequest;
    type Localized = LocalizedCourse;

    const NAME: &'static str = "course";
    const FILTERABLE: &'static [&'static str] = &["code", "programId", "level"];

    fn from_create(request: CreateCourseRequest) -> Self {
        Self {
            title: request.title,
            code: request.code,
            description: request.description,
            program_id: request.program_id,
            subject_ids: request.subject_ids,
            learning_outcomes: request.learning_outcomes,
            level: request.level,
        }
    }

    fn localize(&self, languages: &LanguageContext) -> LocalizedCourse {
        LocalizedCourse {
            title: languages.resolve(&self.title),
            description: languages.resolve_opt(self.description.as_ref()),
            learning_outcomes: languages.resolve_opt(self.learning_outcomes.as_ref()),
            available_languages: self
                .title
                .available_languages(&languages.fallback)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}
