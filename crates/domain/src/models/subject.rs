//! Subject models.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::multilingual::{
    into_result, lenient, require_language, validate_optional_text, validate_required_text,
    MultilingualText, RequiresDefaultLanguage,
};
use super::record::{Entity, Resource};
use crate::services::LanguageContext;

/// A subject area taught within a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(deserialize_with = "lenient::deserialize")]
    pub name: MultilingualText,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<MultilingualText>,
    #[serde(default)]
    pub credits: u16,
}

impl Entity for Subject {
    const COLLECTION: &'static str = "subjects";
}

/// Request payload for creating a subject.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectRequest {
    #[validate(custom(function = "validate_required_text"))]
    pub name: MultilingualText,

    #[validate(custom(function = "shared::validation::validate_catalog_code"))]
    pub code: String,

    #[validate(custom(function = "shared::validation::validate_document_id"))]
    pub program_id: Option<String>,

    #[validate(custom(function = "validate_optional_text"))]
    pub description: Option<MultilingualText>,

    #[serde(default)]
    #[validate(range(max = 60, message = "Credits must be at most 60"))]
    pub credits: u16,
}

/// Request payload for updating a subject.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_required_text"))]
    pub name: Option<MultilingualText>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_catalog_code"))]
    pub code: Option<String>,

    #[serde(
        default,
        deserialize_with = "shared::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom(function = "shared::validation::validate_document_id"))]
    pub program_id: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "shared::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom(function = "validate_optional_text"))]
    pub description: Option<Option<MultilingualText>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 60, message = "Credits must be at most 60"))]
    pub credits: Option<u16>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedSubject {
    pub name: String,
    pub description: String,
}

impl RequiresDefaultLanguage for CreateSubjectRequest {
    fn check_default_language(&self, default_language: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_language(&mut errors, "name", &self.name, default_language);
        into_result(errors)
    }
}

impl RequiresDefaultLanguage for UpdateSubjectRequest {
    fn check_default_language(&self, default_language: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            require_language(&mut errors, "name", name, default_language);
        }
        into_result(errors)
    }
}

impl Resource for Subject {
    type Create = CreateSubjectRequest;
    type Update = UpdateSubjectRequest;
    type Localized = LocalizedSubject;

    const NAME: &'static str = "subject";
    const FILTERABLE: &'static [&'static str] = &["code", "programId"];

    fn from_create(request: CreateSubjectRequest) -> Self {
        Self {
            name: request.name,
            code: request.code,
            program_id: request.program_id,
            description: request.description,
            credits: request.credits,
        }
    }

    fn localize(&self, languages: &LanguageContext) -> LocalizedSubject {
        LocalizedSubject {
            name: languages.resolve(&self.name),
            description: languages.resolve_opt(self.description.as_ref()),
        }
    }
}
