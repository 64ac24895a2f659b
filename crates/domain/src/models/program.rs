//! Academic program models.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::multilingual::{
    into_result, lenient, require_language, validate_optional_text, validate_required_text,
    MultilingualText, RequiresDefaultLanguage,
};
use super::record::{Entity, Resource};
use crate::services::LanguageContext;

/// A degree or certificate program grouping subjects and courses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(deserialize_with = "lenient::deserialize")]
    pub name: MultilingualText,
    pub code: String,
    #[serde(
        default,
        deserialize_with = "lenient::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<MultilingualText>,
    pub duration_years: u8,
}

impl Entity for Program {
    const COLLECTION: &'static str = "programs";
}

/// Request payload for creating a program.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProgramRequest {
    #[validate(custom(function = "validate_required_text"))]
    pub name: MultilingualText,

    #[validate(custom(function = "shared::validation::validate_catalog_code"))]
    pub code: String,

    #[validate(custom(function = "validate_optional_text"))]
    pub description: Option<MultilingualText>,

    #[validate(range(min = 1, max = 10, message = "Duration must be between 1 and 10 years"))]
    pub duration_years: u8,
}

/// Request payload for updating a program.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgramRequest {
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
    #[validate(custom(function = "validate_optional_text"))]
    pub description: Option<Option<MultilingualText>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 10, message = "Duration must be between 1 and 10 years"))]
    pub duration_years: Option<u8>,
}

/// Program with its text resolved to one language.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedProgram {
    pub name: String,
    pub description: String,
    pub available_languages: Vec<String>,
}

impl RequiresDefaultLanguage for CreateProgramRequest {
    fn check_default_language(&self, default_language: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_language(&mut errors, "name", &self.name, default_language);
        into_result(errors)
    }
}

impl RequiresDefaultLanguage for UpdateProgramRequest {
    fn check_default_language(&self, default_language: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            require_language(&mut errors, "name", name, default_language);
        }
        into_result(errors)
    }
}

impl Resource for Program {
    type Create = CreateProgramRequest;
    type Update = UpdateProgramRequest;
    type Localized = LocalizedProgram;

    const NAME: &'static str = "program";
    const FILTERABLE: &'static [&'static str] = &["code"];

    fn from_create(request: CreateProgramRequest) -> Self {
        Self {
            name: request.name,
            code: request.code,
            description: request.description,
            duration_years: request.duration_years,
        }
    }

    fn localize(&self, languages: &LanguageContext) -> LocalizedProgram {
        LocalizedProgram {
            name: languages.resolve(&self.name),
            description: languages.resolve_opt(self.description.as_ref()),
            available_languages: self
                .name
                .available_languages(&languages.fallback)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}
