//! Question bank models.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::multilingual::{
    into_result, lenient, require_language, validate_optional_array, validate_required_text,
    Multilingual, MultilingualArray, MultilingualText, RequiresDefaultLanguage,
};
use super::record::{Entity, Resource};
use crate::services::LanguageContext;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// A question in a subject's question bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub subject_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(deserialize_with = "lenient::deserialize")]
    pub prompt: MultilingualText,
    #[serde(
        default,
        deserialize_with = "lenient::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub options: Option<MultilingualArray>,
    /// Index into `options`, for multiple-choice questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<usize>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Entity for Question {
    const COLLECTION: &'static str = "questions";
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_correct_option"))]
pub struct CreateQuestionRequest {
    #[validate(custom(function = "shared::validation::validate_document_id"))]
    pub subject_id: String,

    #[validate(custom(function = "shared::validation::validate_document_id"))]
    pub course_id: Option<String>,

    #[validate(custom(function = "validate_required_text"))]
    pub prompt: MultilingualText,

    #[validate(custom(function = "validate_optional_array"))]
    pub options: Option<MultilingualArray>,

    pub correct_option: Option<usize>,

    #[serde(default)]
    pub difficulty: Difficulty,

    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 tags are allowed"))]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_required_text"))]
    pub prompt: Option<MultilingualText>,

    #[serde(
        default,
        deserialize_with = "shared::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom(function = "validate_optional_array"))]
    pub options: Option<Option<MultilingualArray>>,

    #[serde(
        default,
        deserialize_with = "shared::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_option: Option<Option<usize>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 10, message = "At most 10 tags are allowed"))]
    pub tags: Option<Vec<String>>,
}

/// The correct option must point at an option that exists in every
/// language the options were authored in.
fn validate_correct_option(request: &CreateQuestionRequest) -> Result<(), ValidationError> {
    let Some(index) = request.correct_option else {
        return Ok(());
    };
    let shortest = match &request.options {
        None => 0,
        Some(Multilingual::Plain(options)) => options.len(),
        Some(Multilingual::Localized(map)) => map
            .values()
            .filter(|options| !options.is_empty())
            .map(Vec::len)
            .min()
            .unwrap_or(0),
    };
    if index < shortest {
        Ok(())
    } else {
        let mut err = ValidationError::new("correct_option_range");
        err.message = Some("correctOption must index an existing option".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedQuestion {
    pub prompt: String,
    pub options: Vec<String>,
}

impl RequiresDefaultLanguage for CreateQuestionRequest {
    fn check_default_language(&self, default_language: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_language(&mut errors, "prompt", &self.prompt, default_language);
        into_result(errors)
    }
}

impl RequiresDefaultLanguage for UpdateQuestionRequest {
    fn check_default_language(&self, default_language: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(prompt) = &self.prompt {
            require_language(&mut errors, "prompt", prompt, default_language);
        }
        into_result(errors)
    }
}

impl Resource for Question {
    type Create = CreateQuestionRequest;
    type Update = UpdateQuestionRequest;
    type Localized = LocalizedQuestion;

    const NAME: &'static str = "question";
    const FILTERABLE: &'static [&'static str] = &["subjectId", "courseId", "difficulty"];

    fn from_create(request: CreateQuestionRequest) -> Self {
        Self {
            subject_id: request.subject_id,
            course_id: request.course_id,
            prompt: request.prompt,
            options: request.options,
            correct_option: request.correct_option,
            difficulty: request.difficulty,
            tags: request.tags,
        }
    }

    fn localize(&self, languages: &LanguageContext) -> LocalizedQuestion {
        LocalizedQuestion {
            prompt: languages.resolve(&self.prompt),
            options: languages.resolve_opt(self.options.as_ref()),
        }
    }
}
