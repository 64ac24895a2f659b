//! Enrollment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::multilingual::RequiresDefaultLanguage;
use super::record::{Entity, Resource};
use crate::services::LanguageContext;

/// Lifecycle state of an enrollment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Withdrawn,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Withdrawn => "withdrawn",
        }
    }

    /// Pending and active enrollments hold a seat in the course.
    pub fn holds_seat(&self) -> bool {
        matches!(self, EnrollmentStatus::Pending | EnrollmentStatus::Active)
    }
}

impl FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(EnrollmentStatus::Pending),
            "active" => Ok(EnrollmentStatus::Active),
            "completed" => Ok(EnrollmentStatus::Completed),
            "withdrawn" => Ok(EnrollmentStatus::Withdrawn),
            _ => Err(format!("Invalid enrollment status: {}", s)),
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A student's registration in a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub student_id: String,
    pub course_id: String,
    #[serde(default)]
    pub status: EnrollmentStatus,
    #[serde(with = "shared::time::micros")]
    pub enrolled_at: DateTime<Utc>,
}

impl Entity for Enrollment {
    const COLLECTION: &'static str = "enrollments";
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollmentRequest {
    #[validate(custom(function = "shared::validation::validate_document_id"))]
    pub student_id: String,

    #[validate(custom(function = "shared::validation::validate_document_id"))]
    pub course_id: String,

    #[serde(default)]
    pub status: EnrollmentStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnrollmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EnrollmentStatus>,
}

impl RequiresDefaultLanguage for CreateEnrollmentRequest {}

impl RequiresDefaultLanguage for UpdateEnrollmentRequest {}

/// Enrollments carry no translatable text.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedEnrollment {
    pub status: &'static str,
}

impl Resource for Enrollment {
    type Create = CreateEnrollmentRequest;
    type Update = UpdateEnrollmentRequest;
    type Localized = LocalizedEnrollment;

    const NAME: &'static str = "enrollment";
    const FILTERABLE: &'static [&'static str] = &["studentId", "courseId", "status"];

    fn from_create(request: CreateEnrollmentRequest) -> Self {
        Self {
            student_id: request.student_id,
            course_id: request.course_id,
            status: request.status,
            enrolled_at: shared::time::truncate_to_micros(Utc::now()),
        }
    }

    fn localize(&self, _languages: &LanguageContext) -> LocalizedEnrollment {
        LocalizedEnrollment {
            status: self.status.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip_str() {
        for status in [
            EnrollmentStatus::Pending,
            EnrollmentStatus::Active,
            EnrollmentStatus::Completed,
            EnrollmentStatus::Withdrawn,
        ] {
            assert_eq!(status.as_str().parse::<EnrollmentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_holds_seat() {
        assert!(EnrollmentStatus::Pending.holds_seat());
        assert!(EnrollmentStatus::Active.holds_seat());
        assert!(!EnrollmentStatus::Completed.holds_seat());
        assert!(!EnrollmentStatus::Withdrawn.holds_seat());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(EnrollmentStatus::Withdrawn).unwrap(),
            serde_json::json!("withdrawn")
        );
    }
}
