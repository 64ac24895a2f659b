//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of a document identifier.
pub const MAX_ID_LENGTH: usize = 128;

lazy_static::lazy_static! {
    /// ISO 639-1/639-2 code with an optional region, e.g. `en`, `te`, `pt-BR`.
    pub static ref LANGUAGE_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z]{2,3}(-[A-Z]{2})?$").unwrap();

    /// Catalog codes such as `MATH101` or `CS-2040`.
    pub static ref CATALOG_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Z]{2,8}-?[0-9]{1,5}[A-Z]?$").unwrap();
}

/// Validates a language code.
pub fn validate_language_code(code: &str) -> Result<(), ValidationError> {
    if LANGUAGE_CODE_REGEX.is_match(code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("language_code");
        err.message = Some("Language code must look like 'en' or 'pt-BR'".into());
        Err(err)
    }
}

/// Validates a course, subject, or program catalog code.
pub fn validate_catalog_code(code: &str) -> Result<(), ValidationError> {
    if CATALOG_CODE_REGEX.is_match(code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("catalog_code");
        err.message = Some("Code must be uppercase letters followed by digits, e.g. MATH101".into());
        Err(err)
    }
}

/// Validates a document identifier supplied by a caller.
///
/// Identifiers are opaque but must be non-empty, bounded, and free of path
/// separators and whitespace.
pub fn validate_document_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > MAX_ID_LENGTH {
        let mut err = ValidationError::new("document_id_length");
        err.message = Some("Identifier must be between 1 and 128 characters".into());
        return Err(err);
    }
    if id.chars().any(|c| c == '/' || c.is_whitespace()) {
        let mut err = ValidationError::new("document_id_chars");
        err.message = Some("Identifier must not contain '/' or whitespace".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_language_code_valid() {
        assert!(validate_language_code("en").is_ok());
        assert!(validate_language_code("te").is_ok());
        assert!(validate_language_code("fil").is_ok());
        assert!(validate_language_code("pt-BR").is_ok());
    }

    #[test]
    fn test_validate_language_code_invalid() {
        assert!(validate_language_code("").is_err());
        assert!(validate_language_code("EN").is_err());
        assert!(validate_language_code("english").is_err());
        assert!(validate_language_code("pt_br").is_err());
    }

    #[test]
    fn test_validate_language_code_error_message() {
        let err = validate_language_code("xx-yy").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Language code must look like 'en' or 'pt-BR'"
        );
    }

    #[test]
    fn test_validate_catalog_code() {
        assert!(validate_catalog_code("MATH101").is_ok());
        assert!(validate_catalog_code("CS-2040").is_ok());
        assert!(validate_catalog_code("BIO110L").is_ok());
        assert!(validate_catalog_code("math101").is_err());
        assert!(validate_catalog_code("101").is_err());
        assert!(validate_catalog_code("MATH").is_err());
    }

    #[test]
    fn test_validate_document_id() {
        assert!(validate_document_id("d0c5f5a2-6b1e-4a39-9d8e-3f5e0b3a1c77").is_ok());
        assert!(validate_document_id("firebase:uid:42").is_ok());
        assert!(validate_document_id("").is_err());
        assert!(validate_document_id("a/b").is_err());
        assert!(validate_document_id("has space").is_err());
        assert!(validate_document_id(&"x".repeat(MAX_ID_LENGTH + 1)).is_err());
    }
}
