//! Field constraint checks
//!
//! Every entity validates its own fields before it is written. The checks here
//! cover the declared column constraints: required text, maximum length in
//! characters, and syntactically valid URLs. Date fields are typed as
//! `chrono::NaiveDate`, so an impossible calendar date never gets this far.

use std::fmt;

use url::Url;

/// Default maximum length of a URL field when none is declared
pub const DEFAULT_URL_MAX_LENGTH: usize = 200;

/// URL schemes accepted by [`check_url`]
const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];

/// What went wrong with a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The field is empty or whitespace only
    Required,
    /// The value is longer than the declared maximum (in characters)
    TooLong { max: usize, actual: usize },
    /// The value is not an absolute http(s)/ftp(s) URL with a host
    InvalidUrl,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "this field is required"),
            Self::TooLong { max, actual } => write!(
                f,
                "ensure this value has at most {} characters (it has {})",
                max, actual
            ),
            Self::InvalidUrl => write!(f, "enter a valid URL"),
        }
    }
}

/// A field constraint violation raised before a record is persisted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {kind}")]
pub struct ValidationError {
    pub field: &'static str,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(field: &'static str, kind: ValidationErrorKind) -> Self {
        Self { field, kind }
    }
}

/// Check a required text field with no declared maximum (long text)
pub fn check_required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, ValidationErrorKind::Required));
    }
    Ok(())
}

/// Check a required text field against its maximum length
pub fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    check_required(field, value)?;
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::new(
            field,
            ValidationErrorKind::TooLong { max, actual },
        ));
    }
    Ok(())
}

/// Check a required URL field: length first, then syntax
pub fn check_url(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    check_text(field, value, max)?;
    if !is_valid_url(value) {
        return Err(ValidationError::new(field, ValidationErrorKind::InvalidUrl));
    }
    Ok(())
}

fn is_valid_url(value: &str) -> bool {
    // The parser strips tabs and newlines and encodes spaces, so reject them up front
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    match Url::parse(value) {
        Ok(url) => {
            ALLOWED_URL_SCHEMES.contains(&url.scheme())
                && url.host_str().map_or(false, |host| !host.is_empty())
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_required_rejects_blank() {
        assert_eq!(
            check_required("content", "   "),
            Err(ValidationError::new("content", ValidationErrorKind::Required))
        );
        assert!(check_required("content", "Tips").is_ok());
    }

    #[test]
    fn test_text_length_counts_characters() {
        // 4 characters, 8 bytes
        assert!(check_text("author", "ÄÖÜß", 4).is_ok());
        let err = check_text("author", "ÄÖÜßx", 4).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::TooLong { max: 4, actual: 5 });
    }

    #[test]
    fn test_url_accepts_common_schemes() {
        assert!(check_url("link", "https://x.test/a.png", 200).is_ok());
        assert!(check_url("link", "http://example.com", 200).is_ok());
        assert!(check_url("link", "ftp://files.example.com/a.zip", 200).is_ok());
    }

    #[test]
    fn test_url_rejects_bad_input() {
        for bad in ["not a url", "example.com", "mailto:a@b.test", "javascript:alert(1)", " https://x.test", "https://x.test/a.png\n"] {
            let err = check_url("link", bad, 200).unwrap_err();
            assert_eq!(err.kind, ValidationErrorKind::InvalidUrl, "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_url_rejects_embedded_whitespace_and_control_chars() {
        for bad in [
            "https://x.te\nst/a.png",
            "https://x.test/a\tb.png",
            "https://x.test/a b.png",
            "http://exa\rmple.com",
            "https://x.test/a.png\u{0}",
            "https://x.test/\u{a0}a.png",
        ] {
            let err = check_url("image_url", bad, 500).unwrap_err();
            assert_eq!(err.kind, ValidationErrorKind::InvalidUrl, "accepted {:?}", bad);
        }
        assert!(check_url("image_url", "https://x.test/a%20b.png", 500).is_ok());
    }

    #[test]
    fn test_url_length_checked_before_syntax() {
        let long = format!("https://x.test/{}", "a".repeat(300));
        let err = check_url("image_url", &long, 200).unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::TooLong { max: 200, .. }));
    }

    #[test]
    fn test_error_message_names_field() {
        let err = ValidationError::new("title", ValidationErrorKind::TooLong { max: 255, actual: 256 });
        assert_eq!(
            err.to_string(),
            "title: ensure this value has at most 255 characters (it has 256)"
        );
    }

    proptest! {
        #[test]
        fn property_text_within_limit_accepted(value in "[a-zA-Z0-9 ]{0,40}[a-z]", max in 41usize..300) {
            prop_assert!(check_text("title", &value, max).is_ok());
        }

        #[test]
        fn property_text_over_limit_rejected(extra in 1usize..50, max in 1usize..100) {
            let value = "x".repeat(max + extra);
            let err = check_text("title", &value, max).unwrap_err();
            prop_assert_eq!(err.kind, ValidationErrorKind::TooLong { max, actual: max + extra });
        }
    }
}
