//! Input validation for request bodies. Every validator trims its input and
//! returns the cleaned value, or `AppError::Validation` naming the failing field.

use crate::errors::AppError;

pub const MIN_PASSWORD_CHARS: usize = 6;
const PROJECT_NAME_CHARS: (usize, usize) = (2, 120);
const MAX_DESCRIPTION_CHARS: usize = 400;
const MIN_KEY_CHARS: usize = 2;
const MIN_TITLE_CHARS: usize = 2;
const MIN_BODY_CHARS: usize = 10;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn require_min(field: &str, value: &str, min: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if char_len(trimmed) < min {
        return Err(AppError::Validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims and lowercases an email after checking it has a plausible `local@domain.tld` shape.
pub fn validate_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    let invalid = || AppError::Validation("email must be a valid email address".to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if char_len(password) < MIN_PASSWORD_CHARS {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    Ok(())
}

/// Optional display name; blank becomes `None`.
pub fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
}

pub fn validate_project(name: &str, description: Option<&str>) -> Result<NewProject, AppError> {
    let name = name.trim();
    let (min, max) = PROJECT_NAME_CHARS;
    let len = char_len(name);
    if len < min || len > max {
        return Err(AppError::Validation(format!(
            "name must be between {min} and {max} characters"
        )));
    }

    let description = clean_optional(description);
    if let Some(d) = &description {
        if char_len(d) > MAX_DESCRIPTION_CHARS {
            return Err(AppError::Validation(format!(
                "description must be at most {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
    }

    Ok(NewProject {
        name: name.to_string(),
        description,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub question_key: String,
    pub title: String,
    pub body: String,
    pub tags: String,
}

pub fn validate_answer(
    question_key: &str,
    title: &str,
    body: &str,
    tags: Option<&str>,
) -> Result<NewAnswer, AppError> {
    Ok(NewAnswer {
        question_key: require_min("question_key", question_key, MIN_KEY_CHARS)?,
        title: require_min("title", title, MIN_TITLE_CHARS)?,
        body: require_min("body", body, MIN_BODY_CHARS)?,
        tags: tags.map(str::trim).unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(
            validate_email("  Buyer@Example.COM ").unwrap(),
            "buyer@example.com"
        );
        assert_eq!(validate_email("a@b.co").unwrap(), "a@b.co");
    }

    #[test]
    fn test_email_shape() {
        for bad in [
            "",
            "plainaddress",
            "@example.com",
            "user@",
            "user@localhost",
            "user@example..com",
            "user@@example.com",
            "us er@example.com",
            "user@.com",
        ] {
            assert!(validate_email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        // characters, not bytes
        assert!(validate_password("ééééé").is_err());
    }

    #[test]
    fn test_project_name_bounds() {
        assert!(validate_project(" a ", None).is_err());
        assert!(validate_project(&"x".repeat(121), None).is_err());
        let project = validate_project("  City Tender  ", Some("   ")).unwrap();
        assert_eq!(project.name, "City Tender");
        assert_eq!(project.description, None);
        assert!(validate_project(&"x".repeat(120), None).is_ok());
    }

    #[test]
    fn test_project_description_limit() {
        assert!(validate_project("Tender", Some(&"d".repeat(400))).is_ok());
        let err = validate_project("Tender", Some(&"d".repeat(401))).unwrap_err();
        assert_eq!(message(err), "description must be at most 400 characters");
    }

    #[test]
    fn test_answer_fields_are_trimmed() {
        let answer = validate_answer(
            " security ",
            " Security Posture ",
            "  ISO 27001 certified since 2019. ",
            Some(" security, iso "),
        )
        .unwrap();
        assert_eq!(answer.question_key, "security");
        assert_eq!(answer.title, "Security Posture");
        assert_eq!(answer.body, "ISO 27001 certified since 2019.");
        assert_eq!(answer.tags, "security, iso");
    }

    #[test]
    fn test_answer_minimums() {
        let err = validate_answer("k", "Title", "long enough body", None).unwrap_err();
        assert_eq!(message(err), "question_key must be at least 2 characters");
        let err = validate_answer("key", "T", "long enough body", None).unwrap_err();
        assert_eq!(message(err), "title must be at least 2 characters");
        let err = validate_answer("key", "Title", "  too short  ", None).unwrap_err();
        assert_eq!(message(err), "body must be at least 10 characters");
        assert_eq!(
            validate_answer("key", "Title", "long enough body", None)
                .unwrap()
                .tags,
            ""
        );
    }
}
