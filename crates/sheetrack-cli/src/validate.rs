use crate::output::CliError;
use sheetrack_core::model::EntityKind;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_USER_LEN: usize = 128;
pub const MAX_NOTE_LEN: usize = 10_000;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
    pub suggestion: String,
    pub code: &'static str,
}

impl ValidationError {
    pub fn new(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
        code: &'static str,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
            code,
        }
    }

    pub fn to_cli_error(&self) -> CliError {
        CliError::with_details(
            format!("invalid {} '{}': {}", self.field, self.value, self.reason),
            self.suggestion.clone(),
            self.code,
        )
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        err.to_cli_error()
    }
}

pub fn validate_title(s: &str) -> Result<(), ValidationError> {
    if s.trim().is_empty() {
        return Err(ValidationError::new(
            "title",
            s,
            "must not be empty",
            "provide a non-empty --title",
            "invalid_title",
        ));
    }
    if s.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::new(
            "title",
            s,
            format!("must be <= {MAX_TITLE_LEN} characters"),
            "shorten the title",
            "invalid_title",
        ));
    }
    if s.chars().any(char::is_control) {
        return Err(ValidationError::new(
            "title",
            s,
            "must not contain control characters",
            "remove control characters from the title",
            "invalid_title",
        ));
    }
    Ok(())
}

pub fn validate_url(s: &str) -> Result<(), ValidationError> {
    let value = s.trim();
    if !(value.starts_with("https://") || value.starts_with("http://")) {
        return Err(ValidationError::new(
            "url",
            s,
            "must be an http(s) link",
            "pass the full problem link, e.g. https://leetcode.com/problems/two-sum/",
            "invalid_url",
        ));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError::new(
            "url",
            s,
            "must not contain whitespace",
            "percent-encode spaces in the link",
            "invalid_url",
        ));
    }
    Ok(())
}

pub fn validate_user(s: &str) -> Result<(), ValidationError> {
    if s.chars().count() > MAX_USER_LEN {
        return Err(ValidationError::new(
            "user",
            s,
            format!("must be <= {MAX_USER_LEN} characters"),
            "use the stable key issued by your identity provider",
            "invalid_user",
        ));
    }
    if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::new(
            "user",
            s,
            "must not contain whitespace or control characters",
            "use the stable key issued by your identity provider",
            "invalid_user",
        ));
    }
    Ok(())
}

pub fn validate_note(s: &str) -> Result<(), ValidationError> {
    if s.chars().count() > MAX_NOTE_LEN {
        return Err(ValidationError::new(
            "note",
            format!("{}…", s.chars().take(24).collect::<String>()),
            format!("must be <= {MAX_NOTE_LEN} characters"),
            "keep notes short; link to longer write-ups instead",
            "invalid_note",
        ));
    }
    Ok(())
}

/// Check that `id` carries the key prefix of `expected`.
pub fn validate_id_kind(id: &str, expected: EntityKind) -> Result<(), ValidationError> {
    if EntityKind::from_id(id) == Some(expected) {
        return Ok(());
    }
    Err(ValidationError::new(
        "id",
        id,
        format!("expected a {expected} key ({}-…)", expected.id_prefix()),
        format!("run `sk list` to find the {expected} key"),
        "invalid_id",
    ))
}
