use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// One failed check, shaped like the `errors` array clients already parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl FieldError {
    pub fn body(param: &str, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: Some(param.to_string()),
            location: Some("body".to_string()),
        }
    }

    /// An error not tied to a request field
    pub fn general(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: None,
            location: None,
        }
    }
}

/// Collects every failed check of a request body before reporting
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field must be present and not blank
    pub fn required(mut self, param: &str, value: Option<&str>, msg: &str) -> Self {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.errors.push(FieldError::body(param, msg));
        }
        self
    }

    pub fn email(mut self, param: &str, value: Option<&str>, msg: &str) -> Self {
        if !value.map_or(false, is_valid_email) {
            self.errors.push(FieldError::body(param, msg));
        }
        self
    }

    pub fn min_len(mut self, param: &str, value: Option<&str>, min: usize, msg: &str) -> Self {
        if value.map_or(true, |v| v.chars().count() < min) {
            self.errors.push(FieldError::body(param, msg));
        }
        self
    }

    /// Optional date must parse when present
    pub fn date(mut self, param: &str, value: Option<&str>, msg: &str) -> Self {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            if parse_date(v).is_none() {
                self.errors.push(FieldError::body(param, msg));
            }
        }
        self
    }

    pub fn check(mut self, param: &str, ok: bool, msg: &str) -> Self {
        if !ok {
            self.errors.push(FieldError::body(param, msg));
        }
        self
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (date part kept).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}
