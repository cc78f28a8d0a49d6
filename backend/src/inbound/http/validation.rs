//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{Error, Level, PromptId, SessionId};

/// Validation error codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidSessionId,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidSessionId => "invalid_session_id",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) const LEVEL: FieldName = FieldName::new("level");
pub(crate) const TEXT: FieldName = FieldName::new("text");
pub(crate) const PROMPT_ID: FieldName = FieldName::new("prompt_id");
pub(crate) const RESPONSE: FieldName = FieldName::new("response");
pub(crate) const SESSION_ID: FieldName = FieldName::new("session_id");

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": ErrorCode::MissingField.as_str(),
    }))
}

/// Require a present, non-blank string field.
pub(crate) fn require_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))
}

/// Optional level filter; an empty query value counts as absent.
pub(crate) fn optional_level(value: Option<String>) -> Option<Level> {
    value.and_then(|raw| Level::new(raw).ok())
}

/// Mandatory level; absent or blank values are rejected.
pub(crate) fn required_level(value: Option<String>) -> Result<Level, Error> {
    optional_level(value).ok_or_else(|| missing_field_error(LEVEL))
}

pub(crate) fn parse_session_id(raw: String) -> Result<SessionId, Error> {
    SessionId::new(raw.clone()).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": SESSION_ID.as_str(),
            "value": raw,
            "code": ErrorCode::InvalidSessionId.as_str(),
        }))
    })
}

/// Prompt identifiers that are not UUIDs cannot name a stored prompt, so
/// they surface as `not_found` rather than a validation failure.
pub(crate) fn parse_prompt_id(raw: &str) -> Result<PromptId, Error> {
    PromptId::parse(raw).map_err(|_| Error::not_found(format!("prompt {raw} not found")))
}
