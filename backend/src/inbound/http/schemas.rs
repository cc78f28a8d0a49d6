//! OpenAPI schema definitions for domain types.
//!
//! Domain types do not derive `ToSchema`; the wrappers here mirror their
//! serialized shape and are registered with utoipa under the domain names.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or a required field is missing.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Credentials are missing or could not be verified.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The caller does not own the resource.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The prompt, session or entry does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request collides with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// The record store or identity provider is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "session s1 not found")]
    message: String,
    /// Correlation identifier, also sent as the `trace-id` header.
    #[schema(example = "6f1c1e4e-0d8b-4a43-9f7e-0c8a2f2f9d11")]
    trace_id: Option<String>,
    /// Supplementary details, e.g. the existing response on a conflict.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::ports::PromptPayload`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::PromptPayload)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PromptSchema {
    #[schema(format = "uuid")]
    prompt_id: String,
    #[schema(example = "What song do you know every word to?")]
    text: String,
    /// Free-form level; filters compare case-insensitively.
    #[schema(example = "ice")]
    level: String,
    /// User id of the owner, or `ADMIN` for built-in prompts.
    owner_id: String,
    public: bool,
    #[schema(format = "date-time")]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::ports::SessionEntryPayload`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::SessionEntryPayload)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SessionEntrySchema {
    #[schema(format = "uuid")]
    prompt_id: String,
    text: String,
    level: String,
    /// `null` until the owner responds.
    response: Option<String>,
}
