//! Prompt session HTTP handlers.
//!
//! ```text
//! POST /sessions/new/{session_id}?level=ice
//! GET /sessions/{session_id}
//! POST /sessions/{session_id}/respond {"prompt_id":"...","response":"..."}
//! DELETE /sessions/{session_id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::{
    RecordResponseRequest, SessionEntryPayload, SessionLookup, StartSessionRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::AuthenticatedUser;
use crate::inbound::http::prompts::{LevelQuery, MessageResponse};
use crate::inbound::http::schemas::{ErrorSchema, SessionEntrySchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    PROMPT_ID, RESPONSE, missing_field_error, optional_level, parse_prompt_id, parse_session_id,
    require_text,
};

/// Response from starting a session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionCreatedBody {
    pub session_id: String,
    /// Number of prompts drawn; at most ten.
    pub prompt_count: usize,
}

/// Session entries in draw order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionBody {
    #[schema(value_type = Vec<SessionEntrySchema>)]
    pub prompts: Vec<SessionEntryPayload>,
}

/// Request body for `POST /sessions/{session_id}/respond`.
///
/// An empty `response` string is a valid answer; `null` or an absent field
/// is not.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RespondBody {
    #[schema(format = "uuid")]
    pub prompt_id: Option<String>,
    pub response: Option<String>,
}

/// Confirmation returned after recording a response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RespondedBody {
    pub status: String,
    pub message: String,
}

fn lookup(user: AuthenticatedUser, raw_session_id: String) -> ApiResult<SessionLookup> {
    Ok(SessionLookup {
        owner: user.into_identity().user_id,
        session_id: parse_session_id(raw_session_id)?,
    })
}

/// Draw up to ten shuffled visible prompts into a new session.
#[utoipa::path(
    post,
    path = "/sessions/new/{session_id}",
    params(
        ("session_id" = String, Path, description = "Caller-chosen session identifier"),
        LevelQuery
    ),
    responses(
        (status = 201, description = "Session created", body = SessionCreatedBody),
        (status = 400, description = "Invalid session identifier", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No visible prompt matches", body = ErrorSchema),
        (status = 409, description = "Session identifier already in use", body = ErrorSchema)
    ),
    tags = ["sessions"],
    operation_id = "startSession"
)]
#[post("/sessions/new/{session_id}")]
pub async fn start_session(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    query: web::Query<LevelQuery>,
) -> ApiResult<HttpResponse> {
    let SessionLookup { owner, session_id } = lookup(user, path.into_inner())?;
    let started = state
        .sessions
        .start_session(StartSessionRequest {
            owner: owner.clone(),
            session_id,
            level: optional_level(query.into_inner().level),
        })
        .await?;
    info!(
        session_id = %started.session_id,
        user_id = %owner,
        prompt_count = started.prompt_count,
        "session started"
    );
    Ok(HttpResponse::Created().json(SessionCreatedBody {
        session_id: started.session_id.into(),
        prompt_count: started.prompt_count,
    }))
}

/// Fetch the caller's session entries.
#[utoipa::path(
    get,
    path = "/sessions/{session_id}",
    params(("session_id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session entries", body = SessionBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Session not found", body = ErrorSchema)
    ),
    tags = ["sessions"],
    operation_id = "getSession"
)]
#[get("/sessions/{session_id}")]
pub async fn get_session(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<SessionBody>> {
    let session = state
        .sessions
        .get_session(lookup(user, path.into_inner())?)
        .await?;
    Ok(web::Json(SessionBody {
        prompts: session
            .into_entries()
            .into_iter()
            .map(SessionEntryPayload::from)
            .collect(),
    }))
}

/// Record a response for one prompt of the caller's session.
#[utoipa::path(
    post,
    path = "/sessions/{session_id}/respond",
    params(("session_id" = String, Path, description = "Session identifier")),
    request_body = RespondBody,
    responses(
        (status = 201, description = "Response recorded", body = RespondedBody),
        (status = 400, description = "Missing prompt_id or response", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Session or prompt not found", body = ErrorSchema),
        (status = 409, description = "Response already recorded", body = ErrorSchema)
    ),
    tags = ["sessions"],
    operation_id = "respond"
)]
#[post("/sessions/{session_id}/respond")]
pub async fn respond(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<RespondBody>,
) -> ApiResult<HttpResponse> {
    let RespondBody {
        prompt_id,
        response,
    } = payload.into_inner();
    let prompt_id = require_text(prompt_id, PROMPT_ID)?;
    let response = response.ok_or_else(|| missing_field_error(RESPONSE))?;
    let SessionLookup { owner, session_id } = lookup(user, path.into_inner())?;
    let prompt_id = parse_prompt_id(&prompt_id)?;

    state
        .sessions
        .record_response(RecordResponseRequest {
            owner,
            session_id,
            prompt_id,
            response,
        })
        .await?;
    Ok(HttpResponse::Created().json(RespondedBody {
        status: "success".to_owned(),
        message: "Response recorded".to_owned(),
    }))
}

/// Delete the caller's session.
#[utoipa::path(
    delete,
    path = "/sessions/{session_id}",
    params(("session_id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session deleted", body = MessageResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Session belongs to another user", body = ErrorSchema),
        (status = 404, description = "Session not found", body = ErrorSchema)
    ),
    tags = ["sessions"],
    operation_id = "deleteSession"
)]
#[delete("/sessions/{session_id}")]
pub async fn delete_session(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let target = lookup(user, path.into_inner())?;
    let (owner, session_id) = (target.owner.clone(), target.session_id.clone());
    state.sessions.delete_session(target).await?;
    info!(%session_id, user_id = %owner, "session deleted");
    Ok(web::Json(MessageResponse {
        message: format!("session {session_id} deleted"),
    }))
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
