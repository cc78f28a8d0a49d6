//! Prompt catalog HTTP handlers.
//!
//! ```text
//! GET /prompts?level=ice
//! GET /prompts/random?level=ice
//! POST /prompts {"text":"...","level":"ice"}
//! DELETE /prompts/{prompt_id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    CreatePromptRequest, DeletePromptRequest, ListPromptsRequest, PickPromptRequest, PromptPayload,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::AuthenticatedUser;
use crate::inbound::http::schemas::{ErrorSchema, PromptSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    LEVEL, TEXT, optional_level, parse_prompt_id, require_text, required_level,
};

/// Optional `level` query parameter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LevelQuery {
    /// Level to filter by, compared case-insensitively.
    pub level: Option<String>,
}

/// Request body for `POST /prompts`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatePromptBody {
    pub text: Option<String>,
    pub level: Option<String>,
}

/// Identifier of a newly created prompt.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PromptCreatedBody {
    #[schema(format = "uuid")]
    pub prompt_id: String,
}

/// Confirmation returned after deleting a prompt.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// List ADMIN prompts and the caller's own, optionally filtered by level.
#[utoipa::path(
    get,
    path = "/prompts",
    params(LevelQuery),
    responses(
        (status = 200, description = "Visible prompts", body = [PromptSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Record store unavailable", body = ErrorSchema)
    ),
    tags = ["prompts"],
    operation_id = "listPrompts"
)]
#[get("/prompts")]
pub async fn list_prompts(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<LevelQuery>,
) -> ApiResult<web::Json<Vec<PromptPayload>>> {
    let request = ListPromptsRequest {
        viewer: user.into_identity().user_id,
        level: optional_level(query.into_inner().level),
    };
    let prompts = state.prompts.list_visible(request).await?;
    Ok(web::Json(prompts.into_iter().map(PromptPayload::from).collect()))
}

/// Pick one visible prompt at random from the requested level.
#[utoipa::path(
    get,
    path = "/prompts/random",
    params(LevelQuery),
    responses(
        (status = 200, description = "Random prompt", body = PromptSchema),
        (status = 400, description = "Missing level", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No prompt at this level", body = ErrorSchema)
    ),
    tags = ["prompts"],
    operation_id = "randomPrompt"
)]
#[get("/prompts/random")]
pub async fn random_prompt(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<LevelQuery>,
) -> ApiResult<web::Json<PromptPayload>> {
    let level = required_level(query.into_inner().level)?;
    let prompt = state
        .prompts
        .pick_random(PickPromptRequest {
            viewer: user.into_identity().user_id,
            level,
        })
        .await?;
    Ok(web::Json(PromptPayload::from(prompt)))
}

/// Create a public prompt owned by the caller.
#[utoipa::path(
    post,
    path = "/prompts",
    request_body = CreatePromptBody,
    responses(
        (status = 201, description = "Prompt created", body = PromptCreatedBody),
        (status = 400, description = "Missing text or level", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["prompts"],
    operation_id = "createPrompt"
)]
#[post("/prompts")]
pub async fn create_prompt(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreatePromptBody>,
) -> ApiResult<HttpResponse> {
    let CreatePromptBody { text, level } = payload.into_inner();
    let request = CreatePromptRequest {
        owner: user.into_identity().user_id,
        text: require_text(text, TEXT)?,
        level: require_text(level, LEVEL)?,
    };
    let created = state.prompts.create_prompt(request).await?;
    Ok(HttpResponse::Created().json(PromptCreatedBody {
        prompt_id: created.prompt_id.to_string(),
    }))
}

/// Delete a prompt the caller owns.
#[utoipa::path(
    delete,
    path = "/prompts/{prompt_id}",
    params(("prompt_id" = String, Path, description = "Prompt identifier")),
    responses(
        (status = 200, description = "Prompt deleted", body = MessageResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller does not own the prompt", body = ErrorSchema),
        (status = 404, description = "Prompt not found", body = ErrorSchema)
    ),
    tags = ["prompts"],
    operation_id = "deletePrompt"
)]
#[delete("/prompts/{prompt_id}")]
pub async fn delete_prompt(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let prompt_id = parse_prompt_id(&path.into_inner())?;
    let caller = user.into_identity().user_id;
    state
        .prompts
        .delete_prompt(DeletePromptRequest {
            caller: caller.clone(),
            prompt_id,
        })
        .await?;
    info!(%prompt_id, user_id = %caller, "prompt deleted");
    Ok(web::Json(MessageResponse {
        message: format!("prompt {prompt_id} deleted"),
    }))
}

#[cfg(test)]
#[path = "prompts_tests.rs"]
mod tests;
