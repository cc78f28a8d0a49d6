//! Account handlers: registration, password login, caller lookup and logout.
//!
//! ```text
//! POST /register {"username":"ada","email":"ada@example.com","password":"..."}
//! POST /login {"email":"ada@example.com","password":"..."}
//! GET /me
//! POST /logout (GET is also accepted)
//! ```

use actix_web::{HttpResponse, get, post, route, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::Error;
use crate::domain::ports::{LoginRequest, RegisterRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, require_text};

const USERNAME: FieldName = FieldName::new("username");
const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");

/// Registration body for `POST /register`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterBody {
    pub username: Option<String>,
    pub email: Option<String>,
    #[schema(format = Password)]
    pub password: Option<String>,
}

/// Login body for `POST /login`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginBody {
    pub email: Option<String>,
    #[schema(format = Password)]
    pub password: Option<String>,
}

/// Confirmation returned after a successful registration.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RegisteredResponse {
    pub message: String,
}

/// Provider tokens returned by `POST /login`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub id_token: String,
}

/// Identity of the resolved caller.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub user_id: String,
    pub email: Option<String>,
}

fn require_password(value: Option<String>) -> Result<Zeroizing<String>, Error> {
    value
        .filter(|raw| !raw.is_empty())
        .map(Zeroizing::new)
        .ok_or_else(|| missing_field_error(PASSWORD))
}

/// Create an account with the identity provider.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterBody,
    responses(
        (status = 201, description = "Account created; confirmation pending", body = RegisteredResponse),
        (status = 400, description = "Missing field or rejected by the provider", body = ErrorSchema),
        (status = 503, description = "Identity provider unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterBody>,
) -> ApiResult<HttpResponse> {
    let RegisterBody {
        username,
        email,
        password,
    } = payload.into_inner();
    let request = RegisterRequest {
        username: require_text(username, USERNAME)?,
        email: require_text(email, EMAIL)?,
        password: require_password(password)?,
    };
    let username = request.username.clone();
    state.accounts.register(request).await?;
    info!(%username, "account registered");
    Ok(HttpResponse::Created().json(RegisteredResponse {
        message: "Registration successful. Check your email to confirm your account.".to_owned(),
    }))
}

/// Exchange email and password for tokens and start a cookie session.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Login success", body = TokenResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Missing field", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Identity provider unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginBody>,
) -> ApiResult<web::Json<TokenResponse>> {
    let LoginBody { email, password } = payload.into_inner();
    let request = LoginRequest {
        username: require_text(email, EMAIL)?,
        password: require_password(password)?,
    };
    let response = state.accounts.login(request).await?;
    session.persist_identity(&response.identity)?;
    Ok(web::Json(TokenResponse {
        access_token: response.tokens.access_token,
        id_token: response.tokens.id_token,
    }))
}

/// Identity of the caller as resolved from the cookie or bearer token.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Caller identity", body = MeResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "me"
)]
#[get("/me")]
pub async fn me(user: AuthenticatedUser) -> web::Json<MeResponse> {
    let identity = user.into_identity();
    web::Json(MeResponse {
        user_id: identity.user_id.into(),
        email: identity.email.map(String::from),
    })
}

/// Drop the cookie session. Bearer tokens are unaffected.
///
/// Routed for both `GET` and `POST`.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["accounts"],
    operation_id = "logout",
    security([])
)]
#[route("/logout", method = "GET", method = "POST")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}
