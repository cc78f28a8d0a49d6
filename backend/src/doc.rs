//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every inbound HTTP endpoint, the schema wrappers from
//! [`crate::inbound::http::schemas`], and two alternative security schemes:
//! the private session cookie set by `POST /login` and a bearer ID token.
//!
//! The generated document backs Swagger UI in debug builds and is exported
//! via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, PromptSchema, SessionEntrySchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the cookie and bearer schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /login.",
            ))),
        );
        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("ID token issued by the identity provider."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Promptdeck API",
        description = "Conversation prompts, prompt sessions and account flows.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = []), ("BearerAuth" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::me,
        crate::inbound::http::auth::logout,
        crate::inbound::http::prompts::list_prompts,
        crate::inbound::http::prompts::random_prompt,
        crate::inbound::http::prompts::create_prompt,
        crate::inbound::http::prompts::delete_prompt,
        crate::inbound::http::sessions::start_session,
        crate::inbound::http::sessions::get_session,
        crate::inbound::http::sessions::respond,
        crate::inbound::http::sessions::delete_session,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema, PromptSchema, SessionEntrySchema)),
    tags(
        (name = "accounts", description = "Registration, login and the current identity"),
        (name = "prompts", description = "Prompt catalog"),
        (name = "sessions", description = "Prompt sessions and recorded responses"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
