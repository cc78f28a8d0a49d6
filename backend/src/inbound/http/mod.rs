//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod identity;
pub mod prompts;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod sessions;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register the account, prompt and session endpoints together with the
/// extractor error handlers that render the shared error payload.
///
/// Callers provide `web::Data<HttpState>` and the cookie session middleware.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use promptdeck::inbound::http::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(auth::register)
        .service(auth::login)
        .service(auth::me)
        .service(auth::logout)
        .service(prompts::list_prompts)
        .service(prompts::random_prompt)
        .service(prompts::create_prompt)
        .service(prompts::delete_prompt)
        .service(sessions::start_session)
        .service(sessions::get_session)
        .service(sessions::respond)
        .service(sessions::delete_session);
}
