//! End-to-end flows over the full route table with the in-memory record store
//! and a JWT verifier backed by a fixture key set.

use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};

use promptdeck::Trace;
use promptdeck::domain::ports::{
    AuthTokens, IdentityProvider, IdentityProviderError, SignUpRequest,
};
use promptdeck::domain::{
    AccountService, PromptCatalogService, SessionEngineService, TRACE_ID_HEADER,
    seed_admin_prompts,
};
use promptdeck::inbound::http::configure;
use promptdeck::inbound::http::state::HttpState;
use promptdeck::outbound::identity::{JwtIdentityVerifier, StaticKeySetSource, TokenExpectations};
use promptdeck::outbound::memory::MemoryPromptStore;

const SIGNING_KEY: &str = include_str!("fixtures/jwt_signing_key.pem");
const JWKS: &str = include_str!("fixtures/jwks.json");
const KEY_ID: &str = "test-key-1";
const PASSWORD: &str = "correct horse";

fn expectations() -> TokenExpectations {
    TokenExpectations::cognito("eu-west-1", "eu-west-1_pool", "client-1")
}

fn id_token(sub: &str, exp_offset: i64) -> String {
    let expected = expectations();
    let claims = json!({
        "sub": sub,
        "email": format!("{sub}@example.com"),
        "iss": expected.issuer,
        "aud": expected.audience,
        "exp": chrono::Utc::now().timestamp() + exp_offset,
    });
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KEY_ID.to_owned());
    let key = EncodingKey::from_rsa_pem(SIGNING_KEY.as_bytes()).expect("valid key");
    encode(&header, &claims, &key).expect("token encodes")
}

/// Issues signed tokens whose subject is the login username.
struct SigningProvider;

#[async_trait]
impl IdentityProvider for SigningProvider {
    async fn sign_up(&self, _request: &SignUpRequest) -> Result<(), IdentityProviderError> {
        Ok(())
    }

    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthTokens, IdentityProviderError> {
        if password != PASSWORD {
            return Err(IdentityProviderError::rejected("incorrect username or password"));
        }
        let token = id_token(username, 600);
        Ok(AuthTokens {
            access_token: format!("access-{username}"),
            id_token: token,
        })
    }
}

async fn app() -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    let store = Arc::new(MemoryPromptStore::default());
    seed_admin_prompts(store.as_ref(), &DefaultClock)
        .await
        .expect("seed prompts");
    let catalog = Arc::new(PromptCatalogService::new(
        store.clone(),
        Arc::new(DefaultClock),
    ));
    let sessions = Arc::new(SessionEngineService::new(
        store.clone(),
        catalog.clone(),
        Arc::new(DefaultClock),
    ));
    let verifier = JwtIdentityVerifier::new(
        StaticKeySetSource::from_json(JWKS).expect("fixture jwks"),
        expectations(),
        Duration::from_secs(60),
    );
    let accounts = Arc::new(AccountService::new(
        Arc::new(SigningProvider),
        Arc::new(verifier),
        store,
    ));
    let state = HttpState::new(catalog, sessions, accounts);
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();

    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(Trace)
            .service(web::scope("").wrap(session).configure(configure)),
    )
    .await
}

async fn send(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    request: test::TestRequest,
) -> (StatusCode, Value) {
    let res = test::call_service(app, request.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}

fn bearer(request: test::TestRequest, sub: &str) -> test::TestRequest {
    request.insert_header((AUTHORIZATION, format!("Bearer {}", id_token(sub, 600))))
}

#[rstest]
#[actix_web::test]
async fn prompt_session_lifecycle_with_bearer_tokens() {
    let app = app().await;

    let (status, created) = send(
        &app,
        bearer(test::TestRequest::post().uri("/prompts"), "alice")
            .set_json(json!({ "text": "Favourite breakfast?", "level": "ice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let own_id = created["prompt_id"].as_str().expect("prompt id").to_owned();

    let (status, listed) = send(
        &app,
        bearer(test::TestRequest::get().uri("/prompts?level=ICE"), "alice"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().expect("prompt list");
    assert!(listed.iter().any(|p| p["prompt_id"] == json!(own_id)));
    assert!(listed.iter().any(|p| p["owner_id"] == "ADMIN"));

    let (status, started) = send(
        &app,
        bearer(
            test::TestRequest::post().uri("/sessions/new/evening?level=ice"),
            "alice",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(started["prompt_count"], 10);

    let (status, session) = send(
        &app,
        bearer(test::TestRequest::get().uri("/sessions/evening"), "alice"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = session["prompts"].as_array().expect("entries");
    assert_eq!(entries.len(), 10);
    let first = entries[0]["prompt_id"].as_str().expect("id").to_owned();

    let (status, _) = send(
        &app,
        bearer(test::TestRequest::post().uri("/sessions/evening/respond"), "alice")
            .set_json(json!({ "prompt_id": first, "response": "pancakes" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        bearer(test::TestRequest::get().uri("/sessions/evening"), "bob"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        bearer(test::TestRequest::delete().uri("/sessions/evening"), "alice"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn login_sets_a_cookie_that_outranks_a_bearer_token() {
    let app = app().await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "carol", "password": PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie: Cookie<'static> = res
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie")
        .into_owned();
    let tokens: Value = test::read_body_json(res).await;
    assert_eq!(tokens["access_token"], "access-carol");
    assert!(tokens["id_token"].is_string());

    let (status, me) = send(
        &app,
        bearer(test::TestRequest::get().uri("/me"), "dave").cookie(cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user_id"], "carol");
    assert_eq!(me["email"], "carol@example.com");
}

#[rstest]
#[actix_web::test]
async fn wrong_password_is_unauthorised() {
    let app = app().await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "carol", "password": "nope" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn expired_bearer_token_is_rejected_with_trace_id() {
    let app = app().await;
    let request = test::TestRequest::get()
        .uri("/prompts")
        .insert_header((AUTHORIZATION, format!("Bearer {}", id_token("alice", -600))))
        .to_request();

    let res = test::call_service(&app, request).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .expect("trace id header")
        .to_str()
        .expect("ascii header")
        .to_owned();
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["traceId"], header.as_str());
}

#[rstest]
#[actix_web::test]
async fn admin_prompts_cannot_be_deleted() {
    let app = app().await;
    let (_, listed) = send(
        &app,
        bearer(test::TestRequest::get().uri("/prompts?level=deep"), "alice"),
    )
    .await;
    let admin_id = listed
        .as_array()
        .and_then(|prompts| prompts.first())
        .and_then(|prompt| prompt["prompt_id"].as_str())
        .expect("an ADMIN prompt")
        .to_owned();

    let (status, _) = send(
        &app,
        bearer(
            test::TestRequest::delete().uri(&format!("/prompts/{admin_id}")),
            "alice",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
