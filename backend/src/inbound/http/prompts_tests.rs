//! Tests for prompt catalog HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::test_utils::{seeded_memory_state, test_session_middleware};

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(random_prompt)
        .service(list_prompts)
        .service(create_prompt)
        .service(delete_prompt)
}

fn bearer(user: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {user}"))
}

async fn call(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    request: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let res = actix_test::call_service(app, request.to_request()).await;
    let status = res.status();
    let body = actix_test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}

async fn create_as(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    user: &str,
    text: &str,
    level: &str,
) -> String {
    let (status, body) = call(
        app,
        actix_test::TestRequest::post()
            .uri("/prompts")
            .insert_header(bearer(user))
            .set_json(json!({ "text": text, "level": level })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["prompt_id"]
        .as_str()
        .expect("prompt_id in body")
        .to_owned()
}

fn texts(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("array body")
        .iter()
        .filter_map(|prompt| prompt["text"].as_str().map(str::to_owned))
        .collect()
}

#[rstest]
#[actix_web::test]
async fn created_prompt_is_visible_only_to_owner() {
    let (state, _) = seeded_memory_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    create_as(&app, "user-a", "T1", "ice").await;

    let (status, body_a) = call(
        &app,
        actix_test::TestRequest::get()
            .uri("/prompts?level=ice")
            .insert_header(bearer("user-a")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(texts(&body_a).contains(&"T1".to_owned()));

    let (_, body_b) = call(
        &app,
        actix_test::TestRequest::get()
            .uri("/prompts?level=ice")
            .insert_header(bearer("user-b")),
    )
    .await;
    assert!(!texts(&body_b).contains(&"T1".to_owned()));
    assert!(!texts(&body_b).is_empty(), "admin prompts stay visible");
}

#[rstest]
#[actix_web::test]
async fn listing_uses_snake_case_fields_and_level_filter() {
    let (state, _) = seeded_memory_state().await;
    let app = actix_test::init_service(test_app(state)).await;

    let (status, body) = call(
        &app,
        actix_test::TestRequest::get()
            .uri("/prompts?level=DEEP")
            .insert_header(bearer("user-a")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let prompts = body.as_array().expect("array");
    assert!(!prompts.is_empty());
    for prompt in prompts {
        assert_eq!(prompt["level"], "deep");
        assert_eq!(prompt["owner_id"], "ADMIN");
        assert!(prompt["prompt_id"].is_string());
        assert!(prompt["created_at"].is_string());
    }
}

#[rstest]
#[case::missing_text(json!({ "level": "ice" }), "text")]
#[case::blank_text(json!({ "text": "  ", "level": "ice" }), "text")]
#[case::missing_level(json!({ "text": "T1" }), "level")]
#[actix_web::test]
async fn create_requires_text_and_level(#[case] payload: Value, #[case] field: &str) {
    let (state, store) = seeded_memory_state().await;
    let before = store.prompt_count();
    let app = actix_test::init_service(test_app(state)).await;

    let (status, body) = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/prompts")
            .insert_header(bearer("user-a"))
            .set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
    assert_eq!(store.prompt_count(), before);
}

#[rstest]
#[case::absent("/prompts/random", StatusCode::BAD_REQUEST)]
#[case::empty("/prompts/random?level=", StatusCode::BAD_REQUEST)]
#[case::unknown("/prompts/random?level=unheard-of", StatusCode::NOT_FOUND)]
#[case::case_insensitive("/prompts/random?level=ICE", StatusCode::OK)]
#[actix_web::test]
async fn random_prompt_status(#[case] uri: &str, #[case] expected: StatusCode) {
    let (state, _) = seeded_memory_state().await;
    let app = actix_test::init_service(test_app(state)).await;

    let (status, body) = call(
        &app,
        actix_test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer("user-a")),
    )
    .await;

    assert_eq!(status, expected);
    if expected == StatusCode::OK {
        assert_eq!(body["level"], "ice");
    }
}

#[rstest]
#[actix_web::test]
async fn delete_checks_existence_before_ownership() {
    let (state, _) = seeded_memory_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    let prompt_id = create_as(&app, "user-a", "T1", "ice").await;

    let (missing, _) = call(
        &app,
        actix_test::TestRequest::delete()
            .uri("/prompts/00000000-0000-0000-0000-000000000000")
            .insert_header(bearer("user-b")),
    )
    .await;
    assert_eq!(missing, StatusCode::NOT_FOUND);

    let (malformed, _) = call(
        &app,
        actix_test::TestRequest::delete()
            .uri("/prompts/not-a-uuid")
            .insert_header(bearer("user-b")),
    )
    .await;
    assert_eq!(malformed, StatusCode::NOT_FOUND);

    let (foreign, body) = call(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/prompts/{prompt_id}"))
            .insert_header(bearer("user-b")),
    )
    .await;
    assert_eq!(foreign, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (owned, body) = call(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/prompts/{prompt_id}"))
            .insert_header(bearer("user-a")),
    )
    .await;
    assert_eq!(owned, StatusCode::OK);
    assert!(body["message"].as_str().is_some_and(|m| m.contains(&prompt_id)));

    let (again, _) = call(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/prompts/{prompt_id}"))
            .insert_header(bearer("user-a")),
    )
    .await;
    assert_eq!(again, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn admin_prompts_cannot_be_deleted() {
    let (state, _) = seeded_memory_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    let (_, body) = call(
        &app,
        actix_test::TestRequest::get()
            .uri("/prompts?level=ice")
            .insert_header(bearer("user-a")),
    )
    .await;
    let admin_id = body[0]["prompt_id"].as_str().expect("admin prompt id");

    let (status, _) = call(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/prompts/{admin_id}"))
            .insert_header(bearer("user-a")),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn anonymous_callers_are_unauthorised() {
    let (state, _) = seeded_memory_state().await;
    let app = actix_test::init_service(test_app(state)).await;

    let (status, body) = call(&app, actix_test::TestRequest::get().uri("/prompts")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}
