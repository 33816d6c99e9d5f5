//! Tests for profile HTTP handlers.

use super::*;
use crate::inbound::http::auth;
use crate::inbound::http::test_utils::{log_in, test_session_middleware, test_state};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};

fn test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(test_state())
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(auth::login)
                .service(get)
                .service(get_user)
                .service(update),
        )
}

#[actix_web::test]
async fn update_is_reflected_in_the_profile() {
    let app = actix_test::init_service(test_app()).await;
    let (_, cookie) = log_in(&app, "ada").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/profile")
            .cookie(cookie.clone())
            .set_json(json!({ "bio": "Chai enthusiast", "city": "Vasai" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let profile_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/profile")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(profile_res.status(), StatusCode::OK);
    let profile: Value = actix_test::read_body_json(profile_res).await;
    assert_eq!(profile["username"], "ada");
    assert_eq!(profile["bio"], "Chai enthusiast");
    assert_eq!(profile["city"], "Vasai");
}

#[actix_web::test]
async fn taken_usernames_are_rejected() {
    let app = actix_test::init_service(test_app()).await;
    let (_, _) = log_in(&app, "ada").await;
    let (_, brian) = log_in(&app, "brian").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/profile")
            .cookie(brian)
            .set_json(json!({ "username": "ada" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn other_profiles_are_readable_by_id() {
    let app = actix_test::init_service(test_app()).await;
    let (ada_id, _) = log_in(&app, "ada").await;
    let (_, brian) = log_in(&app, "brian").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/users/{ada_id}/profile"))
            .cookie(brian.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile: Value = actix_test::read_body_json(response).await;
    assert_eq!(profile["username"], "ada");

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}/profile", uuid::Uuid::new_v4()))
            .cookie(brian)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn plain_http_avatar_urls_are_dropped() {
    let app = actix_test::init_service(test_app()).await;
    let (_, cookie) = log_in(&app, "ada").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/profile")
            .cookie(cookie)
            .set_json(json!({ "avatarUrl": "http://example.com/a.png" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile: Value = actix_test::read_body_json(response).await;
    assert!(profile["avatarUrl"].is_null());
}

#[actix_web::test]
async fn usernames_that_sanitise_away_are_rejected() {
    let app = actix_test::init_service(test_app()).await;
    let (_, cookie) = log_in(&app, "ada").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/profile")
            .cookie(cookie)
            .set_json(json!({ "username": "!!!" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "username");
}
