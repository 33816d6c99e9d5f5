//! Tests for friend HTTP handlers.

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
                .service(send)
                .service(accept)
                .service(reject)
                .service(cancel)
                .service(list)
                .service(remove)
                .service(status),
        )
}

async fn send_request(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &actix_web::cookie::Cookie<'static>,
    receiver: uuid::Uuid,
) -> Value {
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/friend-requests")
            .cookie(cookie.clone())
            .set_json(json!({ "userId": receiver }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    actix_test::read_body_json(response).await
}

async fn status_of(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &actix_web::cookie::Cookie<'static>,
    other: uuid::Uuid,
) -> String {
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/users/{other}/friend-status"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    body["status"].as_str().expect("status").to_owned()
}

#[actix_web::test]
async fn request_accept_makes_both_sides_friends() {
    let app = actix_test::init_service(test_app()).await;
    let (ada_id, ada) = log_in(&app, "ada").await;
    let (brian_id, brian) = log_in(&app, "brian").await;

    assert_eq!(status_of(&app, &ada, brian_id).await, "none");
    let request = send_request(&app, &ada, brian_id).await;
    assert_eq!(status_of(&app, &ada, brian_id).await, "sent");
    assert_eq!(status_of(&app, &brian, ada_id).await, "received");

    let request_id = request["id"].as_str().expect("request id");
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/friend-requests/{request_id}/accept"))
            .cookie(brian.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(status_of(&app, &ada, brian_id).await, "friends");

    let list_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/friends")
            .cookie(ada.clone())
            .to_request(),
    )
    .await;
    let friends: Value = actix_test::read_body_json(list_res).await;
    let entries = friends.as_array().expect("friend list");
    assert_eq!(entries.len(), 1);
    let entry = entries.first().expect("one friend");
    assert_eq!(entry["friendId"], brian_id.to_string());
    assert_eq!(entry["username"], "brian");

    // A second request in either direction is rejected.
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/friend-requests")
            .cookie(brian)
            .set_json(json!({ "userId": ada_id }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn only_the_receiver_can_accept() {
    let app = actix_test::init_service(test_app()).await;
    let (_, ada) = log_in(&app, "ada").await;
    let (brian_id, _) = log_in(&app, "brian").await;

    let request = send_request(&app, &ada, brian_id).await;
    let request_id = request["id"].as_str().expect("request id");

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/friend-requests/{request_id}/accept"))
            .cookie(ada)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn rejected_requests_can_be_reopened() {
    let app = actix_test::init_service(test_app()).await;
    let (ada_id, ada) = log_in(&app, "ada").await;
    let (brian_id, brian) = log_in(&app, "brian").await;

    let request = send_request(&app, &ada, brian_id).await;
    let request_id = request["id"].as_str().expect("request id");
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/friend-requests/{request_id}/reject"))
            .cookie(brian.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(status_of(&app, &ada, brian_id).await, "none");

    // Either side can open contact again after a rejection.
    send_request(&app, &brian, ada_id).await;
    assert_eq!(status_of(&app, &brian, ada_id).await, "sent");
}

#[actix_web::test]
async fn sender_can_cancel_a_pending_request() {
    let app = actix_test::init_service(test_app()).await;
    let (_, ada) = log_in(&app, "ada").await;
    let (brian_id, _) = log_in(&app, "brian").await;

    let request = send_request(&app, &ada, brian_id).await;
    let request_id = request["id"].as_str().expect("request id");

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/friend-requests/{request_id}"))
            .cookie(ada.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(status_of(&app, &ada, brian_id).await, "none");
}

#[actix_web::test]
async fn self_requests_and_unknown_users_are_rejected() {
    let app = actix_test::init_service(test_app()).await;
    let (ada_id, ada) = log_in(&app, "ada").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/friend-requests")
            .cookie(ada.clone())
            .set_json(json!({ "userId": ada_id }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/friend-requests")
            .cookie(ada)
            .set_json(json!({ "userId": uuid::Uuid::new_v4() }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn removing_a_friendship_resets_the_relationship() {
    let app = actix_test::init_service(test_app()).await;
    let (_, ada) = log_in(&app, "ada").await;
    let (brian_id, brian) = log_in(&app, "brian").await;

    let request = send_request(&app, &ada, brian_id).await;
    let request_id = request["id"].as_str().expect("request id");
    actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/friend-requests/{request_id}/accept"))
            .cookie(brian)
            .to_request(),
    )
    .await;

    let list_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/friends")
            .cookie(ada.clone())
            .to_request(),
    )
    .await;
    let friends: Value = actix_test::read_body_json(list_res).await;
    let friendship_id = friends
        .as_array()
        .and_then(|entries| entries.first())
        .map(|entry| entry["friendshipId"].as_str().expect("friendship id"))
        .expect("one friendship")
        .to_owned();

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/friendships/{friendship_id}"))
            .cookie(ada.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(status_of(&app, &ada, brian_id).await, "none");

    // The pair can become friends again from scratch.
    send_request(&app, &ada, brian_id).await;
}
