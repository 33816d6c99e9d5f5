//! Tests for hotspot HTTP handlers.

use super::*;
use crate::inbound::http::auth;
use crate::inbound::http::test_utils::{TEST_ADMIN, log_in, test_session_middleware, test_state};
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
                .service(list)
                .service(trending)
                .service(get)
                .service(create)
                .service(update)
                .service(delete)
                .service(save)
                .service(unsave)
                .service(list_saved),
        )
}

fn hotspot_payload(name: &str) -> Value {
    json!({
        "name": name,
        "category": "cafe",
        "address": "Ambadi Road, Vasai West",
        "latitude": 19.3919,
        "longitude": 72.8397,
        "description": "Quiet corner cafe",
        "imageUrl": null,
    })
}

async fn create_hotspot(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &actix_web::cookie::Cookie<'static>,
    name: &str,
) -> Value {
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/hotspots")
            .cookie(cookie.clone())
            .set_json(hotspot_payload(name))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    actix_test::read_body_json(response).await
}

#[actix_web::test]
async fn admin_creates_and_everyone_lists() {
    let app = actix_test::init_service(test_app()).await;
    let (_, admin) = log_in(&app, TEST_ADMIN).await;
    let created = create_hotspot(&app, &admin, "Bandstand Cafe").await;
    assert_eq!(created["category"], "cafe");

    let (_, visitor) = log_in(&app, "ada").await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/hotspots")
            .cookie(visitor)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    let items = body.as_array().expect("array body");
    assert_eq!(items.len(), 1);
    let item = items.first().expect("one entry");
    assert_eq!(item["hotspot"]["name"], "Bandstand Cafe");
    assert_eq!(item["activeVisitors"], 0);
}

#[actix_web::test]
async fn create_requires_the_admin_flag() {
    let app = actix_test::init_service(test_app()).await;
    let (_, cookie) = log_in(&app, "mallory").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/hotspots")
            .cookie(cookie)
            .set_json(hotspot_payload("Sneaky Spot"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn listing_requires_a_session() {
    let app = actix_test::init_service(test_app()).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/hotspots")
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn out_of_range_coordinates_are_rejected() {
    let app = actix_test::init_service(test_app()).await;
    let (_, admin) = log_in(&app, TEST_ADMIN).await;

    let mut payload = hotspot_payload("Nowhere");
    payload["latitude"] = json!(91.0);
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/hotspots")
            .cookie(admin)
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "latitude");
}

#[actix_web::test]
async fn detail_reports_saved_state() {
    let app = actix_test::init_service(test_app()).await;
    let (_, admin) = log_in(&app, TEST_ADMIN).await;
    let created = create_hotspot(&app, &admin, "Suruchi Beach").await;
    let id = created["id"].as_str().expect("hotspot id");

    let (_, user) = log_in(&app, "ada").await;
    let save_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/hotspots/{id}/saved"))
            .cookie(user.clone())
            .to_request(),
    )
    .await;
    assert_eq!(save_res.status(), StatusCode::NO_CONTENT);

    let detail_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/hotspots/{id}"))
            .cookie(user.clone())
            .to_request(),
    )
    .await;
    assert_eq!(detail_res.status(), StatusCode::OK);
    let detail: Value = actix_test::read_body_json(detail_res).await;
    assert_eq!(detail["isSaved"], true);
    assert_eq!(detail["rating"]["count"], 0);
    assert!(detail.get("ownRating").is_none());

    let saved_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/saved-hotspots")
            .cookie(user.clone())
            .to_request(),
    )
    .await;
    let saved: Value = actix_test::read_body_json(saved_res).await;
    assert_eq!(saved.as_array().map(Vec::len), Some(1));

    let unsave_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/hotspots/{id}/saved"))
            .cookie(user.clone())
            .to_request(),
    )
    .await;
    assert_eq!(unsave_res.status(), StatusCode::NO_CONTENT);

    let detail_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/hotspots/{id}"))
            .cookie(user)
            .to_request(),
    )
    .await;
    let detail: Value = actix_test::read_body_json(detail_res).await;
    assert_eq!(detail["isSaved"], false);
}

#[actix_web::test]
async fn unknown_hotspot_detail_is_not_found() {
    let app = actix_test::init_service(test_app()).await;
    let (_, cookie) = log_in(&app, "ada").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/hotspots/{}", uuid::Uuid::new_v4()))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn update_replaces_editable_fields() {
    let app = actix_test::init_service(test_app()).await;
    let (_, admin) = log_in(&app, TEST_ADMIN).await;
    let created = create_hotspot(&app, &admin, "Old Name").await;
    let id = created["id"].as_str().expect("hotspot id");

    let mut payload = hotspot_payload("New Name");
    payload["category"] = json!("food");
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/hotspots/{id}"))
            .cookie(admin)
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["name"], "New Name");
    assert_eq!(body["category"], "food");
}

#[actix_web::test]
async fn delete_removes_the_hotspot() {
    let app = actix_test::init_service(test_app()).await;
    let (_, admin) = log_in(&app, TEST_ADMIN).await;
    let created = create_hotspot(&app, &admin, "Short Lived").await;
    let id = created["id"].as_str().expect("hotspot id");

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/hotspots/{id}"))
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/hotspots/{id}"))
            .cookie(admin)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn trending_starts_empty() {
    let app = actix_test::init_service(test_app()).await;
    let (_, cookie) = log_in(&app, "ada").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/hotspots/trending")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}
