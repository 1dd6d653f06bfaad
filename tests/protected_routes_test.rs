mod common;

use actix_web::{http::header, test};
use serde_json::json;
use serial_test::serial;

use common::{get_test_user_id, TestApp};

#[actix_rt::test]
#[serial]
async fn test_draft_requires_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    for method in ["get", "patch", "delete"] {
        let req = match method {
            "get" => test::TestRequest::get(),
            "patch" => test::TestRequest::patch(),
            _ => test::TestRequest::delete(),
        }
        .uri("/api/bookings/draft")
        .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "{} /api/bookings/draft", method);
    }
}

#[actix_rt::test]
#[serial]
async fn test_draft_progress_requires_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/bookings/draft/progress")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_draft_quote_requires_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/bookings/draft/quote")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_create_booking_requires_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post().uri("/api/bookings").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_create_booking_rejects_invalid_token() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .insert_header((header::AUTHORIZATION, "Bearer not_a_real_token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}

#[actix_rt::test]
#[serial]
async fn test_session_requires_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/auth/session").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_account_bookings_require_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let user_id = get_test_user_id();

    let req = test::TestRequest::get()
        .uri(&format!("/api/account/{}/bookings", user_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri(&format!("/api/account/{}/bookings/abc123", user_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_profile_update_requires_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/account/{}", get_test_user_id()))
        .set_json(&json!({ "full_name": "New Name" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_uploads_require_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    for category in ["documents", "profile"] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/uploads/{}", category))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "POST /api/uploads/{}", category);
    }
}

#[actix_rt::test]
#[serial]
async fn test_booking_routes_with_wrong_methods() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    // PUT is not part of the draft contract
    let req = test::TestRequest::put()
        .uri("/api/bookings/draft")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 405);

    // GET on the submission endpoint
    let req = test::TestRequest::get().uri("/api/bookings").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 405);
}
