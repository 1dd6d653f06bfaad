use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, Responder};
use std::sync::Arc;

use roadtest_api::db::mongo::create_mongo_client;

pub struct TestApp {
    pub client: Arc<mongodb::Client>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mongo_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = create_mongo_client(&mongo_uri).await;

        Self { client }
    }

    /// Mirror of the production route tree with mock handlers, so route
    /// shape, auth gating and method handling can be asserted without
    /// Mongo, Stripe or Google credentials.
    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.client.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .route("/", web::get().to(|| async { "Road Test API is running" }))
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(signup))
                            .route("/signin", web::post().to(signin))
                            .route("/forgot-password", web::post().to(forgot_password))
                            .route("/reset-password", web::post().to(reset_password))
                            .route("/session", web::get().to(unauthorized_handler)),
                    )
                    .service(
                        web::scope("")
                            .route("/test-centers", web::get().to(get_test_centers))
                            .route("/add-ons", web::get().to(get_add_ons))
                            .route("/coupons/verify", web::post().to(verify_coupon))
                            .route("/distance", web::post().to(calculate_distance))
                            .route("/addresses", web::get().to(search_addresses))
                            .service(
                                web::scope("/bookings")
                                    .route("/draft", web::get().to(unauthorized_handler))
                                    .route("/draft", web::patch().to(unauthorized_handler))
                                    .route("/draft", web::delete().to(unauthorized_handler))
                                    .route("/draft/progress", web::get().to(unauthorized_handler))
                                    .route("/draft/quote", web::get().to(unauthorized_handler))
                                    .route("", web::post().to(unauthorized_handler)),
                            )
                            .service(
                                web::scope("/account/{id}")
                                    .route("", web::put().to(unauthorized_handler))
                                    .route("/bookings", web::get().to(unauthorized_handler))
                                    .route(
                                        "/bookings/{booking_id}",
                                        web::get().to(unauthorized_handler),
                                    ),
                            )
                            .service(
                                web::scope("/uploads")
                                    .route("/{category}", web::post().to(unauthorized_handler)),
                            ),
                    ),
            )
    }
}

// Mock handler functions for testing
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

async fn get_test_centers() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!([]))
}

async fn get_add_ons() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!([]))
}

async fn verify_coupon(input: web::Json<serde_json::Value>) -> impl Responder {
    let code = input
        .get("code")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .trim()
        .to_uppercase();
    if code.is_empty() {
        return HttpResponse::BadRequest().body("Coupon code must not be empty");
    }
    HttpResponse::Ok().json(serde_json::json!({
        "valid": false,
        "code": code,
        "discount_cents": 0
    }))
}

async fn calculate_distance() -> impl Responder {
    HttpResponse::BadGateway().body("Failed to calculate distance")
}

async fn search_addresses() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!([]))
}

async fn signup() -> impl Responder {
    HttpResponse::BadRequest().json(serde_json::json!({"error": "Invalid input"}))
}

async fn signin() -> impl Responder {
    HttpResponse::Unauthorized().json(serde_json::json!({"error": "Invalid credentials"}))
}

async fn forgot_password() -> impl Responder {
    HttpResponse::Ok().body("If that account exists, a reset email is on its way")
}

async fn reset_password() -> impl Responder {
    HttpResponse::BadRequest().body("Reset token is invalid or expired")
}

async fn unauthorized_handler() -> impl Responder {
    HttpResponse::Unauthorized().json(serde_json::json!({"error": "Unauthorized"}))
}

#[allow(dead_code)]
pub fn get_test_user_id() -> String {
    "test_user_123".to_string()
}

#[allow(dead_code)]
pub fn get_test_email() -> String {
    "test@example.com".to_string()
}
