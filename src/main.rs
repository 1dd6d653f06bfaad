use std::{env, path::PathBuf};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use roadtest_api::db;
use roadtest_api::middleware::auth::AuthMiddleware;
use roadtest_api::routes;
use roadtest_api::services::checkout_service::CheckoutService;
use roadtest_api::services::distance_service::DistanceService;
use roadtest_api::services::draft_store::MongoDraftStore;
use roadtest_api::services::upload_service::UploadService;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[cfg(debug_assertions)]
fn setup_credentials() {
    let credentials_path = PathBuf::from("credentials/service-account.json");
    if credentials_path.exists() {
        env::set_var(
            "GOOGLE_APPLICATION_CREDENTIALS",
            credentials_path.to_str().unwrap(),
        );
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    #[cfg(debug_assertions)]
    setup_credentials();

    let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let mongo_uri = env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;

    // Everything stateful is built exactly once, before the server starts
    let draft_store = web::Data::new(MongoDraftStore::new(client.clone()));

    let distance_service = web::Data::new(
        DistanceService::new(client.clone()).expect("Failed to create distance service"),
    );

    let stripe_key = env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY must be set");
    let checkout_service = web::Data::new(
        CheckoutService::new(stripe_key).expect("Failed to create checkout service"),
    );

    let upload_service = web::Data::new(
        UploadService::new()
            .await
            .expect("Failed to create upload service"),
    );

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .route("/health", web::get().to(routes::health::health_check))
            .app_data(web::Data::new(client.clone()))
            .app_data(draft_store.clone())
            .app_data(distance_service.clone())
            .app_data(checkout_service.clone())
            .app_data(upload_service.clone())
            .service(
                web::scope("/api")
                    // Public routes
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(routes::account::auth::signup))
                            .route("/signin", web::post().to(routes::account::auth::signin))
                            .route(
                                "/forgot-password",
                                web::post().to(routes::account::auth::forgot_password),
                            )
                            .route(
                                "/reset-password",
                                web::post().to(routes::account::auth::reset_password),
                            )
                            .service(
                                web::scope("").wrap(AuthMiddleware).route(
                                    "/session",
                                    web::get().to(routes::account::auth::user_session),
                                ),
                            ),
                    )
                    .service(
                        web::scope("")
                            .route(
                                "/test-centers",
                                web::get().to(routes::catalog::get_test_centers),
                            )
                            .route("/add-ons", web::get().to(routes::catalog::get_add_ons))
                            .route(
                                "/coupons/verify",
                                web::post().to(routes::coupon::verify_coupon),
                            )
                            .route(
                                "/distance",
                                web::post().to(routes::distance::calculate_distance),
                            )
                            .route(
                                "/addresses",
                                web::get().to(routes::distance::search_addresses),
                            )
                            // Protected routes
                            .service(
                                web::scope("/bookings")
                                    .wrap(AuthMiddleware)
                                    .route("/draft", web::get().to(routes::draft::get_draft))
                                    .route("/draft", web::patch().to(routes::draft::update_draft))
                                    .route("/draft", web::delete().to(routes::draft::reset_draft))
                                    .route(
                                        "/draft/progress",
                                        web::get().to(routes::draft::draft_progress),
                                    )
                                    .route(
                                        "/draft/quote",
                                        web::get().to(routes::draft::draft_quote),
                                    )
                                    .route("", web::post().to(routes::bookings::create_booking)),
                            )
                            .service(
                                web::scope("/account/{id}")
                                    .wrap(AuthMiddleware)
                                    .route(
                                        "",
                                        web::put().to(routes::account::profile::update_profile),
                                    )
                                    .route(
                                        "/bookings",
                                        web::get().to(routes::account::bookings::get_all_bookings),
                                    )
                                    .route(
                                        "/bookings/{booking_id}",
                                        web::get()
                                            .to(routes::account::bookings::get_booking_by_id),
                                    ),
                            )
                            .service(
                                web::scope("/uploads").wrap(AuthMiddleware).route(
                                    "/{category}",
                                    web::post().to(routes::upload::upload_file),
                                ),
                            ),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
