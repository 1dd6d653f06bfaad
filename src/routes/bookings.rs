use actix_web::{web, HttpResponse, Responder};
use bson::{doc, oid::ObjectId};
use mongodb::Client;
use std::sync::Arc;

use crate::middleware::auth::Claims;
use crate::models::booking::{BookingCreatedResponse, BookingRecord};
use crate::models::catalog::TestCenter;
use crate::models::draft::SubmissionStatus;
use crate::services::booking_service::{error_message, BookingService};
use crate::services::checkout_service::CheckoutService;
use crate::services::draft_store::{DraftStore, MongoDraftStore};
use crate::services::pricing_service::PricingService;

/// Turn the current draft into a booking: validate, enforce the lead time,
/// persist, open the hosted checkout and hand the redirect URL back. The
/// draft survives any failure so the user stays where they were.
pub async fn create_booking(
    mongodb_data: web::Data<Arc<Client>>,
    store: web::Data<MongoDraftStore>,
    checkout: web::Data<CheckoutService>,
    claims: Claims,
) -> impl Responder {
    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let client = mongodb_data.into_inner();

    let draft = match store.read(user_id).await {
        Ok(draft) => draft,
        Err(err) => {
            log::error!("Failed to read draft: {}", err);
            return HttpResponse::InternalServerError().body("Failed to read booking draft");
        }
    };

    if draft.submission_status == SubmissionStatus::Submitting {
        return HttpResponse::Conflict().body("A submission is already in progress");
    }

    // 1 + 2. Re-validate and enforce the lead time. Nothing has been sent
    // anywhere if this fails.
    let request = match BookingService::build_request(&draft, chrono::Utc::now()) {
        Ok(request) => request,
        Err(rejection) => {
            let _ = store
                .set_status(
                    user_id,
                    SubmissionStatus::Error {
                        message: rejection.errors.join(" "),
                    },
                )
                .await;
            return HttpResponse::UnprocessableEntity()
                .json(serde_json::json!({ "errors": rejection.errors }));
        }
    };

    let _ = store.set_status(user_id, SubmissionStatus::Submitting).await;

    // 3. The chosen center must still exist before we take a price snapshot
    let centers: mongodb::Collection<TestCenter> =
        client.database("Bookings").collection("TestCenters");

    let center_id = ObjectId::parse_str(&request.test_center_id).unwrap();
    match centers.find_one(doc! { "_id": center_id }).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            let message = "The selected test center is no longer available.".to_string();
            let _ = store
                .set_status(user_id, SubmissionStatus::Error { message: message.clone() })
                .await;
            return HttpResponse::NotFound().body(message);
        }
        Err(err) => {
            log::error!("Failed to check test center: {:?}", err);
            let _ = store
                .set_status(
                    user_id,
                    SubmissionStatus::Error {
                        message: error_message("unknown").to_string(),
                    },
                )
                .await;
            return HttpResponse::InternalServerError().body("Failed to verify test center");
        }
    }

    // 4. Persist the booking with its price snapshot
    let pricing = PricingService::breakdown(&draft);
    let record = match BookingService::build_record(user_id, &draft, &request, pricing) {
        Ok(record) => record,
        Err(rejection) => {
            let _ = store
                .set_status(
                    user_id,
                    SubmissionStatus::Error {
                        message: rejection.errors.join(" "),
                    },
                )
                .await;
            return HttpResponse::UnprocessableEntity()
                .json(serde_json::json!({ "errors": rejection.errors }));
        }
    };

    let collection: mongodb::Collection<BookingRecord> =
        client.database("Bookings").collection("Bookings");

    let insert_result = match collection.insert_one(&record).await {
        Ok(result) => result,
        Err(err) => {
            log::error!("Error creating booking: {:?}", err);
            let _ = store
                .set_status(
                    user_id,
                    SubmissionStatus::Error {
                        message: error_message("unknown").to_string(),
                    },
                )
                .await;
            return HttpResponse::InternalServerError().body("Failed to create booking");
        }
    };

    let booking_id = insert_result
        .inserted_id
        .as_object_id()
        .map(|id| id.to_string())
        .unwrap_or_default();

    // 5. Open the hosted checkout
    let description = BookingService::checkout_description(&request, &draft);
    match checkout
        .create_session(&booking_id, &description, record.pricing.total, &request.email)
        .await
    {
        Ok(session) => {
            let update = doc! {
                "$set": {
                    "checkout_session_id": &session.session_id,
                    "updated_at": bson::DateTime::now(),
                }
            };
            if let Err(err) = collection
                .update_one(doc! { "_id": insert_result.inserted_id }, update)
                .await
            {
                log::warn!("Booking created but session id not recorded: {:?}", err);
            }

            // The wizard is done with this draft
            if let Err(err) = store.reset(user_id).await {
                log::warn!("Failed to reset draft after submission: {}", err);
            }

            // Fall back to our own confirmation page when the provider
            // returns no hosted page
            let checkout_url = session
                .url
                .unwrap_or_else(|| format!("/bookings/{}/confirmation", booking_id));

            HttpResponse::Ok().json(BookingCreatedResponse {
                booking_id,
                checkout_url,
            })
        }
        Err(err) => {
            log::error!("Error opening checkout session: {}", err);

            let update = doc! {
                "$set": {
                    "status": "payment_failed",
                    "updated_at": bson::DateTime::now(),
                }
            };
            let _ = collection
                .update_one(doc! { "_id": insert_result.inserted_id }, update)
                .await;

            let message = error_message("checkoutUnavailable").to_string();
            let _ = store
                .set_status(user_id, SubmissionStatus::Error { message: message.clone() })
                .await;

            HttpResponse::BadGateway().body(message)
        }
    }
}
