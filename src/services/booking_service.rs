use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

use crate::models::booking::{BookingRecord, CreateBookingRequest, STATUS_PENDING_PAYMENT};
use crate::models::draft::{BookingDraft, LocationOption};
use crate::services::pricing_service::{PriceBreakdown, PricingService};
use crate::services::wizard;

/// Why a submission was refused before anything was sent anywhere.
#[derive(Debug)]
pub struct SubmissionRejected {
    pub errors: Vec<String>,
}

/// Friendly text for upstream error codes. Unmapped codes fall back to a
/// generic message rather than leaking internals.
pub fn error_message(code: &str) -> &'static str {
    match code {
        "emailAlreadyExists" => "An account with this email already exists.",
        "invalidCredentials" => "The email or password you entered is incorrect.",
        "couponNotFound" => "That coupon code is not valid.",
        "couponInactive" => "That coupon code has expired.",
        "checkoutUnavailable" => {
            "We could not reach the payment provider. Please try again in a moment."
        }
        _ => "Something went wrong. Please try again.",
    }
}

pub struct BookingService;

impl BookingService {
    /// The wizard's final transform: re-validate the draft, enforce the lead
    /// time, then map internal names onto the booking request schema. No
    /// side effects happen before this returns Ok.
    pub fn build_request(
        draft: &BookingDraft,
        now: DateTime<Utc>,
    ) -> Result<CreateBookingRequest, SubmissionRejected> {
        let mut errors = wizard::validate_for_submission(draft);

        let scheduled_at = match wizard::combined_test_datetime(draft, now) {
            Ok(ts) => Some(ts),
            Err(message) => {
                // Only report the lead time when the schedule itself exists;
                // a missing schedule is already in the list.
                if draft.schedule.is_some() {
                    errors.push(message);
                }
                None
            }
        };

        if !errors.is_empty() {
            return Err(SubmissionRejected { errors });
        }

        // Present after validation passed
        let test_center = draft.test_center.as_ref().unwrap();
        let user_details = draft.user_details.as_ref().unwrap();

        let test_center_id = match test_center.id {
            Some(id) => id.to_string(),
            None => {
                return Err(SubmissionRejected {
                    errors: vec!["The selected test center is no longer available.".to_string()],
                })
            }
        };

        let (pickup_address, pickup_coordinates, pickup_distance_km) =
            match (&draft.location_option, &draft.pickup_info) {
                (LocationOption::Pickup, Some(info)) => (
                    Some(info.address.clone()),
                    Some(info.coordinates),
                    Some(info.distance_km),
                ),
                _ => (None, None, None),
            };

        Ok(CreateBookingRequest {
            test_type: draft.test_type.unwrap(),
            test_center_id,
            scheduled_at: scheduled_at.unwrap(),
            full_name: user_details.full_name.clone(),
            email: user_details.email.clone(),
            phone: user_details.phone.clone(),
            location_option: draft.location_option,
            pickup_address,
            pickup_coordinates,
            pickup_distance_km,
            add_on: draft.add_on,
            road_test_document_url: draft.documents.road_test.as_ref().unwrap().url.clone(),
            license_document_url: draft.documents.license.as_ref().unwrap().url.clone(),
            coupon_code: draft.coupon.as_ref().map(|c| c.code.clone()),
        })
    }

    /// Persisted form of an accepted submission, with the price snapshot
    /// taken at this moment.
    pub fn build_record(
        user_id: ObjectId,
        draft: &BookingDraft,
        request: &CreateBookingRequest,
        pricing: PriceBreakdown,
    ) -> Result<BookingRecord, SubmissionRejected> {
        let test_center_id =
            ObjectId::parse_str(&request.test_center_id).map_err(|_| SubmissionRejected {
                errors: vec!["The selected test center is no longer available.".to_string()],
            })?;

        let now = Utc::now();
        Ok(BookingRecord {
            id: None,
            user_id,
            test_center_id,
            test_type: request.test_type,
            scheduled_at: request.scheduled_at,
            full_name: request.full_name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            location_option: request.location_option,
            pickup_info: draft.pickup_info.clone(),
            add_on: request.add_on,
            free_lesson: PricingService::free_lesson_tier(draft.distance_km()),
            documents: draft.documents.clone(),
            pricing,
            coupon_code: request.coupon_code.clone(),
            status: STATUS_PENDING_PAYMENT.to_string(),
            checkout_session_id: None,
            created_at: Some(now),
            updated_at: Some(now),
        })
    }

    /// Line-item description shown on the hosted checkout page.
    pub fn checkout_description(request: &CreateBookingRequest, draft: &BookingDraft) -> String {
        let test_type = match request.test_type {
            crate::models::catalog::TestType::G2 => "G2",
            crate::models::catalog::TestType::G => "G",
        };
        match draft.test_center.as_ref() {
            Some(center) => format!("{} road test — {}", test_type, center.name),
            None => format!("{} road test", test_type),
        }
    }
}
