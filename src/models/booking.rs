use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::catalog::{Coordinates, TestType};
use crate::models::draft::{AddOnSelection, DocumentRefs, FreeLessonTier, LocationOption, PickupInfo};
use crate::services::pricing_service::PriceBreakdown;

/// The request shape the wizard's final step produces. Field names are the
/// booking API's, not the draft's.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub test_type: TestType,
    pub test_center_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location_option: LocationOption,
    pub pickup_address: Option<String>,
    pub pickup_coordinates: Option<Coordinates>,
    pub pickup_distance_km: Option<f64>,
    pub add_on: AddOnSelection,
    pub road_test_document_url: String,
    pub license_document_url: String,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub test_center_id: ObjectId,
    pub test_type: TestType,
    pub scheduled_at: DateTime<Utc>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location_option: LocationOption,
    pub pickup_info: Option<PickupInfo>,
    pub add_on: AddOnSelection,
    pub free_lesson: FreeLessonTier,
    pub documents: DocumentRefs,
    /// Price snapshot taken at submission. The draft never stores one.
    pub pricing: PriceBreakdown,
    pub coupon_code: Option<String>,
    pub status: String,
    pub checkout_session_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub const STATUS_PENDING_PAYMENT: &str = "pending_payment";

/// What the client gets back from a successful submission. `checkout_url` is
/// always a plain string here; the internal confirmation path stands in when
/// the payment provider returns no hosted page.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingCreatedResponse {
    pub booking_id: String,
    pub checkout_url: String,
}
