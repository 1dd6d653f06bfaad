use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Coupon {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub code: String,
    /// Flat discount in cents.
    pub discount_cents: i64,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CouponVerifyInput {
    pub code: String,
}

/// The one and only shape the verify endpoint responds with. Anything else
/// coming off the wire is a contract violation, not something to guess at.
#[derive(Debug, Serialize, Deserialize)]
pub struct CouponVerifyResponse {
    pub valid: bool,
    pub code: String,
    pub discount_cents: i64,
}
