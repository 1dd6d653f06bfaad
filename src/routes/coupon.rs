use actix_web::{web, HttpResponse, Responder};
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::models::coupon::{Coupon, CouponVerifyInput, CouponVerifyResponse};

/// Verify a coupon code. The response always has the one canonical shape,
/// valid or not — clients never have to guess.
pub async fn verify_coupon(
    data: web::Data<Arc<Client>>,
    input: web::Json<CouponVerifyInput>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Coupon> =
        client.database("Bookings").collection("Coupons");

    let code = input.into_inner().code.trim().to_uppercase();
    if code.is_empty() {
        return HttpResponse::BadRequest().body("Coupon code must not be empty");
    }

    let filter = doc! { "code": &code };
    match collection.find_one(filter).await {
        Ok(Some(coupon)) if coupon.active => HttpResponse::Ok().json(CouponVerifyResponse {
            valid: true,
            code: coupon.code,
            discount_cents: coupon.discount_cents,
        }),
        Ok(_) => HttpResponse::Ok().json(CouponVerifyResponse {
            valid: false,
            code,
            discount_cents: 0,
        }),
        Err(err) => {
            log::error!("Failed to look up coupon: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to verify coupon")
        }
    }
}
