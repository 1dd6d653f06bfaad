use actix_web::{web, HttpResponse, Responder};
use bson::{doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::Client;
use std::sync::Arc;

use crate::middleware::auth::Claims;
use crate::models::booking::BookingRecord;

pub async fn get_all_bookings(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    claims: Claims,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<BookingRecord> =
        client.database("Bookings").collection("Bookings");

    if path.into_inner().0 != claims.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let filter = doc! { "user_id": user_id };

    match collection.find(filter).await {
        Ok(cursor) => match cursor.try_collect::<Vec<BookingRecord>>().await {
            Ok(bookings) => HttpResponse::Ok().json(bookings),
            Err(err) => {
                log::error!("Error retrieving bookings: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve bookings")
            }
        },
        Err(err) => {
            log::error!("Error fetching bookings: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch bookings")
        }
    }
}

pub async fn get_booking_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String, String)>,
    claims: Claims,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<BookingRecord> =
        client.database("Bookings").collection("Bookings");

    let (user_id, booking_id) = path.into_inner();
    if user_id != claims.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let booking_object_id = match ObjectId::parse_str(&booking_id) {
        Ok(id) => id,
        Err(e) => {
            log::debug!("Invalid booking ID format: {:?}", e);
            return HttpResponse::BadRequest().body("Invalid booking ID format");
        }
    };

    let user_object_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let filter = doc! {
        "_id": booking_object_id,
        "user_id": user_object_id,
    };

    match collection.find_one(filter).await {
        Ok(Some(booking)) => HttpResponse::Ok().json(booking),
        Ok(None) => HttpResponse::NotFound().body("Booking not found"),
        Err(e) => {
            log::error!("Error fetching booking: {:?}", e);
            HttpResponse::InternalServerError().body("Failed to fetch booking")
        }
    }
}
