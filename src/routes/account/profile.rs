use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use std::sync::Arc;

use crate::middleware::auth::Claims;
use crate::models::account::{ProfileUpdate, User};

pub async fn update_profile(
    data: web::Data<Arc<Client>>,
    input: web::Json<ProfileUpdate>,
    path: web::Path<(String,)>,
    claims: Claims,
) -> impl Responder {
    let user_id = path.into_inner().0;
    if user_id != claims.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Account").collection("Users");

    let input = input.into_inner();

    let mut update_doc = doc! {};
    if let Some(full_name) = input.full_name {
        update_doc.insert("full_name", full_name);
    }
    if let Some(phone) = input.phone {
        update_doc.insert("phone", phone);
    }
    if let Some(profile_image) = input.profile_image {
        update_doc.insert("profile_image", profile_image);
    }

    if update_doc.is_empty() {
        return HttpResponse::BadRequest().body("Nothing to update");
    }
    update_doc.insert("updated_at", Utc::now().to_string());

    let object_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let update = doc! { "$set": update_doc };

    match collection
        .update_one(doc! { "_id": object_id }, update)
        .await
    {
        Ok(result) => {
            if result.matched_count == 0 {
                return HttpResponse::NotFound().body("User not found");
            }
            HttpResponse::Ok().body("Profile updated")
        }
        Err(err) => {
            log::error!("Failed to update profile: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update profile")
        }
    }
}
