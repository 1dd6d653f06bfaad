use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::middleware::auth::Claims;
use crate::models::draft::DraftUpdate;
use crate::services::draft_store::{DraftStore, MongoDraftStore};
use crate::services::pricing_service::PricingService;
use crate::services::wizard;

fn claims_user_id(claims: &Claims) -> Result<ObjectId, HttpResponse> {
    ObjectId::parse_str(&claims.user_id)
        .map_err(|_| HttpResponse::BadRequest().body("Invalid user ID"))
}

pub async fn get_draft(store: web::Data<MongoDraftStore>, claims: Claims) -> impl Responder {
    let user_id = match claims_user_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match store.read(user_id).await {
        Ok(draft) => HttpResponse::Ok().json(draft),
        Err(err) => {
            log::error!("Failed to read draft: {}", err);
            HttpResponse::InternalServerError().body("Failed to read booking draft")
        }
    }
}

pub async fn update_draft(
    store: web::Data<MongoDraftStore>,
    input: web::Json<DraftUpdate>,
    claims: Claims,
) -> impl Responder {
    let user_id = match claims_user_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match store.update(user_id, input.into_inner()).await {
        Ok(draft) => HttpResponse::Ok().json(draft),
        Err(err) => {
            log::error!("Failed to update draft: {}", err);
            HttpResponse::InternalServerError().body("Failed to update booking draft")
        }
    }
}

pub async fn reset_draft(store: web::Data<MongoDraftStore>, claims: Claims) -> impl Responder {
    let user_id = match claims_user_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match store.reset(user_id).await {
        Ok(()) => HttpResponse::Ok().body("Draft reset"),
        Err(err) => {
            log::error!("Failed to reset draft: {}", err);
            HttpResponse::InternalServerError().body("Failed to reset booking draft")
        }
    }
}

/// Where the user belongs in the wizard. Clients landing on a later step
/// redirect to the returned path when it is earlier than where they are.
pub async fn draft_progress(store: web::Data<MongoDraftStore>, claims: Claims) -> impl Responder {
    let user_id = match claims_user_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match store.read(user_id).await {
        Ok(draft) => {
            let step = wizard::current_step(&draft);
            HttpResponse::Ok().json(json!({
                "step": step.number(),
                "path": step.path(),
                "submission_status": draft.submission_status,
            }))
        }
        Err(err) => {
            log::error!("Failed to read draft: {}", err);
            HttpResponse::InternalServerError().body("Failed to read booking draft")
        }
    }
}

/// Price the draft as it stands. Derived on demand, never stored.
pub async fn draft_quote(store: web::Data<MongoDraftStore>, claims: Claims) -> impl Responder {
    let user_id = match claims_user_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match store.read(user_id).await {
        Ok(draft) => HttpResponse::Ok().json(PricingService::breakdown(&draft)),
        Err(err) => {
            log::error!("Failed to read draft: {}", err);
            HttpResponse::InternalServerError().body("Failed to read booking draft")
        }
    }
}
