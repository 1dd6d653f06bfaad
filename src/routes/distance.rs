use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::models::catalog::Coordinates;
use crate::services::distance_service::DistanceService;

#[derive(Deserialize)]
pub struct DistanceInput {
    pub origin: Coordinates,
    pub destination: Coordinates,
}

#[derive(Serialize)]
struct DistanceResponse {
    distance_km: f64,
    distance_meters: u32,
    duration_minutes: u32,
}

pub async fn calculate_distance(
    service: web::Data<DistanceService>,
    input: web::Json<DistanceInput>,
) -> impl Responder {
    let input = input.into_inner();

    match service.get_distance(input.origin, input.destination).await {
        Ok(result) => HttpResponse::Ok().json(DistanceResponse {
            distance_km: result.distance_km(),
            distance_meters: result.distance_meters,
            duration_minutes: result.duration_minutes,
        }),
        Err(err) => {
            log::error!("Distance lookup failed: {}", err);
            HttpResponse::BadGateway().body("Failed to calculate distance")
        }
    }
}

#[derive(Deserialize)]
pub struct AddressQueryParams {
    query: String,
}

pub async fn search_addresses(
    service: web::Data<DistanceService>,
    params: web::Query<AddressQueryParams>,
) -> impl Responder {
    let query = params.query.trim();
    if query.len() < 3 {
        // Too short to geocode meaningfully
        return HttpResponse::Ok().json(Vec::<serde_json::Value>::new());
    }

    match service.search_addresses(query).await {
        Ok(hits) => HttpResponse::Ok().json(hits),
        Err(err) => {
            log::error!("Address search failed: {}", err);
            HttpResponse::BadGateway().body("Failed to search addresses")
        }
    }
}
