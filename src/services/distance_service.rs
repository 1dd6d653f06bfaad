//! Distance and address lookups against the Google Maps APIs.
//!
//! Distance Matrix results are cached in MongoDB so repeated quotes for the
//! same pickup address do not burn API quota. Coordinates are matched with a
//! small tolerance (about 10 meters) and entries expire after 24 hours.
//!
//! Requires `GOOGLE_MAPS_API_KEY` in the environment.

use mongodb::{bson::oid::ObjectId, Client, Collection};
use serde::{Deserialize, Serialize};
use std::{env, sync::Arc, time::Duration};

use crate::models::catalog::Coordinates;

const CACHE_DURATION_SECS: i64 = 86400; // 24 hours
const COORD_TOLERANCE: f64 = 0.0001;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedDistance {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub origin_lat: f64,
    pub origin_lng: f64,
    pub destination_lat: f64,
    pub destination_lng: f64,
    pub distance_meters: u32,
    pub duration_seconds: u32,
    pub cached_at: mongodb::bson::DateTime,
    pub expires_at: mongodb::bson::DateTime,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    rows: Vec<DistanceMatrixRow>,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixRow {
    elements: Vec<DistanceMatrixElement>,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixElement {
    status: String,
    distance: Option<ValueField>,
    duration: Option<ValueField>,
}

#[derive(Debug, Deserialize)]
struct ValueField {
    value: u32,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: GeocodeLocation,
}

#[derive(Debug, Deserialize)]
struct GeocodeLocation {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistanceResult {
    pub distance_meters: u32,
    pub duration_minutes: u32,
    pub from_cache: bool,
}

impl DistanceResult {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters as f64 / 1000.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AddressHit {
    pub address: String,
    pub coordinates: Coordinates,
}

pub struct DistanceService {
    client: Arc<Client>,
    http_client: reqwest::Client,
    api_key: String,
}

impl DistanceService {
    pub fn new(client: Arc<Client>) -> Result<Self, Box<dyn std::error::Error>> {
        let api_key = env::var("GOOGLE_MAPS_API_KEY")
            .map_err(|_| "GOOGLE_MAPS_API_KEY environment variable not set")?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            http_client,
            api_key,
        })
    }

    /// Driving distance between two coordinates, cache first.
    pub async fn get_distance(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<DistanceResult, Box<dyn std::error::Error>> {
        if let Ok(Some(cached)) = self.get_cached_distance(origin, destination).await {
            log::debug!(
                "Using cached distance for ({:.4}, {:.4}) to ({:.4}, {:.4})",
                origin.lat,
                origin.lng,
                destination.lat,
                destination.lng
            );

            return Ok(DistanceResult {
                distance_meters: cached.distance_meters,
                duration_minutes: cached.duration_seconds / 60,
                from_cache: true,
            });
        }

        log::info!(
            "Fetching distance from Google Maps for ({:.4}, {:.4}) to ({:.4}, {:.4})",
            origin.lat,
            origin.lng,
            destination.lat,
            destination.lng
        );

        let result = self.fetch_from_google_maps(origin, destination).await?;

        if let Err(e) = self.cache_distance(origin, destination, &result).await {
            log::warn!("Failed to cache distance result: {}", e);
        }

        Ok(result)
    }

    /// Forward-geocode a free-text query into candidate pickup addresses.
    pub async fn search_addresses(
        &self,
        query: &str,
    ) -> Result<Vec<AddressHit>, Box<dyn std::error::Error>> {
        let url = format!(
            "https://maps.googleapis.com/maps/api/geocode/json?address={}&key={}",
            urlencode(query),
            self.api_key
        );

        let response = self.http_client.get(&url).send().await?;
        let response_text = response.text().await?;

        let geocode: GeocodeResponse = serde_json::from_str(&response_text).map_err(|e| {
            format!(
                "Failed to parse geocoding response: {}. Response: {}",
                e, response_text
            )
        })?;

        // ZERO_RESULTS is a valid empty answer, not an error
        if geocode.status != "OK" && geocode.status != "ZERO_RESULTS" {
            return Err(format!("Geocoding API error: {}", geocode.status).into());
        }

        Ok(geocode
            .results
            .into_iter()
            .map(|r| AddressHit {
                address: r.formatted_address,
                coordinates: Coordinates {
                    lat: r.geometry.location.lat,
                    lng: r.geometry.location.lng,
                },
            })
            .collect())
    }

    fn collection(&self) -> Collection<CachedDistance> {
        self.client.database("Bookings").collection("DistanceCache")
    }

    async fn get_cached_distance(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> mongodb::error::Result<Option<CachedDistance>> {
        let filter = mongodb::bson::doc! {
            "origin_lat": {
                "$gte": origin.lat - COORD_TOLERANCE,
                "$lte": origin.lat + COORD_TOLERANCE
            },
            "origin_lng": {
                "$gte": origin.lng - COORD_TOLERANCE,
                "$lte": origin.lng + COORD_TOLERANCE
            },
            "destination_lat": {
                "$gte": destination.lat - COORD_TOLERANCE,
                "$lte": destination.lat + COORD_TOLERANCE
            },
            "destination_lng": {
                "$gte": destination.lng - COORD_TOLERANCE,
                "$lte": destination.lng + COORD_TOLERANCE
            },
            "expires_at": { "$gt": mongodb::bson::DateTime::now() }
        };

        self.collection().find_one(filter).await
    }

    async fn cache_distance(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        result: &DistanceResult,
    ) -> mongodb::error::Result<()> {
        let now = mongodb::bson::DateTime::now();
        let expires_at = mongodb::bson::DateTime::from_millis(
            now.timestamp_millis() + CACHE_DURATION_SECS * 1000,
        );

        let cached_distance = CachedDistance {
            id: None,
            origin_lat: origin.lat,
            origin_lng: origin.lng,
            destination_lat: destination.lat,
            destination_lng: destination.lng,
            distance_meters: result.distance_meters,
            duration_seconds: result.duration_minutes * 60,
            cached_at: now,
            expires_at,
        };

        self.collection().insert_one(cached_distance).await?;
        Ok(())
    }

    async fn fetch_from_google_maps(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<DistanceResult, Box<dyn std::error::Error>> {
        let url = format!(
            "https://maps.googleapis.com/maps/api/distancematrix/json?origins={},{}&destinations={},{}&mode=driving&key={}",
            origin.lat, origin.lng, destination.lat, destination.lng, self.api_key
        );

        let response = self.http_client.get(&url).send().await?;
        let response_text = response.text().await?;

        let matrix: DistanceMatrixResponse = serde_json::from_str(&response_text).map_err(|e| {
            format!(
                "Failed to parse Distance Matrix response: {}. Response: {}",
                e, response_text
            )
        })?;

        if matrix.status != "OK" {
            return Err(format!("Distance Matrix API error: {}", matrix.status).into());
        }

        if matrix.rows.is_empty() || matrix.rows[0].elements.is_empty() {
            return Err("No distance data returned from Google Maps".into());
        }

        let element = &matrix.rows[0].elements[0];

        if element.status != "OK" {
            return Err(format!("Distance Matrix element error: {}", element.status).into());
        }

        let distance = element.distance.as_ref().ok_or("Distance not available")?;
        let duration = element.duration.as_ref().ok_or("Duration not available")?;

        Ok(DistanceResult {
            distance_meters: distance.value,
            duration_minutes: duration.value / 60,
            from_cache: false,
        })
    }

    /// Clean up expired cache entries
    pub async fn cleanup_expired_cache(&self) -> mongodb::error::Result<u64> {
        let filter = mongodb::bson::doc! {
            "expires_at": { "$lt": mongodb::bson::DateTime::now() }
        };

        let result = self.collection().delete_many(filter).await?;
        log::info!(
            "Cleaned up {} expired distance cache entries",
            result.deleted_count
        );

        Ok(result.deleted_count)
    }
}

fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_km_conversion() {
        let result = DistanceResult {
            distance_meters: 75_250,
            duration_minutes: 58,
            from_cache: false,
        };
        assert!((result.distance_km() - 75.25).abs() < f64::EPSILON);
    }

    #[test]
    fn urlencode_keeps_queries_readable() {
        assert_eq!(urlencode("100 Queen St W"), "100+Queen+St+W");
        assert_eq!(urlencode("King & Bay"), "King+%26+Bay");
    }
}
