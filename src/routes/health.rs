use actix_web::{web, HttpResponse, Responder};
use mongodb::{bson::doc, Client};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(client: web::Data<Arc<Client>>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let mongo_status = match client
        .database("Bookings")
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => ServiceStatus {
            status: "ok".to_string(),
            details: None,
        },
        Err(e) => ServiceStatus {
            status: "error".to_string(),
            details: Some(e.to_string()),
        },
    };
    health
        .services
        .insert("mongodb".to_string(), mongo_status);

    // Config-presence checks only; no live calls on the health path
    for (name, var) in [
        ("stripe", "STRIPE_SECRET_KEY"),
        ("google_maps", "GOOGLE_MAPS_API_KEY"),
        ("storage", "DOCUMENT_BUCKET"),
    ] {
        let status = if env::var(var).is_ok() {
            ServiceStatus {
                status: "ok".to_string(),
                details: None,
            }
        } else {
            ServiceStatus {
                status: "unconfigured".to_string(),
                details: Some(format!("{} not set", var)),
            }
        };
        health.services.insert(name.to_string(), status);
    }

    if health.services.values().any(|s| s.status == "error") {
        health.status = "degraded".to_string();
        return HttpResponse::ServiceUnavailable().json(health);
    }

    HttpResponse::Ok().json(health)
}
