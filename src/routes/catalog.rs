use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{bson::doc, options::FindOptions, Client};
use std::sync::Arc;

use crate::models::catalog::{AddOnProduct, TestCenter};

#[derive(serde::Deserialize)]
pub struct CenterQueryParams {
    limit: Option<u16>,
    search: Option<String>,
}

pub async fn get_test_centers(
    data: web::Data<Arc<Client>>,
    params: web::Query<CenterQueryParams>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<TestCenter> =
        client.database("Bookings").collection("TestCenters");

    let mut options = FindOptions::default();
    if let Some(limit) = params.limit {
        options.limit = Some(limit.into());
    }
    let filter = match &params.search {
        Some(search_text) if !search_text.is_empty() => {
            doc! {
                "name": {
                    "$regex": format!("^{}", regex::escape(search_text)),
                    "$options": "i"
                }
            }
        }
        _ => doc! {},
    };
    match collection.find(filter).with_options(options).await {
        Ok(cursor) => match cursor.try_collect::<Vec<TestCenter>>().await {
            Ok(centers) => HttpResponse::Ok().json(centers),
            Err(err) => {
                log::error!("Failed to collect test centers: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect test centers.")
            }
        },
        Err(err) => {
            log::error!("Failed to find test centers: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find test centers.")
        }
    }
}

#[derive(serde::Deserialize)]
pub struct AddOnQueryParams {
    test_type: Option<String>,
}

pub async fn get_add_ons(
    data: web::Data<Arc<Client>>,
    params: web::Query<AddOnQueryParams>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<AddOnProduct> =
        client.database("Bookings").collection("AddOns");

    let mut filter = doc! { "active": { "$ne": false } };
    if let Some(test_type) = &params.test_type {
        filter.insert("test_type", test_type.to_uppercase());
    }

    match collection.find(filter).await {
        Ok(cursor) => match cursor.try_collect::<Vec<AddOnProduct>>().await {
            Ok(add_ons) => HttpResponse::Ok().json(add_ons),
            Err(err) => {
                log::error!("Failed to collect add-ons: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect add-ons.")
            }
        },
        Err(err) => {
            log::error!("Failed to find add-ons: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find add-ons.")
        }
    }
}
