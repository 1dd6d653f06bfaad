use actix_web::{web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::error::WriteError;
use mongodb::Client;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::middleware::auth::Claims;
use crate::models::account::{ForgotPasswordInput, ResetPasswordInput, User, UserSession};

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    auth_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninInput {
    pub email: String,
    pub password: String,
}

pub async fn signup(data: web::Data<Arc<Client>>, input: web::Json<SignupInput>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Account").collection("Users");

    let input = input.into_inner();
    if !is_valid_email(&input.email) {
        return HttpResponse::BadRequest().body("Invalid email address");
    }
    if input.password.len() < 8 {
        return HttpResponse::BadRequest().body("Password must be at least 8 characters");
    }

    let curr_time = Utc::now();
    let hashed = match bcrypt::hash(&input.password, bcrypt::DEFAULT_COST) {
        Ok(hashed) => hashed,
        Err(err) => {
            log::error!("Failed to hash password: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to create user");
        }
    };

    let user = User {
        id: None,
        email: input.email.to_lowercase(),
        password: hashed,
        full_name: input.full_name,
        phone: input.phone,
        profile_image: None,
        last_signin: None,
        failed_signins: None,
        reset_token: None,
        reset_token_expires: None,
        created_at: Some(curr_time),
        updated_at: Some(curr_time),
    };

    match collection.insert_one(&user).await {
        Ok(result) => {
            match generate_token(&user.email, result.inserted_id.as_object_id().unwrap()) {
                Ok(token) => HttpResponse::Ok().json(TokenResponse { auth_token: token }),
                Err(_) => HttpResponse::InternalServerError().body("Token generation failed"),
            }
        }
        Err(err) => match *err.kind {
            mongodb::error::ErrorKind::Write(error_info) => match error_info {
                mongodb::error::WriteFailure::WriteError(WriteError { code, .. }) => {
                    if code == 11000 {
                        HttpResponse::Conflict().body("User already exists")
                    } else {
                        log::error!("Error code: {}", code);
                        HttpResponse::InternalServerError().body("Failed to create user")
                    }
                }
                _ => HttpResponse::InternalServerError().body("Failed to create user"),
            },
            _ => HttpResponse::InternalServerError().body("Failed to create user"),
        },
    }
}

pub async fn signin(data: web::Data<Arc<Client>>, input: web::Json<SigninInput>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Account").collection("Users");

    let input = input.into_inner();
    let email = input.email.to_lowercase();

    let filter = doc! { "email": &email };

    match collection.find_one(filter).await {
        Ok(Some(user)) => {
            if bcrypt::verify(&input.password, &user.password).unwrap_or(false) {
                let update = doc! {
                    "$set": {
                        "last_signin": Utc::now().to_string(),
                        "failed_signins": 0
                    }
                };

                match collection.update_one(doc! { "email": &email }, update).await {
                    Ok(_) => match generate_token(&email, user.id.expect("Unable to read user_id."))
                    {
                        Ok(token) => HttpResponse::Ok().json(TokenResponse { auth_token: token }),
                        Err(_) => {
                            HttpResponse::InternalServerError().body("Token generation failed")
                        }
                    },
                    Err(err) => {
                        log::error!("Failed to update document: {:?}", err);
                        HttpResponse::InternalServerError().body("Failed to sign in.")
                    }
                }
            } else {
                let failed_signins = user.failed_signins.unwrap_or(0) + 1;
                let update = doc! {
                    "$set": { "failed_signins": failed_signins }
                };

                match collection.update_one(doc! { "email": &email }, update).await {
                    Ok(_) => HttpResponse::Unauthorized().body("Invalid credentials"),
                    Err(err) => {
                        log::error!("Failed to update failed signins: {:?}", err);
                        HttpResponse::InternalServerError().body("Failed to process signin")
                    }
                }
            }
        }
        Ok(None) => HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            log::error!("Database error: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to process signin")
        }
    }
}

pub async fn user_session(claims: Claims, data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Account").collection("Users");

    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(user_id) => user_id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match collection.find_one(doc! { "_id": user_id }).await {
        Ok(Some(user)) => {
            let user_session = UserSession {
                id: user.id.unwrap_or_default(),
                email: user.email,
                full_name: user.full_name.unwrap_or_default(),
                phone: user.phone.unwrap_or_default(),
                created_at: user.created_at.unwrap_or_default(),
            };
            HttpResponse::Ok().json(user_session)
        }
        Ok(None) => HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            log::error!("Failed to fetch user: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch user")
        }
    }
}

/// Issue a reset token. The response is the same whether or not the email
/// exists, so the endpoint cannot be used to enumerate accounts.
pub async fn forgot_password(
    data: web::Data<Arc<Client>>,
    input: web::Json<ForgotPasswordInput>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Account").collection("Users");

    let email = input.into_inner().email.to_lowercase();

    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();

    let update = doc! {
        "$set": {
            "reset_token": &token,
            "reset_token_expires": (Utc::now() + Duration::hours(1)).to_string(),
        }
    };

    match collection.update_one(doc! { "email": &email }, update).await {
        Ok(result) => {
            if result.matched_count > 0 {
                // Delivery is the mailer's job; the token is only logged at
                // debug level for local development
                log::debug!("Password reset token issued for {}: {}", email, token);
            }
            HttpResponse::Ok().body("If that account exists, a reset email is on its way")
        }
        Err(err) => {
            log::error!("Failed to store reset token: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to process request")
        }
    }
}

pub async fn reset_password(
    data: web::Data<Arc<Client>>,
    input: web::Json<ResetPasswordInput>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Account").collection("Users");

    let input = input.into_inner();
    if input.new_password.len() < 8 {
        return HttpResponse::BadRequest().body("Password must be at least 8 characters");
    }

    let filter = doc! {
        "reset_token": &input.token,
        "reset_token_expires": { "$gt": Utc::now().to_string() }
    };

    let hashed = match bcrypt::hash(&input.new_password, bcrypt::DEFAULT_COST) {
        Ok(hashed) => hashed,
        Err(err) => {
            log::error!("Failed to hash password: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to reset password");
        }
    };

    let update = doc! {
        "$set": {
            "password": hashed,
            "updated_at": Utc::now().to_string(),
        },
        "$unset": {
            "reset_token": "",
            "reset_token_expires": "",
        }
    };

    match collection.update_one(filter, update).await {
        Ok(result) => {
            if result.matched_count == 0 {
                return HttpResponse::BadRequest().body("Reset token is invalid or expired");
            }
            HttpResponse::Ok().body("Password updated")
        }
        Err(err) => {
            log::error!("Failed to reset password: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to reset password")
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    let re = regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
    );
    re.unwrap().is_match(email)
}

fn generate_token(email: &str, user_id: ObjectId) -> Result<String, jsonwebtoken::errors::Error> {
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let now = Utc::now();

    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(24)).timestamp() as usize,
        user_id: user_id.to_string(),
    };

    let header = Header::new(Algorithm::HS256);
    encode(&header, &claims, &EncodingKey::from_secret(secret.as_ref()))
}
