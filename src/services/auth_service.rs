use axum::http::{self};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Claims carried by an auth token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

// Get the auth token from a request
pub fn get_auth_token<B>(req: &http::Request<B>) -> Result<String, String> {
    // 1. Try to get token from Authorization header
    if let Some(auth_header) = req.headers().get(http::header::AUTHORIZATION) {
        let auth_str = auth_header.to_str().map_err(|_| "Invalid Authorization header".to_string())?;
        Ok(auth_str
            .strip_prefix("Bearer ")
            .unwrap_or(auth_str)
            .to_string())
    }
    // 2. Try to get token from cookies
    else {
        let cookie_header = req.headers().get(http::header::COOKIE)
            .ok_or_else(|| "Missing Authorization header or Cookie".to_string())?
            .to_str()
            .map_err(|_| "Invalid Cookie header".to_string())?;

        for cookie in cookie::Cookie::split_parse(cookie_header) {
            if let Ok(c) = cookie {
                if c.name() == "auth_token" {
                    return Ok(c.value().to_string());
                }
            }
        }
        Err("auth_token cookie not found".to_string())
    }
}

// Issue a token for a freshly generated user id
pub fn create_token(secret: &str, ttl_secs: u64) -> Result<(String, String), jsonwebtoken::errors::Error> {
    let user_id = Uuid::new_v4().to_string();
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.clone(),
        iat: now,
        exp: now + ttl_secs as i64,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    info!(user_id = %user_id, "Auth token issued");
    Ok((user_id, token))
}

// Validate a JWT token and return the token data
pub fn validate_jwt(token: &str, secret: &str) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &validation)
}

// Get the user id of a request carrying a valid token
pub fn get_user_id<B>(req: &http::Request<B>, secret: &str) -> Result<String, String> {
    let token = get_auth_token(req)?;
    let token_data = validate_jwt(&token, secret).map_err(|e| format!("JWT validation failed: {}", e))?;
    Ok(token_data.claims.sub)
}
