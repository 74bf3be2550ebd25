use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::AppError;
use crate::services::AppState;

/// Access tokens are short-lived; refresh tokens live a week and are
/// signed with a separate secret.
const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;
const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtClaims {
    pub sub: String, // user id
    pub exp: usize,  // expiration timestamp
    pub iat: usize,  // issued at timestamp
}

#[derive(Debug)]
pub enum AuthError {
    InvalidToken,
    ExpiredToken,
    MissingToken,
    InvalidSignature,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::ExpiredToken => write!(f, "Token expired"),
            AuthError::MissingToken => write!(f, "Missing authorization token"),
            AuthError::InvalidSignature => write!(f, "Invalid token signature"),
        }
    }
}

impl std::error::Error for AuthError {}

pub struct JwtService {
    access_encoding_key: EncodingKey,
    access_decoding_key: DecodingKey,
    refresh_encoding_key: EncodingKey,
    refresh_decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access_encoding_key: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding_key: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding_key: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding_key: DecodingKey::from_secret(refresh_secret.as_bytes()),
        }
    }

    pub fn issue_access_token(&self, user_id: &str) -> Result<String, AuthError> {
        let claims = Self::claims(user_id, chrono::Duration::minutes(ACCESS_TOKEN_TTL_MINUTES));
        encode(&Header::default(), &claims, &self.access_encoding_key)
            .map_err(|_| AuthError::InvalidToken)
    }

    pub fn issue_refresh_token(&self, user_id: &str) -> Result<String, AuthError> {
        let claims = Self::claims(user_id, chrono::Duration::days(REFRESH_TOKEN_TTL_DAYS));
        encode(&Header::default(), &claims, &self.refresh_encoding_key)
            .map_err(|_| AuthError::InvalidToken)
    }

    pub fn validate_access_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        Self::validate(token, &self.access_decoding_key)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        Self::validate(token, &self.refresh_decoding_key)
    }

    fn claims(user_id: &str, ttl: chrono::Duration) -> JwtClaims {
        let now = chrono::Utc::now();
        JwtClaims {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        }
    }

    fn validate(token: &str, key: &DecodingKey) -> Result<JwtClaims, AuthError> {
        let validation = Validation::default();

        decode::<JwtClaims>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                if e.to_string().contains("ExpiredSignature") {
                    AuthError::ExpiredToken
                } else if e.to_string().contains("InvalidSignature") {
                    AuthError::InvalidSignature
                } else {
                    AuthError::InvalidToken
                }
            })
    }
}

/// Bearer-token guard for protected routes; validated claims land in
/// request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized("Missing authorization token"))?;

    let jwt_service = JwtService::new(
        &state.config.jwt_secret,
        &state.config.jwt_refresh_secret,
    );
    let claims = jwt_service.validate_access_token(token).map_err(|e| {
        tracing::warn!("JWT validation failed: {}", e);
        AppError::Unauthorized("Invalid or expired token")
    })?;

    tracing::debug!("Authenticated user: {}", claims.sub);

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
