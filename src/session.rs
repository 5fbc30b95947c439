//! Session tokens: issuing, decoding and carrying them over cookies or the
//! `Authorization` header.

use axum::http::{HeaderMap, HeaderValue, header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    models::Role,
};

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

pub fn issue_token(config: &AppConfig, user_id: i32, role: Role) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_expires_hours))
        .ok_or_else(|| AppError::internal("Failed to set expiration"))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(AppError::internal)
}

pub fn decode_token(config: &AppConfig, token: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}

/// The `token` cookie wins over a bearer header when both are sent.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

pub fn session_cookie(config: &AppConfig, token: &str) -> AppResult<HeaderValue> {
    let max_age = config.cookie_expire_days * 24 * 60 * 60;
    let mut cookie =
        format!("{TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(AppError::internal)
}

pub fn expired_cookie() -> HeaderValue {
    HeaderValue::from_static("token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::for_tests("postgres://unused")
    }

    #[test]
    fn issued_tokens_decode_to_the_same_identity() {
        let config = config();
        let token = issue_token(&config, 42, Role::Vendor).unwrap();
        let claims = decode_token(&config, &token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, Role::Vendor);
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let mut other = config();
        other.jwt_secret = "another-secret".into();
        let token = issue_token(&other, 1, Role::User).unwrap();
        let err = decode_token(&config(), &token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn reads_cookie_before_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-header"));

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=from-cookie"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn ignores_other_schemes_and_empty_values() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        assert_eq!(token_from_headers(&headers), None);
    }

    #[test]
    fn session_cookie_is_http_only() {
        let mut config = config();
        config.cookie_expire_days = 2;
        let cookie = session_cookie(&config, "abc").unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=172800"));
        assert!(!cookie.contains("Secure"));
    }
}
