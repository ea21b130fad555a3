// src/utils/session_cookie.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::Config, error::AppError};

pub const SESSION_COOKIE: &str = "quiz_session";

/// Id of the server-side session the current request belongs to.
/// Inserted into request extensions by `session_middleware`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub Uuid);

/// Claims stored in the session cookie.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionClaims {
    /// Subject - the session id.
    pub sub: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a session id into a cookie value.
pub fn sign_session(id: Uuid, secret: &str, expiration_seconds: u64) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = SessionClaims {
        sub: id.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Returns the session id if the token is ours and not expired.
pub fn verify_session(token: &str, secret: &str) -> Option<Uuid> {
    // expiry must line up with the server-side idle timeout
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .ok()?;

    Uuid::parse_str(&token_data.claims.sub).ok()
}

fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Axum Middleware: Session.
///
/// Resolves the session id from the signed cookie, or mints a new one when
/// the cookie is missing, tampered with or expired. The id is injected into
/// the request extensions. Every response re-issues the cookie, so it expires
/// one ttl after the last request, like the server-side session does.
pub async fn session_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let existing = read_cookie(req.headers(), SESSION_COOKIE)
        .and_then(|token| verify_session(token, &config.session_secret));

    let id = existing.unwrap_or_else(|| {
        let id = Uuid::new_v4();
        tracing::debug!("Starting new session {}", id);
        id
    });

    req.extensions_mut().insert(SessionId(id));
    let mut response = next.run(req).await;

    match sign_session(id, &config.session_secret, config.session_ttl_secs) {
        Ok(token) => {
            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                SESSION_COOKIE, token, config.session_ttl_secs
            );
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => tracing::error!("Invalid session cookie header: {}", e),
            }
        }
        Err(e) => tracing::error!("Failed to sign session cookie: {}", e),
    }

    response
}
