//! Bearer-token identity. Tokens are issued by the auth provider; this side
//! only validates them and maps claims to a `Requester`.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::policy::Requester;

pub const ROLE_AUTHENTICATED: &str = "authenticated";
pub const ROLE_SERVICE: &str = "service_role";

/// JWT claims: `sub` = subject id (Uuid as string), `role`, `exp` (expiry), `iat` (issued at).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

const JWT_EXPIRY_HOURS: i64 = 24;

impl Claims {
    pub fn new(sub: String, role: &str) -> Self {
        let now = chrono::Utc::now();
        let exp = (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp();
        Self {
            sub,
            role: role.to_string(),
            exp,
            iat: now.timestamp(),
        }
    }

    /// `None` for unknown roles or a non-UUID subject.
    pub fn requester(&self) -> Option<Requester> {
        match self.role.as_str() {
            ROLE_SERVICE => Some(Requester::Service),
            ROLE_AUTHENTICATED => Uuid::parse_str(&self.sub).ok().map(Requester::User),
            _ => None,
        }
    }
}

fn sign(secret: &[u8], claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret))
}

/// Token for an authenticated user, as the auth provider would issue it.
pub fn create_token(secret: &[u8], user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
    sign(secret, &Claims::new(user_id.to_string(), ROLE_AUTHENTICATED))
}

/// Token carrying the elevated role used by auth lifecycle hooks.
pub fn create_service_token(secret: &[u8]) -> Result<String, jsonwebtoken::errors::Error> {
    sign(secret, &Claims::new("service".to_string(), ROLE_SERVICE))
}

pub fn decode_token(secret: &[u8], token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)?;
    Ok(token_data.claims)
}

/// No `Authorization` header means anonymous; a bad or expired token is rejected.
impl FromRequestParts<AppState> for Requester {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Requester::Anonymous);
        };
        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;
        let claims = decode_token(&state.jwt_secret, token).map_err(|err| {
            debug!(error = %err, "rejected bearer token");
            ApiError::Unauthorized
        })?;
        claims.requester().ok_or(ApiError::Unauthorized)
    }
}

/// Reject anonymous callers on routes that need an identity.
pub fn authenticated(requester: Requester) -> Result<Requester, ApiError> {
    match requester {
        Requester::Anonymous => Err(ApiError::Unauthorized),
        other => Ok(other),
    }
}
