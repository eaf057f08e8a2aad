use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use serde::{Deserialize, Serialize};

use crate::model::role::Role;
use crate::model::user::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// Email at issuance time.
    pub sub: String,
    pub role: Role,
    pub iat: u64,
    pub exp: u64,
    /// Snapshot of the user's revocation marker.
    pub jti: String,
}

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

pub fn issue_token(user: &User, secret: &str, ttl: u64) -> Result<String, Error> {
    issue_token_at(user, secret, ttl, now())
}

/// Issues a token as if the current time were `issued_at`.
pub fn issue_token_at(user: &User, secret: &str, ttl: u64, issued_at: u64) -> Result<String, Error> {
    let claims = Claims {
        user_id: user.id,
        sub: user.email.clone(),
        role: user.role,
        iat: issued_at,
        exp: issued_at + ttl,
        jti: user.revocation_id.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Checks signature and expiry. Expiry is exact, with no clock leeway.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, Error> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}
