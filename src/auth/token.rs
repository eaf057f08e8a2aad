//! Token issuance and the revocation state machine.
//!
//! Each user carries one revocation marker. A token snapshots it in `jti`;
//! signing out swaps the marker for a fresh one, so every token of the old
//! generation stops matching while tokens issued afterwards keep working.

use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::jwt::{decode_token, issue_token};
use crate::auth::password::verify_password;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::user::User;
use crate::store::Store;

pub fn fresh_revocation_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn issue(user: &User, config: &Config) -> Result<String, ApiError> {
    issue_token(user, &config.jwt_secret, config.token_ttl)
        .map_err(|e| ApiError::internal(format!("token encoding failed: {e}")))
}

/// Unknown email, wrong password and inactive account are indistinguishable.
pub async fn authenticate(store: &dyn Store, email: &str, password: &str) -> Result<User, ApiError> {
    let user = match store.find_user_by_email(email.trim()).await? {
        Some(user) => user,
        None => {
            debug!("Invalid credentials: user not found");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.encrypted_password) {
        debug!(user_id = user.id, "Invalid credentials: password mismatch");
        return Err(ApiError::InvalidCredentials);
    }

    if !user.active {
        debug!(user_id = user.id, "Invalid credentials: inactive account");
        return Err(ApiError::InvalidCredentials);
    }

    Ok(user)
}

/// The token part of an `Authorization` value; the `Bearer` word is optional.
pub fn token_from_header(header: &str) -> Option<&str> {
    header.split_whitespace().last()
}

/// Signs out the token's generation.
pub async fn revoke(store: &dyn Store, secret: &str, header: Option<&str>) -> Result<(), ApiError> {
    let token = header
        .and_then(token_from_header)
        .ok_or(ApiError::TokenMissing)?;

    let claims = decode_token(token, secret).map_err(|e| ApiError::MalformedToken(e.to_string()))?;

    let user = store
        .find_user(claims.user_id)
        .await?
        .ok_or(ApiError::AlreadyRevoked)?;

    if user.revocation_id != claims.jti {
        return Err(ApiError::AlreadyRevoked);
    }

    let fresh = fresh_revocation_id();
    if !store
        .rotate_revocation_id(user.id, &claims.jti, &fresh)
        .await?
    {
        // another sign-out with the same token won the swap
        return Err(ApiError::AlreadyRevoked);
    }

    info!(user_id = user.id, "Token generation revoked");
    Ok(())
}

/// Resolves a bearer token to its user.
pub async fn verify(store: &dyn Store, config: &Config, token: &str) -> Result<User, ApiError> {
    let claims = decode_token(token, &config.jwt_secret)
        .map_err(|_| ApiError::unauthenticated("Invalid or expired token"))?;

    let user = store
        .find_user(claims.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("User no longer exists"))?;

    if config.enforce_revocation && user.revocation_id != claims.jti {
        return Err(ApiError::unauthenticated("Token has been revoked"));
    }

    Ok(user)
}
