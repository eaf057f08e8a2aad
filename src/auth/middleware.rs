use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use tracing::debug;

use crate::auth::auth::AuthUser;
use crate::auth::token;
use crate::config::Config;
use crate::error::ApiError;
use crate::store::Store;

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| ApiError::internal("App config missing"))?;
    let store = req
        .app_data::<Data<dyn Store>>()
        .cloned()
        .ok_or_else(|| ApiError::internal("Store missing"))?;

    let header_value = match req.headers().get("Authorization") {
        Some(h) => match h.to_str() {
            Ok(value) => value.to_string(),
            Err(_) => {
                let err = ApiError::unauthenticated("Invalid Authorization header encoding");
                return Ok(req.into_response(err.error_response()));
            }
        },
        None => {
            let err = ApiError::unauthenticated("You need to sign in before continuing");
            return Ok(req.into_response(err.error_response()));
        }
    };

    let token = match header_value.strip_prefix("Bearer ") {
        Some(t) => t.trim(),
        None => {
            let err = ApiError::unauthenticated("Authorization header must start with Bearer");
            return Ok(req.into_response(err.error_response()));
        }
    };

    let user = match token::verify(store.get_ref(), &config, token).await {
        Ok(user) => user,
        Err(err) => {
            debug!(error = %err, "Rejected bearer token");
            return Ok(req.into_response(err.error_response()));
        }
    };

    debug!(user_id = user.id, "Authenticated request");
    req.extensions_mut().insert(AuthUser(user));

    next.call(req).await
}
