use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, info, instrument};

use crate::auth::auth::AuthUser;
use crate::auth::password::hash_password;
use crate::auth::token;
use crate::config::Config;
use crate::error::ApiError;
use crate::filter::scope::authorize_user_deletion;
use crate::model::user::{NewUser, UserResponse};
use crate::models::{MessageResponse, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse};
use crate::store::{Store, StoreError};
use crate::utils::validation::ValidationErrors;

/// Register a user
#[utoipa::path(
    post,
    path = "/users",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User created", body = SignUpResponse),
        (status = 422, description = "Validation failed", body = Object, example = json!({
            "error": "Validation failed",
            "errors": {"email": ["has already been taken"]}
        }))
    ),
    tag = "Users"
)]
#[instrument(name = "users_sign_up", skip(store, payload))]
pub async fn sign_up(
    store: web::Data<dyn Store>,
    payload: web::Json<SignUpRequest>,
) -> Result<HttpResponse, ApiError> {
    let draft = payload.into_inner().user;

    let manager = match draft.manager_user_id {
        Some(id) => store.find_user(id).await?,
        None => None,
    };
    let valid = draft.validate(manager.as_ref())?;

    let encrypted_password = hash_password(&valid.password)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))?;

    let new_user = NewUser {
        email: valid.email,
        encrypted_password,
        name: valid.name,
        role: valid.role,
        manager_user_id: valid.manager_user_id,
        active: valid.active,
        revocation_id: token::fresh_revocation_id(),
    };

    let user = match store.insert_user(new_user).await {
        Ok(user) => user,
        Err(StoreError::Conflict(_)) => {
            debug!("Email already taken");
            return Err(ValidationErrors::single("email", "has already been taken").into());
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, role = %user.role, "User signed up");

    Ok(HttpResponse::Created().json(SignUpResponse {
        user: UserResponse::from(&user),
        message: "Signed up successfully".to_string(),
    }))
}

/// Sign in and receive a bearer token
#[utoipa::path(
    post,
    path = "/users/sign_in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in; the token is also in the Authorization header", body = SignInResponse),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({
            "error": "Invalid email or password"
        }))
    ),
    tag = "Users"
)]
#[instrument(
    name = "users_sign_in",
    skip(store, config, payload),
    fields(email = %payload.user.email)
)]
pub async fn sign_in(
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
    payload: web::Json<SignInRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Sign-in request received");

    let credentials = payload.into_inner().user;
    let user = token::authenticate(store.get_ref(), &credentials.email, &credentials.password).await?;
    let token = token::issue(&user, &config)?;

    info!(user_id = user.id, "Sign-in successful");

    Ok(HttpResponse::Ok()
        .insert_header(("Authorization", format!("Bearer {token}")))
        .json(SignInResponse {
            user: UserResponse::from(&user),
            token,
            message: "Signed in successfully".to_string(),
        }))
}

/// Revoke every token of the caller's current generation
#[utoipa::path(
    delete,
    path = "/users/sign_out",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Token already revoked or malformed", body = Object, example = json!({
            "error": "Token already revoked"
        })),
        (status = 422, description = "No token supplied", body = Object, example = json!({
            "error": "Token not provided"
        }))
    ),
    tag = "Users",
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(name = "users_sign_out", skip(req, store, config))]
pub async fn sign_out(
    req: HttpRequest,
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    token::revoke(store.get_ref(), &config.jwt_secret, header).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Signed out successfully")))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id", Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 403, description = "Not allowed to delete this user"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(name = "users_delete", skip(store, auth), fields(actor = auth.id))]
pub async fn delete_user(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let target = store.find_user(id).await?;
    authorize_user_deletion(&auth, target.as_ref())?;

    if !store.delete_user(id).await? {
        return Err(ApiError::not_found("User"));
    }

    info!(user_id = id, "User deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("User deleted successfully")))
}
