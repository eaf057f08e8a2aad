use actix_web::{HttpResponse, web};
use tracing::{info, instrument};

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::tag::{Tag, TagPayload};
use crate::store::Store;

#[utoipa::path(
    get,
    path = "/tags",
    responses((status = 200, description = "All tags", body = [Tag])),
    tag = "Tags",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_tags(_auth: AuthUser, store: web::Data<dyn Store>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(store.list_tags().await?))
}

#[utoipa::path(
    get,
    path = "/tags/{id}",
    params(("id", Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag", body = Tag),
        (status = 404, description = "Tag not found")
    ),
    tag = "Tags",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_tag(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let tag = store
        .find_tag(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Tag"))?;
    Ok(HttpResponse::Ok().json(tag))
}

#[utoipa::path(
    post,
    path = "/tags",
    request_body = TagPayload,
    responses(
        (status = 201, description = "Tag created", body = Tag),
        (status = 422, description = "Validation failed", body = Object, example = json!({
            "error": "Validation failed",
            "errors": {"description": ["can't be blank"]}
        }))
    ),
    tag = "Tags",
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(name = "tags_create", skip(store, auth, payload), fields(actor = auth.id))]
pub async fn create_tag(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<TagPayload>,
) -> Result<HttpResponse, ApiError> {
    let description = payload.into_inner().validate()?;
    let tag = store.insert_tag(&description).await?;

    info!(tag_id = tag.id, "Tag created");
    Ok(HttpResponse::Created()
        .insert_header(("Location", format!("/tags/{}", tag.id)))
        .json(tag))
}

#[utoipa::path(
    patch,
    path = "/tags/{id}",
    params(("id", Path, description = "Tag id")),
    request_body = TagPayload,
    responses(
        (status = 200, description = "Tag updated", body = Tag),
        (status = 404, description = "Tag not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Tags",
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(name = "tags_update", skip(store, auth, payload), fields(actor = auth.id))]
pub async fn update_tag(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<TagPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if store.find_tag(id).await?.is_none() {
        return Err(ApiError::not_found("Tag"));
    }

    let tag = Tag {
        id,
        description: payload.into_inner().validate()?,
    };
    if !store.update_tag(&tag).await? {
        return Err(ApiError::not_found("Tag"));
    }

    info!(tag_id = id, "Tag updated");
    Ok(HttpResponse::Ok().json(tag))
}

/// Responds with the removed tag.
#[utoipa::path(
    delete,
    path = "/tags/{id}",
    params(("id", Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag deleted", body = Tag),
        (status = 404, description = "Tag not found")
    ),
    tag = "Tags",
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(name = "tags_delete", skip(store, auth), fields(actor = auth.id))]
pub async fn delete_tag(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let tag = store
        .find_tag(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tag"))?;

    if !store.delete_tag(id).await? {
        return Err(ApiError::not_found("Tag"));
    }

    info!(tag_id = id, "Tag deleted");
    Ok(HttpResponse::Ok().json(tag))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::test;
    use serde_json::{Value, json};

    use super::*;
    use crate::model::role::Role;
    use crate::store::MemoryStore;
    use crate::test_support::{bearer, new_user, peer, test_app, test_config};

    #[actix_web::test]
    async fn tag_lifecycle() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let config = test_config();
        let user = store
            .insert_user(new_user("e@email.com", Role::Employee, None))
            .await
            .unwrap();
        let app = test::init_service(test_app(store.clone(), config.clone())).await;
        let auth = bearer(&user, &config);

        let req = peer(test::TestRequest::post().uri("/tags"))
            .insert_header(auth.clone())
            .set_json(json!({"description": "Travel"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let created: Value = test::read_body_json(resp).await;
        let id = created["id"].as_u64().unwrap();
        assert_eq!(created["description"], "Travel");

        let req = peer(test::TestRequest::patch().uri(&format!("/tags/{id}")))
            .insert_header(auth.clone())
            .set_json(json!({"description": "Flights"}))
            .to_request();
        let updated: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(updated, json!({"id": id, "description": "Flights"}));

        let req = peer(test::TestRequest::get().uri("/tags"))
            .insert_header(auth.clone())
            .to_request();
        let listed: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(listed, json!([{"id": id, "description": "Flights"}]));

        let req = peer(test::TestRequest::delete().uri(&format!("/tags/{id}")))
            .insert_header(auth.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let removed: Value = test::read_body_json(resp).await;
        assert_eq!(removed["description"], "Flights");

        let req = peer(test::TestRequest::get().uri(&format!("/tags/{id}")))
            .insert_header(auth)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn blank_description_is_rejected() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let config = test_config();
        let user = store
            .insert_user(new_user("e@email.com", Role::Employee, None))
            .await
            .unwrap();
        let app = test::init_service(test_app(store, config.clone())).await;

        let req = peer(test::TestRequest::post().uri("/tags"))
            .insert_header(bearer(&user, &config))
            .set_json(json!({"description": ""}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 422);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"]["description"], json!(["can't be blank"]));
    }

    #[actix_web::test]
    async fn tags_require_a_token() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let app = test::init_service(test_app(store, test_config())).await;
        let req = peer(test::TestRequest::get().uri("/tags")).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);
    }
}
