use crate::{
    api::{expense, tag},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::ApiError,
    utils::validation::ValidationErrors,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, Responder, get, middleware::from_fn, web};
use std::sync::Arc;
use tracing::warn;

/// Milliseconds between replenished requests for a per-minute rate.
fn replenish_period_ms(requests_per_min: u32) -> u64 {
    (60_000 / u64::from(requests_per_min.max(1))).max(1)
}

fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(replenish_period_ms(requests_per_min))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_else(|| {
            warn!(requests_per_min, "Rate limit rejected, using the governor default");
            GovernorConfig::default()
        });
    Governor::new(&cfg)
}

/// Liveness probe.
#[get("/up")]
async fn up() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let sign_in_limiter = Arc::new(build_limiter(config.rate_sign_in_per_min));
    let sign_up_limiter = Arc::new(build_limiter(config.rate_sign_up_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    let prefix = config.api_prefix.trim_end_matches('/');

    // Unreadable bodies are reported like any other validation failure
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::Validation(ValidationErrors::single("body", err.to_string())).into()
    }));

    cfg.service(up);

    // Users: sign-up, sign-in and sign-out are public; deletion needs a token
    cfg.service(
        web::scope(&format!("{prefix}/users"))
            .service(
                web::resource("")
                    .wrap(sign_up_limiter)
                    .route(web::post().to(handlers::sign_up)),
            )
            .service(
                web::resource("/sign_in")
                    .wrap(sign_in_limiter.clone())
                    .route(web::post().to(handlers::sign_in)),
            )
            .service(
                web::resource("/sign_out")
                    .wrap(sign_in_limiter)
                    .route(web::delete().to(handlers::sign_out)),
            )
            .service(
                web::resource("/{id}")
                    .wrap(from_fn(auth_middleware))
                    .wrap(protected_limiter.clone())
                    .route(web::delete().to(handlers::delete_user)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&format!("{prefix}/expenses"))
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter.clone())
            // /expenses
            .service(
                web::resource("")
                    .route(web::get().to(expense::list_expenses))
                    .route(web::post().to(expense::create_expense)),
            )
            // /expenses/{id}
            .service(
                web::resource("/{id}")
                    .route(web::get().to(expense::get_expense))
                    .route(web::patch().to(expense::update_expense))
                    .route(web::delete().to(expense::delete_expense)),
            ),
    );

    cfg.service(
        web::scope(&format!("{prefix}/tags"))
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            // /tags
            .service(
                web::resource("")
                    .route(web::get().to(tag::list_tags))
                    .route(web::post().to(tag::create_tag)),
            )
            // /tags/{id}
            .service(
                web::resource("/{id}")
                    .route(web::get().to(tag::get_tag))
                    .route(web::patch().to(tag::update_tag))
                    .route(web::delete().to(tag::delete_tag)),
            ),
    );
}
