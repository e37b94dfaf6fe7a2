use crate::{api::leave_request, config::Config};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit: {} per minute", requests_per_min))?;
    Ok(Governor::new(&cfg))
}

/// The limiter is built once and shared so every worker counts against the same quota.
pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: Arc<Limiter>) {
    // Protected routes, authenticated per handler through `AuthUser`
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(limiter) // rate limiting
            .configure(leave_routes),
    );
}

/// Leave request endpoints, relative to the API prefix.
pub fn leave_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/leave")
            // /leave
            .service(
                web::resource("")
                    .route(web::get().to(leave_request::leave_list))
                    .route(web::post().to(leave_request::create_leave)),
            )
            // /leave/employee/{employee_id}
            .service(
                web::resource("/employee/{employee_id}")
                    .route(web::get().to(leave_request::employee_leave_list)),
            )
            // /leave/{id}
            .service(
                web::resource("/{id}")
                    .route(web::put().to(leave_request::update_leave))
                    .route(web::delete().to(leave_request::delete_leave)),
            ),
    );
}
