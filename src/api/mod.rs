pub mod records;
pub mod reverse;
pub mod zones;

use axum::{
    Extension, Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::SharedState;

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // zones
        .route("/api/zones", get(zones::list).post(zones::create))
        .route("/api/zones/{id}", delete(zones::remove))
        .route(
            "/api/zones/{id}/dnssec",
            post(zones::secure).delete(zones::unsecure),
        )
        // records
        .route(
            "/api/zones/{id}/records",
            get(records::list).post(records::create),
        )
        .route("/api/zones/{id}/records/validate", post(records::validate))
        .route(
            "/api/records/{id}",
            put(records::update).delete(records::remove),
        )
        // reverse and serial helpers
        .route("/api/reverse/ptr", get(reverse::lookup))
        .route("/api/reverse/ipv4", post(reverse::batch_ipv4))
        .route("/api/reverse/ipv6", post(reverse::batch_ipv6))
        .route("/api/serial/next", get(reverse::next_serial))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}
