//! HTTP surface of the report filler.
//!
//! `GET`/`POST /api/fill-template` renders a report onto a PDF template;
//! `GET /health` is a liveness probe.

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

pub mod chart;
pub mod config;
pub mod error;
pub mod middleware;
pub mod request;
pub mod routes;
pub mod state;

use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/api/fill-template",
            get(routes::fill_template::fill_template_get)
                .post(routes::fill_template::fill_template_post),
        )
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(axum_mw::from_fn(middleware::audit::audit_log)),
        )
        .with_state(state)
}
