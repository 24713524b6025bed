// libs/scheduling-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn scheduling_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/availability/check", post(handlers::check_availability))
        .route("/availability/bulk", post(handlers::check_bulk_availability))
        .route("/resolve", post(handlers::resolve_conflict))
        .with_state(state)
}
