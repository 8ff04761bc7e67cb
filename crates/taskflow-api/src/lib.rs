//! HTTP submission API: `POST /jobs`, `GET /jobs/:id`, plus liveness and
//! readiness routes. Grounded in `original_source/adapters/inbound/api/`
//! and the pack's axum services (`hook-api::handlers::app::add_routes`).

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use taskflow_core::ports::UnitOfWorkFactory;

use crate::state::AppState;

/// Builds the router. `enable_metrics` mounts a placeholder `/metrics`
/// route so deployments that flip `TASKFLOW_ENABLE_METRICS` get a stable
/// 200 instead of a 404 scrape failure; it emits no real series.
pub fn app<F: UnitOfWorkFactory + 'static>(factory: Arc<F>, enable_metrics: bool) -> Router {
    let state = AppState::new(factory);

    let mut router = Router::new()
        .route("/_liveness", get(handlers::liveness))
        .route("/_readiness", get(handlers::readiness))
        .route("/jobs", post(handlers::schedule_job::<F>))
        .route("/jobs/:id", get(handlers::get_job::<F>));

    if enable_metrics {
        router = router.route("/metrics", get(handlers::metrics_placeholder));
    }

    router.with_state(state)
}
