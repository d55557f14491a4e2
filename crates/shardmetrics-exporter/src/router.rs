//! Axum router wiring.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/metrics", get(ops::metrics))
        .route("/v1/toggles", get(ops::get_toggles).put(ops::put_toggles))
        .route("/v1/completions", post(ops::post_completions))
        .with_state(state)
}
