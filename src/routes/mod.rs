pub mod debug;
pub mod https;
pub mod pages;
pub mod simulations;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let artifacts = ServeDir::new(state.pipeline.output_dir());

    Router::new()
        .route("/", get(pages::trigger_form).post(pages::submit_form))
        .route("/visualise/{run_id}", get(pages::visualise))
        .route("/api/v1/simulations", post(simulations::create_simulation))
        .route("/debug/health", get(debug::health_check))
        .nest_service("/static", artifacts)
        .layer(middleware::from_fn(https::redirect_plain_http))
        .with_state(state)
}
