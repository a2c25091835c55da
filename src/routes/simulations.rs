use crate::error::{AppError, Result};
use crate::models::{SimulationRequest, SimulationResult};
use crate::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// POST /api/v1/simulations
/// Run the simulator for a box and return the statistics, without rendering
pub async fn create_simulation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SimulationRequest>,
) -> Result<Json<SimulationResult>> {
    request.validate().map_err(AppError::InvalidRequest)?;

    let [x1, y1, x2, y2] = request.bounding_box;
    tracing::info!(
        x1, y1, x2, y2,
        requests = request.number_of_requests,
        "Simulation request: ({:.4}, {:.4}) - ({:.4}, {:.4}), {} requests",
        x1, y1, x2, y2, request.number_of_requests
    );

    let result = state
        .pipeline
        .simulate(&request.bbox(), request.number_of_requests)
        .await?;

    Ok(Json(result))
}
