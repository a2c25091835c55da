use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Check if static data and the tile cache are usable
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut status = json!({
        "status": "ok",
        "checks": {}
    });

    // Static data
    let config = &state.config;
    status["checks"]["paths"] = json!({
        "static_dir": config.static_dir.display().to_string(),
        "stops_file": config.stops_file.display().to_string(),
        "bounds_file": config.bounds_file.display().to_string(),
    });

    match state.pipeline.load_static_data().await {
        Ok(dataset) => {
            status["checks"]["stops"] = match dataset.stops {
                Some(ref stops) => json!(stops.len()),
                None => json!("missing"),
            };
            status["checks"]["boundary_vertices"] = match dataset.bounds {
                Some(ref bounds) => json!(bounds.len()),
                None => json!("missing"),
            };
        }
        Err(e) => {
            status["checks"]["static_data"] = json!({"error": e.to_string()});
            status["status"] = json!("error");
        }
    }

    // Basemap tiles
    let basemap = state.pipeline.basemap();
    let stats = basemap.cache().get_stats().await;
    status["checks"]["basemap"] = json!({
        "enabled": basemap.is_enabled(),
        "cache_backend": basemap.cache().backend_name(),
        "cache_hits": stats.hits,
        "cache_misses": stats.misses,
    });

    Json(status)
}
