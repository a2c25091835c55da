use axum::Router;
use std::sync::Arc;
use stopviz::cache::{DiskTileCache, MemoryTileCache, TileCache};
use stopviz::config::Config;
use stopviz::services::pipeline::SimulationPipeline;
use stopviz::services::static_data::StaticDataReader;
use stopviz::services::tiles::{BasemapProvider, TileFetcher};
use stopviz::services::visualiser::RenderSettings;
use stopviz::AppState;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stopviz=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting stop visualiser server");
    tracing::info!("Configuration loaded successfully");

    tokio::fs::create_dir_all(&config.static_dir).await?;
    tracing::info!("Serving artifacts from {}", config.static_dir.display());

    // Initialize tile cache: try the disk directory, fall back to in-memory
    let tile_cache: Arc<dyn TileCache> = match DiskTileCache::new(&config.tiles.cache_dir).await {
        Ok(disk) => Arc::new(disk),
        Err(e) => {
            tracing::warn!(
                "Failed to open tile cache at {}: {}. Falling back to in-memory cache.",
                config.tiles.cache_dir.display(),
                e
            );
            Arc::new(MemoryTileCache::new(config.tiles.memory_cache_max_entries))
        }
    };

    let fetcher = match config.tiles.url_template {
        Some(ref template) => {
            tracing::info!("Basemap tiles from {}", template);
            Some(TileFetcher::new(template.clone(), config.tiles.fetch_timeout)?)
        }
        None => {
            tracing::info!("Basemap tiles disabled");
            None
        }
    };

    // Initialize services
    let reader = StaticDataReader::new(&config.stops_file, &config.bounds_file);
    tracing::info!("Reading {}", reader);

    let mut settings = RenderSettings {
        map_zoom: config.map_zoom,
        ..RenderSettings::default()
    };
    if let Some(ref template) = config.tiles.url_template {
        settings.interactive_tile_url = template.clone();
    }
    let pipeline = SimulationPipeline::new(
        reader,
        BasemapProvider::new(fetcher, tile_cache),
        config.static_dir.clone(),
        settings,
    );

    // Create application state
    let addr = config.server_address();
    let state = Arc::new(AppState { config, pipeline });

    // Build router with CORS and tracing
    let app = Router::new()
        .merge(stopviz::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
