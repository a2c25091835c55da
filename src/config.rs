use crate::constants::*;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Generated artifacts are written here and served under `/static`.
    pub static_dir: PathBuf,
    pub stops_file: PathBuf,
    pub bounds_file: PathBuf,
    pub tiles: TileConfig,
    /// Initial zoom of the interactive map.
    pub map_zoom: u8,
}

#[derive(Debug, Clone)]
pub struct TileConfig {
    /// `{z}/{x}/{y}` template; `None` renders without a basemap.
    pub url_template: Option<String>,
    pub cache_dir: PathBuf,
    pub fetch_timeout: Duration,
    /// Capacity of the in-memory fallback cache.
    pub memory_cache_max_entries: u64,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            url_template: Some(DEFAULT_TILE_URL_TEMPLATE.to_string()),
            cache_dir: PathBuf::from(DEFAULT_TILE_CACHE_DIR),
            fetch_timeout: Duration::from_secs(DEFAULT_TILE_FETCH_TIMEOUT_SECS),
            memory_cache_max_entries: DEFAULT_TILE_MEMORY_CACHE_MAX_ENTRIES,
        }
    }
}

impl TileConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let url_template = match env::var("TILE_URL_TEMPLATE") {
            Ok(value) => parse_url_template(&value)?,
            Err(_) => defaults.url_template,
        };

        let fetch_timeout_secs: u64 = env::var("TILE_FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TILE_FETCH_TIMEOUT_SECS.to_string())
            .parse()
            .map_err(|_| "Invalid TILE_FETCH_TIMEOUT_SECS")?;

        if fetch_timeout_secs == 0 {
            return Err("TILE_FETCH_TIMEOUT_SECS must be at least 1 second".to_string());
        }

        Ok(Self {
            url_template,
            cache_dir: env::var("TILE_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            memory_cache_max_entries: env::var("TILE_MEMORY_CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| defaults.memory_cache_max_entries.to_string())
                .parse()
                .map_err(|_| "Invalid TILE_MEMORY_CACHE_MAX_ENTRIES")?,
        })
    }
}

/// `none` or an empty value disables the basemap.
fn parse_url_template(value: &str) -> Result<Option<String>, String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    if !["{z}", "{x}", "{y}"].iter().all(|p| value.contains(p)) {
        return Err(format!(
            "TILE_URL_TEMPLATE must contain {{z}}, {{x}} and {{y}} placeholders: {}",
            value
        ));
    }
    Ok(Some(value.to_string()))
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let map_zoom: u8 = env::var("MAP_ZOOM")
            .unwrap_or_else(|_| DEFAULT_MAP_ZOOM.to_string())
            .parse()
            .map_err(|_| "Invalid MAP_ZOOM")?;

        if map_zoom > MAX_TILE_ZOOM {
            return Err(format!("MAP_ZOOM must be between 0 and {}", MAX_TILE_ZOOM));
        }

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            static_dir: path_var("STATIC_DIR", DEFAULT_STATIC_DIR),
            stops_file: path_var("STOPS_FILE", DEFAULT_STOPS_FILE),
            bounds_file: path_var("BOUNDS_FILE", DEFAULT_BOUNDS_FILE),
            tiles: TileConfig::from_env()?,
            map_zoom,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn path_var(name: &str, default: &str) -> PathBuf {
    env::var(name)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
