#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the arrest map application.
//!
//! Serves arrest density markers, dataset statistics and a ranked summary of
//! the busiest locations as JSON. The dataset is a CSV export read on every
//! request; place names for the summary come from a file-backed geocode
//! cache in front of a rate-limited reverse geocoder.

pub mod config;
mod handlers;
pub mod pipeline;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use arrest_map_geocoder::{
    CacheError, GeocodeCache, GeocodeError, RateLimiter, ReverseGeocoder, build_geocoder,
    build_rate_limiter,
};
use thiserror::Error;
use tokio::sync::Mutex;

pub use config::{ConfigError, ServerConfig};

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The geocode cache file exists but cannot be used.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The geocoder client could not be built.
    #[error(transparent)]
    Geocoder(#[from] GeocodeError),

    /// Binding or serving failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Settings read at startup.
    pub config: ServerConfig,
    /// Geocode cache. Held for the whole of a summary so lookups and the
    /// save that follows them are never interleaved.
    pub cache: Mutex<GeocodeCache>,
    /// Reverse geocoder used on cache misses.
    pub geocoder: Arc<dyn ReverseGeocoder>,
    /// Pacing for geocoder calls, shared by all requests.
    pub limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    /// Opens the geocode cache and builds the geocoder that `config` names.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Cache`] if the cache file is unreadable or
    /// corrupt, and [`ServerError::Geocoder`] if the HTTP client cannot be
    /// built.
    pub fn from_config(config: ServerConfig) -> Result<Self, ServerError> {
        log::info!("Loading geocode cache...");
        let cache = GeocodeCache::load(&config.cache_path)?;
        log::info!("Geocode cache has {} entries", cache.len());

        let geocoder = build_geocoder(&config.geocoder)?;
        let limiter = build_rate_limiter(&config.geocoder);

        Ok(Self::new(config, cache, geocoder, limiter))
    }

    /// Assembles state from already-built parts.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        cache: GeocodeCache,
        geocoder: Arc<dyn ReverseGeocoder>,
        limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            config,
            cache: Mutex::new(cache),
            geocoder,
            limiter,
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::QueryConfig::default().error_handler(handlers::query_error))
            .route("/health", web::get().to(handlers::health))
            .route("/map", web::get().to(handlers::map))
            .route("/data", web::get().to(handlers::data))
            .route("/summary", web::get().to(handlers::summary)),
    );
}

/// Starts the arrest map API server.
///
/// Opens the geocode cache, builds the geocoder, and runs the Actix-Web
/// HTTP server until it is stopped. The caller provides the async runtime
/// (e.g. via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns [`ServerError`] if the cache or geocoder cannot be set up, or if
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let bind_addr = config.bind_addr.clone();
    let port = config.port;

    let state = web::Data::new(AppState::from_config(config)?);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
