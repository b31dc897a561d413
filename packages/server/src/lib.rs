#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the plant map application.
//!
//! Serves the map `GeoJSON` document (recomputed from the source
//! datasets on every request), accepts user-submitted observations into
//! the in-memory store, proxies photos to the external identification
//! service, and serves rendered histogram and upload images as static
//! files.

mod handlers;
pub mod identify;
pub mod upload;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use plant_map_database::MemoryStore;
use plant_map_generate::PipelineConfig;
use thiserror::Error;

/// A malformed user submission, recovered at the request boundary and
/// surfaced as a client error. Never crashes the pipeline.
#[derive(Debug, Error)]
#[error("Validation error: {message}")]
pub struct ValidationError {
    /// What was wrong with the submission.
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The external identification service failed: network error, non-2xx
/// status, or an unparseable body.
#[derive(Debug, Error)]
#[error("Upstream identification service error: {message}")]
pub struct UpstreamServiceError {
    /// What the upstream call reported.
    pub message: String,
}

impl UpstreamServiceError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Shared application state, injected into handlers via [`web::Data`].
///
/// Explicitly constructed in [`run_server`]; there is no process-wide
/// singleton.
pub struct AppState {
    /// In-memory store for user-submitted observations.
    pub store: MemoryStore,
    /// Dataset paths and thresholds for the per-request pipeline run.
    pub config: PipelineConfig,
    /// HTTP client for the identification proxy.
    pub http: reqwest::Client,
    /// Plant.id API key, when configured.
    pub plant_id_api_key: Option<String>,
}

/// Starts the plant map API server.
///
/// Dataset locations come from `PARKS_PATH`, `OBSERVATIONS_PATH`, and
/// `STATIC_DIR`; the identification key from `PLANT_ID_API_KEY`. This
/// is a regular async function — the caller provides the runtime (e.g.
/// via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let parks_path =
        std::env::var("PARKS_PATH").unwrap_or_else(|_| "data/chicago_parks/parks.geojson".into());
    let observations_path = std::env::var("OBSERVATIONS_PATH")
        .unwrap_or_else(|_| "data/plant_observations/chicago_plant_observations.csv".into());
    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into());
    let plant_id_api_key = std::env::var("PLANT_ID_API_KEY").ok();

    if plant_id_api_key.is_none() {
        log::warn!("PLANT_ID_API_KEY not set; /api/identify will report an upstream error");
    }

    let config = PipelineConfig::new(parks_path, observations_path, &static_dir);
    std::fs::create_dir_all(&config.out_dir)?;

    let state = web::Data::new(AppState {
        store: MemoryStore::new(),
        config,
        http: reqwest::Client::new(),
        plant_id_api_key,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();
        let static_root = static_dir.clone();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/map", web::get().to(handlers::map_document))
                    .route("/observations", web::get().to(handlers::list_observations))
                    .route("/observations", web::post().to(handlers::add_observation))
                    .route("/identify", web::post().to(handlers::identify_plant)),
            )
            // Rendered histograms and uploaded observation images
            .service(Files::new("/static", static_root))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
