#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the plant map server.
//!
//! Field names stay snake_case to match the map document contract the
//! front end already consumes.

use plant_map_observation_models::SubmittedObservation;
use serde::{Deserialize, Serialize};

/// `GET /api/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    pub healthy: bool,
    pub version: String,
}

/// A user-submitted observation, with an optional inline image.
///
/// The image travels as a base64 payload plus its original filename;
/// the filename's extension is validated against the allowed set and
/// the name is sanitized before anything touches the filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewObservationRequest {
    pub scientific_name: String,
    #[serde(default)]
    pub common_name: String,
    pub observed_on: String,
    pub park_name: String,
    /// Original filename of the uploaded image.
    #[serde(default)]
    pub image_name: Option<String>,
    /// Base64-encoded image bytes.
    #[serde(default)]
    pub image_base64: Option<String>,
}

/// `POST /api/identify` request: one photo to identify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyRequest {
    /// Base64-encoded photo bytes.
    pub image_base64: String,
}

/// JSON error body returned for request failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// `GET /api/observations` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationList {
    pub observations: Vec<SubmittedObservation>,
}
