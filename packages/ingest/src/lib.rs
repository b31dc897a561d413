#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset loading and cleaning for the plant map pipeline.
//!
//! Reads the park boundary `GeoJSON` and the crowdsourced observation CSV
//! into typed records, then filters observations down to well-formed
//! plant sightings. Loading is tolerant of malformed individual rows;
//! an unreadable source or a CRS problem is fatal to the whole run.

pub mod clean;
pub mod observations;
pub mod parks;

use thiserror::Error;

/// Errors raised while loading source datasets.
///
/// Any of these aborts the pipeline run; partial output is never
/// produced from a half-loaded dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Source file missing or unreadable.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV structure could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Boundary document is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    Geojson(#[from] geojson::Error),

    /// A record is missing a field the pipeline cannot proceed without.
    #[error("Missing required field `{field}` in {context}")]
    MissingField {
        /// Name of the absent field.
        field: String,
        /// Which record or document it was expected in.
        context: String,
    },

    /// Undeclared, malformed, or mismatched coordinate reference system.
    #[error("CRS error: {message}")]
    Crs {
        /// Description of what went wrong.
        message: String,
    },
}

impl LoadError {
    /// Convenience constructor for [`LoadError::MissingField`].
    #[must_use]
    pub fn missing_field(field: &str, context: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
            context: context.to_string(),
        }
    }

    /// Convenience constructor for [`LoadError::Crs`].
    #[must_use]
    pub fn crs(message: impl Into<String>) -> Self {
        Self::Crs {
            message: message.into(),
        }
    }
}
