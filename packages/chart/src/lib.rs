#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Observation-frequency histogram rendering.
//!
//! For each species in a park whose total observation count meets the
//! generation threshold, renders a month-bucketed bar chart to a
//! deterministic path under the output directory. Paths are derived
//! from `(park_name, species_name)` with spaces replaced by
//! underscores, so re-running overwrites prior artifacts in place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use plant_map_observation_models::AggregateRecord;
use plotters::prelude::*;
use thiserror::Error;

/// Minimum observation count for a species to get a rendered histogram.
///
/// Note: the map-feature gate uses the separate, lower
/// `MAP_HISTOGRAM_MIN_OBSERVATIONS` in `plant_map_generate`. The two
/// values intentionally stay independent pending product clarification
/// of which one is right.
pub const HISTOGRAM_MIN_OBSERVATIONS: usize = 100;

/// Chart dimensions in pixels.
const CHART_SIZE: (u32, u32) = (900, 480);

/// Label every Nth month tick to keep the x axis readable.
const X_LABEL_EVERY: usize = 4;

/// Errors raised while rendering a single histogram.
///
/// These are isolated per species by [`render_park_histograms`]; one
/// unwritable chart never aborts the rest of the park.
#[derive(Debug, Error)]
pub enum ChartError {
    /// Output directory could not be created.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The drawing backend failed.
    #[error("Render error: {0}")]
    Render(String),
}

/// A rendered histogram and where the front end can fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramArtifact {
    pub scientific_name: String,
    pub park_name: String,
    /// Public URL path, e.g. `/static/images/Lincoln_Park/histogram_Quercus_alba.png`.
    pub histogram_url: String,
}

/// Replaces spaces with underscores for filesystem-safe path segments.
#[must_use]
pub fn underscored(name: &str) -> String {
    name.replace(' ', "_")
}

/// Deterministic on-disk path for a `(park, species)` histogram.
#[must_use]
pub fn histogram_path(out_dir: &Path, park_name: &str, scientific_name: &str) -> PathBuf {
    out_dir
        .join("images")
        .join(underscored(park_name))
        .join(format!("histogram_{}.png", underscored(scientific_name)))
}

/// Public URL for a `(park, species)` histogram.
#[must_use]
pub fn histogram_url(park_name: &str, scientific_name: &str) -> String {
    format!(
        "/static/images/{}/histogram_{}.png",
        underscored(park_name),
        underscored(scientific_name)
    )
}

/// Counts observations per `YYYY-MM` token, sorted ascending by token.
#[must_use]
pub fn bucket_counts(observed_dates: &[String]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for token in observed_dates {
        *counts.entry(token.clone()).or_insert(0) += 1;
    }
    counts
}

/// Sums observation counts and collects date tokens per species within
/// one park's aggregate records.
fn species_totals(
    records: &[AggregateRecord],
    park_name: &str,
) -> BTreeMap<String, (usize, Vec<String>)> {
    let mut totals: BTreeMap<String, (usize, Vec<String>)> = BTreeMap::new();
    for record in records.iter().filter(|r| r.park_name == park_name) {
        let entry = totals.entry(record.scientific_name.clone()).or_default();
        entry.0 += record.observation_count;
        entry.1.extend(record.observed_dates.iter().cloned());
    }
    totals
}

/// Species in one park that meet the generation threshold, with their
/// flattened date-token lists.
///
/// A species with exactly `min_observations` qualifies; one below it is
/// skipped silently (not an error).
#[must_use]
pub fn qualifying_species(
    records: &[AggregateRecord],
    park_name: &str,
    min_observations: usize,
) -> Vec<(String, Vec<String>)> {
    species_totals(records, park_name)
        .into_iter()
        .filter(|(_, (total, _))| *total >= min_observations)
        .map(|(name, (_, dates))| (name, dates))
        .collect()
}

/// Renders histograms for every qualifying species in one park.
///
/// Species below `min_observations` are skipped silently; render
/// failures for one species are logged and do not affect the others.
/// Returns the artifacts that were actually written.
pub fn render_park_histograms(
    records: &[AggregateRecord],
    park_name: &str,
    out_dir: &Path,
    min_observations: usize,
) -> Vec<HistogramArtifact> {
    let mut artifacts = Vec::new();

    for (scientific_name, observed_dates) in
        qualifying_species(records, park_name, min_observations)
    {
        match render_species_histogram(park_name, &scientific_name, &observed_dates, out_dir) {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => {
                log::error!("Failed to render histogram for {scientific_name} in {park_name}: {e}");
            }
        }
    }

    artifacts
}

/// Renders one species' month-bucketed bar chart and writes it to the
/// deterministic path.
///
/// # Errors
///
/// Returns [`ChartError`] if the output directory cannot be created or
/// the drawing backend fails.
pub fn render_species_histogram(
    park_name: &str,
    scientific_name: &str,
    observed_dates: &[String],
    out_dir: &Path,
) -> Result<HistogramArtifact, ChartError> {
    let counts = bucket_counts(observed_dates);
    let tokens: Vec<String> = counts.keys().cloned().collect();
    let max_count = counts.values().copied().max().unwrap_or(0);

    let path = histogram_path(out_dir, park_name, scientific_name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let root = BitMapBackend::new(&path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(to_render_error)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption(
            format!("Histogram of {scientific_name} Observations by Month"),
            ("sans-serif", 22),
        )
        .x_label_area_size(70)
        .y_label_area_size(50)
        .build_cartesian_2d(0..tokens.len(), 0..max_count + 1)
        .map_err(to_render_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(tokens.len().max(1))
        .x_label_formatter(&|idx| {
            if idx % X_LABEL_EVERY == 0 {
                tokens.get(*idx).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .x_desc("Month-Year")
        .y_desc("Observation Count")
        .draw()
        .map_err(to_render_error)?;

    chart
        .draw_series(counts.values().enumerate().map(|(i, count)| {
            Rectangle::new([(i, 0), (i + 1, *count)], BLUE.filled())
        }))
        .map_err(to_render_error)?;

    root.present().map_err(to_render_error)?;

    log::info!(
        "Rendered histogram for {scientific_name} in {park_name}: {}",
        path.display()
    );

    Ok(HistogramArtifact {
        scientific_name: scientific_name.to_string(),
        park_name: park_name.to_string(),
        histogram_url: histogram_url(park_name, scientific_name),
    })
}

fn to_render_error<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}
