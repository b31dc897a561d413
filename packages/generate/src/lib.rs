#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch pipeline runner for the plant map.
//!
//! Wires the stages together: load parks and observations, clean,
//! spatially match, aggregate, render histograms, and assemble the
//! map-ready `GeoJSON` document. One run executes to completion
//! single-threaded; the only state shared between runs is the rendered
//! histogram files on disk.

pub mod document;

use std::path::{Path, PathBuf};

use plant_map_aggregate::aggregate_observations;
use plant_map_chart::HISTOGRAM_MIN_OBSERVATIONS;
use plant_map_ingest::{clean::TARGET_TAXON_GROUP, observations, parks};
pub use plant_map_ingest::LoadError;
use plant_map_observation_models::AggregateRecord;
use plant_map_park_models::{Crs, ParkDataset};
use plant_map_spatial::match_observations;

/// Minimum observation count for a map feature to reference a
/// histogram.
///
/// Independent from `plant_map_chart::HISTOGRAM_MIN_OBSERVATIONS` (100):
/// the source system used both values for what looks like one concept,
/// and the discrepancy is preserved until product clarifies which is
/// intended.
pub const MAP_HISTOGRAM_MIN_OBSERVATIONS: usize = 30;

/// Where to find the input datasets and where to write artifacts.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Park boundary `GeoJSON` path.
    pub parks_path: PathBuf,
    /// Observation CSV path.
    pub observations_path: PathBuf,
    /// Root of the public static directory (histograms go under
    /// `<out_dir>/images/`).
    pub out_dir: PathBuf,
    /// Taxonomic group the cleaner keeps.
    pub target_group: String,
    /// Histogram generation threshold (T1).
    pub histogram_min_observations: usize,
    /// Map-feature histogram gate (T2).
    pub map_histogram_min_observations: usize,
}

impl PipelineConfig {
    #[must_use]
    pub fn new(
        parks_path: impl Into<PathBuf>,
        observations_path: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            parks_path: parks_path.into(),
            observations_path: observations_path.into(),
            out_dir: out_dir.into(),
            target_group: TARGET_TAXON_GROUP.to_string(),
            histogram_min_observations: HISTOGRAM_MIN_OBSERVATIONS,
            map_histogram_min_observations: MAP_HISTOGRAM_MIN_OBSERVATIONS,
        }
    }
}

/// Everything the assembler and histogram renderer need from one batch
/// run: the loaded parks and the aggregated observation statistics.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub parks: ParkDataset,
    pub aggregates: Vec<AggregateRecord>,
}

/// Runs load, clean, match, and aggregate.
///
/// Observation coordinates are WGS84 latitude/longitude; the park
/// dataset must declare the same CRS or the run aborts.
///
/// # Errors
///
/// Returns [`LoadError`] if either dataset cannot be loaded or the CRS
/// check fails. No partial output is produced.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutput, LoadError> {
    let parks = parks::load_parks(&config.parks_path)?;
    let raw = observations::load_observations(&config.observations_path)?;

    let cleaned = plant_map_ingest::clean::clean_observations(&raw, &config.target_group);
    let matched = match_observations(&parks, &Crs::wgs84(), &cleaned)?;
    let aggregates = aggregate_observations(&matched);

    Ok(PipelineOutput { parks, aggregates })
}

/// Renders histograms for every park that has aggregated observations.
///
/// Returns the number of artifacts written. Per-species render failures
/// are already isolated inside the chart crate; this never fails the
/// run.
pub fn render_all_histograms(output: &PipelineOutput, config: &PipelineConfig) -> usize {
    let mut park_names: Vec<&str> = output
        .aggregates
        .iter()
        .map(|r| r.park_name.as_str())
        .collect();
    park_names.sort_unstable();
    park_names.dedup();

    let mut written = 0;
    for park_name in park_names {
        written += plant_map_chart::render_park_histograms(
            &output.aggregates,
            park_name,
            &config.out_dir,
            config.histogram_min_observations,
        )
        .len();
    }

    log::info!("Rendered {written} histogram artifacts under {}", config.out_dir.display());
    written
}

/// Runs the full pipeline and writes the map document to
/// `<out_dir>/map.geojson`.
///
/// # Errors
///
/// Returns an error if the pipeline fails or the document cannot be
/// written.
pub fn generate_map_document(
    output: &PipelineOutput,
    config: &PipelineConfig,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let collection = document::assemble_feature_collection(
        &output.parks,
        &output.aggregates,
        &config.out_dir,
        config.map_histogram_min_observations,
    );

    std::fs::create_dir_all(&config.out_dir)?;
    let path = config.out_dir.join("map.geojson");
    let file = std::fs::File::create(&path)?;
    serde_json::to_writer(file, &collection)?;

    log::info!("Map document written: {}", path.display());
    Ok(path)
}

/// Returns true when a rendered histogram exists on disk for the pair.
///
/// Presence of the file is treated as "histogram available" with no
/// staleness check; a stale image from an earlier dataset is served
/// as-is.
#[must_use]
pub fn histogram_exists(out_dir: &Path, park_name: &str, scientific_name: &str) -> bool {
    plant_map_chart::histogram_path(out_dir, park_name, scientific_name).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new(tag: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "plant_map_generate_{tag}_{}",
                std::process::id()
            ));
            std::fs::create_dir_all(&path).unwrap();
            Self(path)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    const OBS_HEADER: &str = "iconic_taxon_name,taxon_id,scientific_name,common_name,place_guess,latitude,longitude,observed_on,image_url";

    fn obs_row(lat: f64, lng: f64, observed_on: &str, image: &str) -> String {
        format!(
            "Plantae,54327,Quercus alba,white oak,Lincoln Park,{lat},{lng},{observed_on},{image}"
        )
    }

    /// Spec'd end-to-end case: one park covering a bounding box, three
    /// observations inside across two months, one outside any polygon.
    #[test]
    fn lincoln_park_end_to_end() {
        let dir = TempDir::new("e2e");

        let parks_path = dir.0.join("parks.geojson");
        std::fs::write(
            &parks_path,
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature",
                 "properties": {"label": "Lincoln Park", "park_no": "1"},
                 "geometry": {"type": "Polygon",
                              "coordinates": [[[-87.65, 41.90], [-87.60, 41.90],
                                               [-87.60, 41.95], [-87.65, 41.95],
                                               [-87.65, 41.90]]]}}]}"#,
        )
        .unwrap();

        let observations_path = dir.0.join("observations.csv");
        let csv = format!(
            "{OBS_HEADER}\n{}\n{}\n{}\n{}\n",
            obs_row(41.92, -87.63, "2021-01-05", "a.jpg"),
            obs_row(41.93, -87.62, "2021-01-20", "b.jpg"),
            obs_row(41.91, -87.64, "2021-02-10", "c.jpg"),
            // Same species, outside the park: must not appear anywhere.
            obs_row(42.50, -88.50, "2021-03-01", "d.jpg"),
        );
        std::fs::write(&observations_path, csv).unwrap();

        let config = PipelineConfig::new(&parks_path, &observations_path, dir.0.join("static"));
        let output = run_pipeline(&config).unwrap();

        assert_eq!(output.aggregates.len(), 1);
        let rec = &output.aggregates[0];
        assert_eq!(rec.park_name, "Lincoln Park");
        assert_eq!(rec.scientific_name, "Quercus alba");
        assert_eq!(rec.observation_count, 3);
        assert_eq!(rec.observed_dates_distinct, vec!["2021-01", "2021-02"]);
        // Most recent in-park observation supplies the image.
        assert_eq!(rec.representative_image.as_deref(), Some("c.jpg"));

        let collection = document::assemble_feature_collection(
            &output.parks,
            &output.aggregates,
            &config.out_dir,
            config.map_histogram_min_observations,
        );
        let serialized = serde_json::to_string(&collection).unwrap();
        assert!(!serialized.contains("2021-03"));
    }

    #[test]
    fn missing_dataset_aborts_the_run() {
        let dir = TempDir::new("missing");
        let config = PipelineConfig::new(
            dir.0.join("no-such-parks.geojson"),
            dir.0.join("no-such-observations.csv"),
            dir.0.join("static"),
        );

        assert!(matches!(run_pipeline(&config), Err(LoadError::Io(_))));
    }

    #[test]
    fn rerunning_is_deterministic() {
        let dir = TempDir::new("determinism");

        let parks_path = dir.0.join("parks.geojson");
        std::fs::write(
            &parks_path,
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature",
                 "properties": {"label": "Lincoln Park", "park_no": "1"},
                 "geometry": {"type": "Polygon",
                              "coordinates": [[[-87.65, 41.90], [-87.60, 41.90],
                                               [-87.60, 41.95], [-87.65, 41.95],
                                               [-87.65, 41.90]]]}}]}"#,
        )
        .unwrap();
        let observations_path = dir.0.join("observations.csv");
        std::fs::write(
            &observations_path,
            format!("{OBS_HEADER}\n{}\n", obs_row(41.92, -87.63, "2021-01-05", "a.jpg")),
        )
        .unwrap();

        let config = PipelineConfig::new(&parks_path, &observations_path, dir.0.join("static"));
        let first = run_pipeline(&config).unwrap();
        let second = run_pipeline(&config).unwrap();

        assert_eq!(first.aggregates, second.aggregates);
        let first_labels: Vec<&str> =
            first.parks.parks.iter().map(|p| p.label.as_str()).collect();
        let second_labels: Vec<&str> =
            second.parks.parks.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(first_labels, second_labels);
    }
}

