#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index for park attribution.
//!
//! Builds an R-tree over park boundary polygons and answers
//! point-in-park lookups with a bounding-box prefilter followed by an
//! exact, boundary-inclusive intersects test. The matcher attributes
//! each cleaned observation to every park containing its point; a point
//! inside overlapping parks fans out to one match per park.

use chrono::Datelike;
use geo::{Intersects, MultiPolygon};
use plant_map_ingest::LoadError;
use plant_map_observation_models::{MatchedObservation, ObservationRecord, month_year_token};
use plant_map_park_models::{Crs, ParkDataset, ParkPolygon};
use rstar::{AABB, RTree, RTreeObject};

/// A park polygon stored in the R-tree with its identifying metadata.
struct ParkEntry {
    park_no: String,
    label: String,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for ParkEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Pre-built spatial index over one park boundary dataset.
///
/// Constructed once per pipeline run and read-only afterwards.
pub struct ParkIndex {
    parks: RTree<ParkEntry>,
}

impl ParkIndex {
    /// Bulk-loads the R-tree from loaded park polygons.
    #[must_use]
    pub fn build(parks: &[ParkPolygon]) -> Self {
        let entries: Vec<ParkEntry> = parks
            .iter()
            .map(|park| ParkEntry {
                park_no: park.park_no.clone(),
                label: park.label.clone(),
                envelope: compute_envelope(&park.geometry),
                polygon: park.geometry.clone(),
            })
            .collect();

        log::info!("Built park spatial index over {} polygons", entries.len());

        Self {
            parks: RTree::bulk_load(entries),
        }
    }

    /// Returns `(park_no, label)` for every park containing the point.
    ///
    /// Containment is boundary-inclusive (intersects predicate). Parks
    /// can overlap, so zero, one, or several results are all possible.
    #[must_use]
    pub fn lookup_parks(&self, lng: f64, lat: f64) -> Vec<(&str, &str)> {
        let point = geo::Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.parks
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.polygon.intersects(&point))
            .map(|entry| (entry.park_no.as_str(), entry.label.as_str()))
            .collect()
    }
}

/// Attributes cleaned observations to the parks containing them.
///
/// Observations outside every park are dropped; observations inside
/// overlapping parks produce one [`MatchedObservation`] per park.
/// Records still missing a species identity (taxon id, scientific or
/// common name) are skipped, since they cannot participate in the
/// per-species grouping downstream.
///
/// # Errors
///
/// Returns [`LoadError::Crs`] when the observation CRS and the park
/// dataset CRS differ; no predicate is evaluated across mismatched
/// reference systems.
pub fn match_observations(
    parks: &ParkDataset,
    observation_crs: &Crs,
    cleaned: &[ObservationRecord],
) -> Result<Vec<MatchedObservation>, LoadError> {
    if parks.crs != *observation_crs {
        return Err(LoadError::crs(format!(
            "observation CRS {observation_crs} does not match park dataset CRS {}",
            parks.crs
        )));
    }

    let index = ParkIndex::build(&parks.parks);
    let mut matched = Vec::new();

    for record in cleaned {
        let (Some(lat), Some(lng), Some(observed_on)) =
            (record.latitude, record.longitude, record.observed_on)
        else {
            continue;
        };
        let (Some(taxon_id), Some(scientific_name), Some(common_name), Some(group)) = (
            record.taxon_id,
            record.scientific_name.as_deref(),
            record.common_name.as_deref(),
            record.iconic_taxon_name.as_deref(),
        ) else {
            log::debug!("Skipping observation without full species identity");
            continue;
        };

        for (park_no, park_name) in index.lookup_parks(lng, lat) {
            matched.push(MatchedObservation {
                park_no: park_no.to_string(),
                park_name: park_name.to_string(),
                taxon_id,
                scientific_name: scientific_name.to_string(),
                common_name: common_name.to_string(),
                iconic_taxon_name: group.to_string(),
                place_guess: record.place_guess.clone().unwrap_or_default(),
                latitude: lat,
                longitude: lng,
                observed_on,
                year: observed_on.year(),
                month_year: month_year_token(observed_on),
                image_url: record.image_url.clone(),
            });
        }
    }

    log::info!(
        "Matched {} observation/park pairs from {} cleaned records",
        matched.len(),
        cleaned.len()
    );

    Ok(matched)
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    use geo::BoundingRect;

    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}
