#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Park boundary record types.
//!
//! Defines the immutable [`ParkPolygon`] produced by the boundary loader
//! and consumed by the spatial matcher and feature assembler, plus the
//! coordinate reference system declaration attached to a boundary
//! dataset. Parks are loaded once per pipeline run and never mutated.

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// A coordinate reference system identifier, e.g. `"EPSG:4326"`.
///
/// Two geometries must share a CRS before any geometric predicate
/// between them is valid; the loaders enforce this at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs(String);

impl Crs {
    /// WGS84 geographic coordinates, the `GeoJSON` default.
    pub const WGS84: &'static str = "EPSG:4326";

    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    /// The `GeoJSON`-default WGS84 CRS.
    #[must_use]
    pub fn wgs84() -> Self {
        Self(Self::WGS84.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Amenity and accessibility flags carried on each park record.
///
/// Values are the source dataset's categorical strings (typically
/// `"Y"`/`"N"`), passed through to the map document untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkAmenities {
    /// Bird/nature sanctuary flag.
    pub nature_bird: Option<String>,
    /// Staffed nature center on site.
    pub nature_center: Option<String>,
    /// Conservatory building.
    pub conservatory: Option<String>,
    /// Designated wetland area.
    pub wetland_area: Option<String>,
    /// Lagoon.
    pub lagoon: Option<String>,
    /// Wheelchair accessible.
    pub wheelchair_access: Option<String>,
}

/// A single park boundary with its identifying properties.
///
/// Geometry is always held as a [`MultiPolygon`]; single-polygon parks
/// are wrapped at load time. The containing dataset's [`Crs`] applies
/// to every park it holds.
#[derive(Debug, Clone)]
pub struct ParkPolygon {
    /// Park district identifier (e.g. `"0021"`).
    pub park_no: String,
    /// Display name (`label` in the source dataset).
    pub label: String,
    /// Park classification category.
    pub park_class: Option<String>,
    /// Amenity flags.
    pub amenities: ParkAmenities,
    /// Boundary geometry in the dataset CRS.
    pub geometry: MultiPolygon<f64>,
}

impl ParkPolygon {
    /// Returns the park identifier.
    #[must_use]
    pub fn park_no(&self) -> &str {
        &self.park_no
    }

    /// Returns the display name.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A loaded park boundary dataset: every park plus the single CRS they
/// were declared in.
#[derive(Debug, Clone)]
pub struct ParkDataset {
    /// Declared (or defaulted) dataset CRS.
    pub crs: Crs,
    /// Parks sorted ascending by `label`.
    pub parks: Vec<ParkPolygon>,
}

impl ParkDataset {
    /// Looks up a park by its identifier.
    #[must_use]
    pub fn park_by_no(&self, park_no: &str) -> Option<&ParkPolygon> {
        self.parks.iter().find(|p| p.park_no == park_no)
    }
}
