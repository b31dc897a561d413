//! Park boundary loader.
//!
//! Reads a `GeoJSON` `FeatureCollection` of park polygons into
//! [`ParkPolygon`] records sorted ascending by display label. The
//! dataset CRS comes from the document's legacy `crs` member when
//! present, defaulting to the `GeoJSON`-standard WGS84 otherwise.

use std::fs;
use std::path::Path;

use geo::MultiPolygon;
use geojson::{FeatureCollection, GeoJson};
use plant_map_park_models::{Crs, ParkAmenities, ParkDataset, ParkPolygon};

use crate::LoadError;

/// Loads a park boundary dataset from a `GeoJSON` file.
///
/// # Errors
///
/// Returns [`LoadError`] if the file is unreadable, is not a
/// `FeatureCollection`, declares a malformed CRS, or contains a feature
/// missing its geometry, `label`, or `park_no`.
pub fn load_parks(path: &Path) -> Result<ParkDataset, LoadError> {
    let raw = fs::read_to_string(path)?;
    let geojson: GeoJson = raw.parse()?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(LoadError::missing_field(
            "features",
            "park boundary document (expected a FeatureCollection)",
        ));
    };

    let crs = declared_crs(&collection)?;
    let mut parks = Vec::with_capacity(collection.features.len());

    for feature in collection.features {
        let geometry = feature
            .geometry
            .ok_or_else(|| LoadError::missing_field("geometry", "park feature"))?;
        let geometry = to_multi_polygon(geometry)?;

        let props = feature
            .properties
            .ok_or_else(|| LoadError::missing_field("properties", "park feature"))?;

        let label = required_string(&props, "label")?;
        let park_no = required_string(&props, "park_no")?;

        parks.push(ParkPolygon {
            park_no,
            label,
            park_class: optional_string(&props, "park_class"),
            amenities: ParkAmenities {
                nature_bird: optional_string(&props, "nature_bir"),
                nature_center: optional_string(&props, "nature_cen"),
                conservatory: optional_string(&props, "conservato"),
                wetland_area: optional_string(&props, "wetland_ar"),
                lagoon: optional_string(&props, "lagoon"),
                wheelchair_access: optional_string(&props, "wheelchr_a"),
            },
            geometry,
        });
    }

    parks.sort_by(|a, b| a.label.cmp(&b.label));
    log::info!("Loaded {} parks ({crs})", parks.len());

    Ok(ParkDataset { crs, parks })
}

/// Extracts the dataset CRS from the legacy `crs` foreign member.
///
/// Absent member means the `GeoJSON` default (WGS84); a member that is
/// present but does not carry a name string is an error rather than a
/// silent default.
fn declared_crs(collection: &FeatureCollection) -> Result<Crs, LoadError> {
    let Some(member) = collection
        .foreign_members
        .as_ref()
        .and_then(|m| m.get("crs"))
    else {
        return Ok(Crs::wgs84());
    };

    let name = member
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| LoadError::crs("`crs` member present but has no name"))?;

    Ok(normalize_crs_name(name))
}

/// Normalizes the common URN spellings of WGS84 to `EPSG:4326`.
fn normalize_crs_name(name: &str) -> Crs {
    match name {
        "urn:ogc:def:crs:OGC:1.3:CRS84" | "urn:ogc:def:crs:EPSG::4326" | "CRS84" => Crs::wgs84(),
        other => {
            // "urn:ogc:def:crs:EPSG::3435" -> "EPSG:3435"
            other.strip_prefix("urn:ogc:def:crs:EPSG::").map_or_else(
                || Crs::new(other),
                |code| Crs::new(format!("EPSG:{code}")),
            )
        }
    }
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`], wrapping a
/// bare `Polygon`.
fn to_multi_polygon(geometry: geojson::Geometry) -> Result<MultiPolygon<f64>, LoadError> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Ok(mp),
        geo::Geometry::Polygon(p) => Ok(MultiPolygon(vec![p])),
        other => Err(LoadError::missing_field(
            "polygon geometry",
            &format!("park feature (found {})", geometry_kind(&other)),
        )),
    }
}

const fn geometry_kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
        geo::Geometry::Polygon(_) | geo::Geometry::MultiPolygon(_) => "Polygon",
    }
}

fn required_string(
    props: &geojson::JsonObject,
    field: &str,
) -> Result<String, LoadError> {
    optional_string(props, field).ok_or_else(|| LoadError::missing_field(field, "park feature"))
}

fn optional_string(props: &geojson::JsonObject, field: &str) -> Option<String> {
    props
        .get(field)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(contents: &str) -> temppath::TempPath {
        temppath::TempPath::new(contents)
    }

    /// Minimal tempfile helper; files are removed on drop.
    mod temppath {
        use std::path::PathBuf;

        pub struct TempPath(pub PathBuf);

        impl TempPath {
            pub fn new(contents: &str) -> Self {
                let path = std::env::temp_dir().join(format!(
                    "plant_map_parks_test_{}_{:?}.geojson",
                    std::process::id(),
                    std::thread::current().id(),
                ));
                std::fs::write(&path, contents).unwrap();
                Self(path)
            }
        }

        impl Drop for TempPath {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.0);
            }
        }
    }

    fn park_feature(label: &str, park_no: &str) -> String {
        format!(
            r#"{{"type": "Feature",
                 "properties": {{"label": "{label}", "park_no": "{park_no}",
                                 "park_class": "COMMUNITY PARK", "lagoon": "N"}},
                 "geometry": {{"type": "Polygon",
                               "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]}}}}"#
        )
    }

    #[test]
    fn loads_and_sorts_by_label() {
        let doc = format!(
            r#"{{"type": "FeatureCollection", "features": [{}, {}]}}"#,
            park_feature("Washington Park", "0030"),
            park_feature("Lincoln Park", "0021"),
        );
        let file = write_temp(&doc);

        let dataset = load_parks(&file.0).unwrap();
        assert_eq!(dataset.crs, Crs::wgs84());
        let labels: Vec<&str> = dataset.parks.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Lincoln Park", "Washington Park"]);
    }

    #[test]
    fn missing_label_is_load_error() {
        let doc = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature",
             "properties": {"park_no": "0021"},
             "geometry": {"type": "Polygon",
                          "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}}]}"#;
        let file = write_temp(doc);

        let err = load_parks(&file.0).unwrap_err();
        assert!(matches!(err, LoadError::MissingField { ref field, .. } if field == "label"));
    }

    #[test]
    fn unreadable_path_is_io_error() {
        let err = load_parks(Path::new("/nonexistent/parks.geojson")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn malformed_crs_member_is_crs_error() {
        let doc = format!(
            r#"{{"type": "FeatureCollection", "crs": {{"type": "name"}}, "features": [{}]}}"#,
            park_feature("Lincoln Park", "0021"),
        );
        let file = write_temp(&doc);

        let err = load_parks(&file.0).unwrap_err();
        assert!(matches!(err, LoadError::Crs { .. }));
    }

    #[test]
    fn urn_crs_names_normalize() {
        assert_eq!(normalize_crs_name("urn:ogc:def:crs:OGC:1.3:CRS84"), Crs::wgs84());
        assert_eq!(
            normalize_crs_name("urn:ogc:def:crs:EPSG::3435").as_str(),
            "EPSG:3435"
        );
    }

    #[test]
    fn polygon_wraps_into_multipolygon() {
        let doc = format!(
            r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
            park_feature("Lincoln Park", "0021"),
        );
        let file = write_temp(&doc);

        let dataset = load_parks(&file.0).unwrap();
        assert_eq!(dataset.parks[0].geometry.0.len(), 1);
    }
}
