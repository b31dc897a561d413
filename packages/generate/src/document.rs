//! Map document assembly.
//!
//! Merges park geometry and properties with the aggregated observation
//! statistics into one `GeoJSON` feature per park, wrapped in a
//! `FeatureCollection`. Each feature carries its observation summaries
//! as a foreign member, sorted by observation count descending, with a
//! histogram URL attached only when the count clears the map gate and
//! the rendered file actually exists on disk.

use std::path::Path;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, feature::Id};
use plant_map_observation_models::AggregateRecord;
use plant_map_park_models::{ParkDataset, ParkPolygon};
use serde_json::{Value, json};

/// Assembles the full map-ready feature collection.
///
/// Features appear in park-label order (the order the loader produced);
/// feature ids are sequential indices into that order.
#[must_use]
pub fn assemble_feature_collection(
    parks: &ParkDataset,
    aggregates: &[AggregateRecord],
    out_dir: &Path,
    map_histogram_min: usize,
) -> FeatureCollection {
    let features = parks
        .parks
        .iter()
        .enumerate()
        .map(|(index, park)| park_feature(index, park, aggregates, out_dir, map_histogram_min))
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn park_feature(
    index: usize,
    park: &ParkPolygon,
    aggregates: &[AggregateRecord],
    out_dir: &Path,
    map_histogram_min: usize,
) -> Feature {
    let mut park_aggregates: Vec<&AggregateRecord> = aggregates
        .iter()
        .filter(|r| r.park_no == park.park_no)
        .collect();
    // Stable sort: equal counts keep aggregator (group-key) order.
    park_aggregates.sort_by(|a, b| b.observation_count.cmp(&a.observation_count));

    let observations: Vec<Value> = park_aggregates
        .iter()
        .map(|record| observation_summary(record, out_dir, map_histogram_min))
        .collect();

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("observations".to_string(), Value::Array(observations));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&park.geometry))),
        id: Some(Id::Number(index.into())),
        properties: Some(park_properties(park)),
        foreign_members: Some(foreign_members),
    }
}

fn park_properties(park: &ParkPolygon) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert("label".to_string(), json!(park.label));
    props.insert("park_class".to_string(), json!(park.park_class));
    props.insert("park_no".to_string(), json!(park.park_no));
    props.insert("nature_bird".to_string(), json!(park.amenities.nature_bird));
    props.insert(
        "nature_center".to_string(),
        json!(park.amenities.nature_center),
    );
    props.insert(
        "conservatory".to_string(),
        json!(park.amenities.conservatory),
    );
    props.insert("wetland_ar".to_string(), json!(park.amenities.wetland_area));
    props.insert("lagoon".to_string(), json!(park.amenities.lagoon));
    props.insert(
        "wheelchr_a".to_string(),
        json!(park.amenities.wheelchair_access),
    );
    props
}

fn observation_summary(
    record: &AggregateRecord,
    out_dir: &Path,
    map_histogram_min: usize,
) -> Value {
    let histogram_url = if record.observation_count >= map_histogram_min
        && plant_map_chart::histogram_path(out_dir, &record.park_name, &record.scientific_name)
            .exists()
    {
        Value::String(plant_map_chart::histogram_url(
            &record.park_name,
            &record.scientific_name,
        ))
    } else {
        Value::Null
    };

    json!({
        "taxon_id": record.taxon_id,
        "iconic_taxon_name": record.iconic_taxon_name,
        "scientific_name": record.scientific_name,
        "common_name": record.common_name,
        "observation_count": record.observation_count,
        "observed_dates": record.observed_dates.join(", "),
        "observed_dates_distinct": record.observed_dates_distinct.join(", "),
        "image_url": record.representative_image,
        "histogram_url": histogram_url,
    })
}
