//! Crowdsourced observation CSV loader.
//!
//! Deserializes the iNaturalist export into raw [`ObservationRecord`]s.
//! Field-level problems (unparseable coordinates, absent dates) are kept
//! as `None` for the cleaner to judge; only an unreadable file or a
//! structurally broken CSV is fatal.

use std::path::Path;

use chrono::NaiveDate;
use plant_map_observation_models::ObservationRecord;
use serde::Deserialize;

use crate::LoadError;

/// Columns the pipeline cannot run without. A file whose header lacks
/// any of these is a different dataset, not a degraded one, and loading
/// it would silently produce an empty map document.
const REQUIRED_COLUMNS: &[&str] = &[
    "iconic_taxon_name",
    "place_guess",
    "latitude",
    "longitude",
    "observed_on",
];

/// One raw CSV row, everything optional and stringly until parsed.
#[derive(Debug, Deserialize)]
struct RawRow {
    iconic_taxon_name: Option<String>,
    taxon_id: Option<String>,
    scientific_name: Option<String>,
    common_name: Option<String>,
    place_guess: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    observed_on: Option<String>,
    image_url: Option<String>,
}

/// Loads observation records from a CSV file.
///
/// Rows that fail to deserialize entirely (wrong column count, broken
/// quoting) are logged and skipped rather than failing the run.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be opened, its header
/// cannot be read, or the header is missing a required column.
pub fn load_observations(path: &Path) -> Result<Vec<ObservationRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(LoadError::missing_field(column, "observation CSV header"));
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in reader.deserialize::<RawRow>() {
        match row {
            Ok(raw) => records.push(to_record(raw)),
            Err(e) => {
                skipped += 1;
                log::debug!("Skipping malformed observation row: {e}");
            }
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} unreadable observation rows");
    }
    log::info!("Loaded {} observation records", records.len());

    Ok(records)
}

fn to_record(raw: RawRow) -> ObservationRecord {
    ObservationRecord {
        iconic_taxon_name: non_empty(raw.iconic_taxon_name),
        taxon_id: non_empty(raw.taxon_id).and_then(|s| s.parse().ok()),
        scientific_name: non_empty(raw.scientific_name),
        common_name: non_empty(raw.common_name),
        place_guess: raw.place_guess,
        latitude: non_empty(raw.latitude).and_then(|s| s.parse().ok()),
        longitude: non_empty(raw.longitude).and_then(|s| s.parse().ok()),
        observed_on: non_empty(raw.observed_on).and_then(|s| parse_observed_on(&s)),
        image_url: non_empty(raw.image_url),
    }
}

/// Parses an observation date, accepting the export's plain date format
/// and the datetime form some older exports carry.
#[must_use]
pub fn parse_observed_on(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(date);
    }
    None
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct TempCsv(PathBuf);

    impl TempCsv {
        fn new(contents: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "plant_map_obs_test_{}_{:?}.csv",
                std::process::id(),
                std::thread::current().id(),
            ));
            std::fs::write(&path, contents).unwrap();
            Self(path)
        }
    }

    impl Drop for TempCsv {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    const HEADER: &str = "iconic_taxon_name,taxon_id,scientific_name,common_name,place_guess,latitude,longitude,observed_on,image_url";

    #[test]
    fn loads_typed_records() {
        let file = TempCsv::new(&format!(
            "{HEADER}\nPlantae,54327,Quercus alba,white oak,Lincoln Park,41.92,-87.63,2021-06-14,https://img.example/1.jpg\n"
        ));

        let records = load_observations(&file.0).unwrap();
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.taxon_id, Some(54327));
        assert_eq!(rec.scientific_name.as_deref(), Some("Quercus alba"));
        assert_eq!(
            rec.observed_on,
            Some(NaiveDate::from_ymd_opt(2021, 6, 14).unwrap())
        );
        assert!((rec.latitude.unwrap() - 41.92).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_fields_become_none() {
        let file = TempCsv::new(&format!(
            "{HEADER}\nPlantae,not-a-number,Quercus alba,,Lincoln Park,garbage,-87.63,never,\n"
        ));

        let records = load_observations(&file.0).unwrap();
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.taxon_id, None);
        assert_eq!(rec.latitude, None);
        assert_eq!(rec.observed_on, None);
        assert_eq!(rec.common_name, None);
    }

    #[test]
    fn foreign_header_is_rejected() {
        // A file with some other schema must abort the run rather than
        // load as all-None rows the cleaner silently discards.
        let file = TempCsv::new("foo,bar,baz\n1,2,3\n4,5,6\n");

        let err = load_observations(&file.0).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingField { ref field, .. } if field == "iconic_taxon_name"
        ));
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let err = load_observations(Path::new("/nonexistent/observations.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Csv(_) | LoadError::Io(_)));
    }

    #[test]
    fn parses_datetime_variant() {
        assert_eq!(
            parse_observed_on("2020-05-01 13:45:00"),
            Some(NaiveDate::from_ymd_opt(2020, 5, 1).unwrap())
        );
        assert_eq!(parse_observed_on("05/01/2020"), None);
    }
}
