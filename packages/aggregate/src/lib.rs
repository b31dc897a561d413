#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-(park, species) observation aggregation.
//!
//! An explicit grouping-and-folding pass over matched observations.
//! Groups are keyed by park and species identity; within a group two
//! independent orders exist and must not be conflated: a stable
//! date-descending sort determines the representative ("most recent")
//! image, while the `observed_dates` lists are sorted ascending as
//! strings.

use std::collections::BTreeMap;

use plant_map_observation_models::{AggregateRecord, GroupKey, MatchedObservation};

/// Folds matched observations into one [`AggregateRecord`] per
/// (park, species) group.
///
/// Output group order follows the sorted group key and is deterministic,
/// but is not contractually meaningful; callers that need a particular
/// order re-sort.
#[must_use]
pub fn aggregate_observations(matched: &[MatchedObservation]) -> Vec<AggregateRecord> {
    let mut groups: BTreeMap<GroupKey, Vec<&MatchedObservation>> = BTreeMap::new();
    for observation in matched {
        groups
            .entry(observation.group_key())
            .or_default()
            .push(observation);
    }

    let records: Vec<AggregateRecord> = groups
        .into_iter()
        .map(|(key, group)| fold_group(key, group))
        .collect();

    log::info!(
        "Aggregated {} matched observations into {} (park, species) groups",
        matched.len(),
        records.len()
    );

    records
}

fn fold_group(key: GroupKey, mut group: Vec<&MatchedObservation>) -> AggregateRecord {
    // Stable date-descending sort: ties keep original input order, so
    // the representative image is the first-seen among the most recent.
    group.sort_by(|a, b| b.observed_on.cmp(&a.observed_on));
    let representative_image = group
        .first()
        .and_then(|most_recent| most_recent.image_url.clone());

    let mut observed_dates: Vec<String> =
        group.iter().map(|obs| obs.month_year.clone()).collect();
    observed_dates.sort();

    let mut observed_dates_distinct = observed_dates.clone();
    observed_dates_distinct.dedup();

    AggregateRecord {
        park_no: key.park_no,
        park_name: key.park_name,
        taxon_id: key.taxon_id,
        scientific_name: key.scientific_name,
        common_name: key.common_name,
        iconic_taxon_name: key.iconic_taxon_name,
        observation_count: observed_dates.len(),
        observed_dates,
        observed_dates_distinct,
        representative_image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn matched(
        park_no: &str,
        scientific_name: &str,
        date: (i32, u32, u32),
        image: &str,
    ) -> MatchedObservation {
        let observed_on = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        MatchedObservation {
            park_no: park_no.to_string(),
            park_name: format!("Park {park_no}"),
            taxon_id: 54327,
            scientific_name: scientific_name.to_string(),
            common_name: "white oak".to_string(),
            iconic_taxon_name: "Plantae".to_string(),
            place_guess: "Chicago".to_string(),
            latitude: 41.9,
            longitude: -87.6,
            observed_on,
            year: date.0,
            month_year: plant_map_observation_models::month_year_token(observed_on),
            image_url: Some(image.to_string()),
        }
    }

    #[test]
    fn count_equals_observed_dates_len() {
        let input = vec![
            matched("1", "Quercus alba", (2021, 1, 5), "a"),
            matched("1", "Quercus alba", (2021, 1, 20), "b"),
            matched("1", "Quercus alba", (2021, 2, 3), "c"),
        ];

        let records = aggregate_observations(&input);
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.observation_count, rec.observed_dates.len());
        assert_eq!(rec.observed_dates, vec!["2021-01", "2021-01", "2021-02"]);
        assert_eq!(rec.observed_dates_distinct, vec!["2021-01", "2021-02"]);
    }

    #[test]
    fn representative_image_is_most_recent() {
        let input = vec![
            matched("1", "Quercus alba", (2021, 1, 5), "older"),
            matched("1", "Quercus alba", (2021, 3, 1), "newest"),
            matched("1", "Quercus alba", (2021, 2, 3), "middle"),
        ];

        let records = aggregate_observations(&input);
        assert_eq!(records[0].representative_image.as_deref(), Some("newest"));
    }

    #[test]
    fn representative_tie_break_keeps_input_order() {
        let input = vec![
            matched("1", "Quercus alba", (2021, 3, 1), "first-seen"),
            matched("1", "Quercus alba", (2021, 3, 1), "second-seen"),
        ];

        let records = aggregate_observations(&input);
        assert_eq!(
            records[0].representative_image.as_deref(),
            Some("first-seen")
        );
    }

    #[test]
    fn groups_split_by_park_and_species() {
        let input = vec![
            matched("1", "Quercus alba", (2021, 1, 5), "a"),
            matched("2", "Quercus alba", (2021, 1, 5), "b"),
            matched("1", "Acer rubrum", (2021, 1, 5), "c"),
        ];

        let records = aggregate_observations(&input);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.observation_count == 1));
    }

    #[test]
    fn input_order_does_not_change_output() {
        let mut input = vec![
            matched("2", "Quercus alba", (2021, 1, 5), "b"),
            matched("1", "Acer rubrum", (2021, 2, 5), "c"),
            matched("1", "Quercus alba", (2021, 3, 5), "a"),
        ];

        let forward = aggregate_observations(&input);
        input.reverse();
        let reversed = aggregate_observations(&input);
        assert_eq!(forward, reversed);
    }
}
