#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Plant observation record types.
//!
//! Each pipeline stage consumes one record type and produces the next:
//! the loader emits [`ObservationRecord`], the spatial matcher emits
//! [`MatchedObservation`], and the aggregator emits [`AggregateRecord`].
//! Records are never mutated in place; every stage builds a new derived
//! set.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A raw crowdsourced observation row, one per sighting.
///
/// All fields that individual rows routinely omit are `Option`; the
/// cleaner decides which rows survive, not the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    /// Broad taxonomic group (e.g. `"Plantae"`).
    pub iconic_taxon_name: Option<String>,
    /// Source taxon identifier.
    pub taxon_id: Option<i64>,
    /// Scientific (binomial) name.
    pub scientific_name: Option<String>,
    /// Common name.
    pub common_name: Option<String>,
    /// Free-text location guess entered by the observer.
    pub place_guess: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Date of the sighting.
    pub observed_on: Option<NaiveDate>,
    /// Reference to the observer's photo.
    pub image_url: Option<String>,
}

/// An observation attributed to the park that contains its point, with
/// the derived temporal fields used downstream.
///
/// A point inside overlapping parks yields one record per containing
/// park; downstream aggregation then counts it once per park. That
/// fan-out is accepted behavior, not corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedObservation {
    pub park_no: String,
    pub park_name: String,
    pub taxon_id: i64,
    pub scientific_name: String,
    pub common_name: String,
    pub iconic_taxon_name: String,
    pub place_guess: String,
    pub latitude: f64,
    pub longitude: f64,
    pub observed_on: NaiveDate,
    /// Calendar year of the sighting.
    pub year: i32,
    /// Month-granularity bucket token, `YYYY-MM`.
    pub month_year: String,
    pub image_url: Option<String>,
}

impl MatchedObservation {
    /// The grouping key used by the aggregator.
    #[must_use]
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            park_no: self.park_no.clone(),
            park_name: self.park_name.clone(),
            taxon_id: self.taxon_id,
            scientific_name: self.scientific_name.clone(),
            common_name: self.common_name.clone(),
            iconic_taxon_name: self.iconic_taxon_name.clone(),
        }
    }
}

/// Formats a date as the `YYYY-MM` bucket token.
///
/// Lexicographic order of these tokens equals chronological order,
/// which the aggregator and histogram bucketing rely on.
#[must_use]
pub fn month_year_token(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// The (park, species) grouping key for aggregation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub park_no: String,
    pub park_name: String,
    pub taxon_id: i64,
    pub scientific_name: String,
    pub common_name: String,
    pub iconic_taxon_name: String,
}

/// Per-(park, species) aggregated observation statistics.
///
/// Invariants: `observation_count == observed_dates.len()`;
/// `observed_dates_distinct` is the deduplicated form of
/// `observed_dates`; both lists are sorted ascending as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub park_no: String,
    pub park_name: String,
    pub taxon_id: i64,
    pub scientific_name: String,
    pub common_name: String,
    pub iconic_taxon_name: String,
    /// Total matched observations in the group.
    pub observation_count: usize,
    /// One `YYYY-MM` token per observation, sorted ascending.
    pub observed_dates: Vec<String>,
    /// Distinct `YYYY-MM` tokens, sorted ascending.
    pub observed_dates_distinct: Vec<String>,
    /// Image of the most recently dated observation in the group.
    pub representative_image: Option<String>,
}

/// A user-submitted observation held in the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedObservation {
    pub scientific_name: String,
    pub common_name: String,
    pub observed_on: String,
    pub park_name: String,
    /// Public URL of the uploaded image, when one was provided.
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_year_token_zero_pads() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 7).unwrap();
        assert_eq!(month_year_token(date), "2021-03");
    }

    #[test]
    fn month_year_tokens_sort_chronologically() {
        let mut tokens = vec![
            month_year_token(NaiveDate::from_ymd_opt(2021, 12, 1).unwrap()),
            month_year_token(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()),
            month_year_token(NaiveDate::from_ymd_opt(2021, 2, 1).unwrap()),
        ];
        tokens.sort();
        assert_eq!(tokens, vec!["2021-02", "2021-12", "2022-01"]);
    }
}
