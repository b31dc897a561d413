//! Observation cleaning and filtering.
//!
//! Restricts raw records to the target taxonomic group, rejects rows
//! whose free-text location guess falls outside a conservative character
//! whitelist (a proxy for well-formed English entries), and drops rows
//! missing the observation date or coordinates. Inputs are never
//! mutated; the survivors are cloned into a new set.

use std::sync::LazyLock;

use plant_map_observation_models::ObservationRecord;
use regex::Regex;

/// The taxonomic group the pipeline targets.
pub const TARGET_TAXON_GROUP: &str = "Plantae";

/// Letters, digits, comma, period, hyphen, and space only.
static PLACE_GUESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9, .-]*$").expect("valid place-guess regex"));

/// Filters raw observations down to cleanable plant sightings.
///
/// A record survives when it names the target group, its `place_guess`
/// matches the whitelist (absent text is rejected, matching the
/// original `na=False` semantics), its date is present, and both
/// coordinates parsed.
#[must_use]
pub fn clean_observations(
    records: &[ObservationRecord],
    target_group: &str,
) -> Vec<ObservationRecord> {
    let cleaned: Vec<ObservationRecord> = records
        .iter()
        .filter(|r| is_clean(r, target_group))
        .cloned()
        .collect();

    log::info!(
        "Cleaned observations: {} of {} kept (group={target_group})",
        cleaned.len(),
        records.len()
    );

    cleaned
}

fn is_clean(record: &ObservationRecord, target_group: &str) -> bool {
    record.iconic_taxon_name.as_deref() == Some(target_group)
        && record
            .place_guess
            .as_deref()
            .is_some_and(|guess| PLACE_GUESS_RE.is_match(guess))
        && record.observed_on.is_some()
        && record.latitude.is_some()
        && record.longitude.is_some()
}
