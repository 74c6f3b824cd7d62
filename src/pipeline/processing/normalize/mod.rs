use tracing::debug;

use crate::constants::{CASE_FOLDED_FIELDS, CASE_FOLDED_PICK_FIELDS};
use crate::types::{split_pick_key, EventRecord};

/// Trait for normalizing a raw record in place before derivation
pub trait Normalizer {
    fn normalize<'r>(&self, record: &'r mut EventRecord) -> &'r mut EventRecord;
}

/// Lower-cases the values of an explicit list of categorical fields so later
/// comparisons are case-insensitive. Identifier and numeric fields keep the
/// case they were entered with.
#[derive(Debug, Clone)]
pub struct CaseNormalizer {
    /// Exact field names to fold
    pub fields: Vec<String>,
    /// Suffixes of `pick<N>_<suffix>` fields to fold
    pub pick_fields: Vec<String>,
}

impl CaseNormalizer {
    pub fn new() -> Self {
        Self {
            fields: CASE_FOLDED_FIELDS.iter().map(|s| s.to_string()).collect(),
            pick_fields: CASE_FOLDED_PICK_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Whether `key` is one of the configured categorical fields
    pub fn folds(&self, key: &str) -> bool {
        if self.fields.iter().any(|f| f == key) {
            return true;
        }
        match split_pick_key(key) {
            Some((_, suffix)) => self.pick_fields.iter().any(|f| f == suffix),
            None => false,
        }
    }
}

impl Default for CaseNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer for CaseNormalizer {
    fn normalize<'r>(&self, record: &'r mut EventRecord) -> &'r mut EventRecord {
        let keys: Vec<String> = record
            .keys()
            .filter(|key| self.folds(key))
            .map(str::to_string)
            .collect();

        for key in keys {
            if let Some(value) = record.get_mut(&key) {
                let folded = value.trim().to_lowercase();
                if *value != folded {
                    debug!("Normalized '{}': '{}' -> '{}'", key, value, folded);
                    *value = folded;
                }
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EventRecord {
        [
            ("eventid", "GA2021abc"),
            ("event_type", "EARTHQUAKE"),
            ("magnitude_type", "ML"),
            ("evaluation_status", " Preliminary "),
            ("depth", "10"),
            ("pick1_phase", "Pg"),
            ("pick1_onset", "Impulsive"),
            ("pick1_station", "ARMA"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_folds_only_categorical_fields() {
        let mut record = sample();
        CaseNormalizer::new().normalize(&mut record);

        assert_eq!(record.get("event_type"), Some("earthquake"));
        assert_eq!(record.get("magnitude_type"), Some("ml"));
        assert_eq!(record.get("evaluation_status"), Some("preliminary"));
        assert_eq!(record.get("pick1_onset"), Some("impulsive"));
        // identifiers and case-significant fields untouched
        assert_eq!(record.get("eventid"), Some("GA2021abc"));
        assert_eq!(record.get("pick1_phase"), Some("Pg"));
        assert_eq!(record.get("pick1_station"), Some("ARMA"));
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let mut record: EventRecord = [("depth", "10")].into_iter().collect();
        CaseNormalizer::new().normalize(&mut record);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("depth"), Some("10"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let normalizer = CaseNormalizer::new();
        let mut once = sample();
        normalizer.normalize(&mut once);
        let mut twice = once.clone();
        normalizer.normalize(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_inputs_differing_only_in_case_normalize_equal() {
        let normalizer = CaseNormalizer::new();
        let mut upper: EventRecord = [("event_type", "EARTHQUAKE"), ("depth_type", "Operator Assigned")]
            .into_iter()
            .collect();
        let mut lower: EventRecord = [("event_type", "earthquake"), ("depth_type", "operator assigned")]
            .into_iter()
            .collect();
        normalizer.normalize(&mut upper);
        normalizer.normalize(&mut lower);
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_field_list_excludes_identifiers() {
        let normalizer = CaseNormalizer::new();
        for key in ["eventid", "dataid", "eventsource", "datasource", "depth", "latitude", "pick1_phase"] {
            assert!(!normalizer.folds(key), "{} must keep its case", key);
        }
    }
}
