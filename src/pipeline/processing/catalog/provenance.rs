use chrono::{DateTime, Utc};

use crate::config::ProvenanceConfig;
use crate::constants::{AGENCY_ID, AUTHOR, CREATION_TIME};
use crate::domain::CreationInfo;
use crate::error::Result;
use crate::pipeline::processing::derive::parse_instant;
use crate::types::EventRecord;

/// Builds the creation info shared by every entity of a run. Author and
/// agency fall back to configured defaults; the creation time must already
/// have been derived.
pub struct ProvenanceBuilder<'a> {
    defaults: &'a ProvenanceConfig,
}

impl<'a> ProvenanceBuilder<'a> {
    pub fn new(defaults: &'a ProvenanceConfig) -> Self {
        Self { defaults }
    }

    pub fn creation_info(&self, record: &EventRecord) -> Result<CreationInfo> {
        let creation_time: DateTime<Utc> =
            parse_instant(CREATION_TIME, record.require(CREATION_TIME)?)?;

        Ok(CreationInfo {
            author: record
                .get_non_empty(AUTHOR)
                .map(str::to_string)
                .or_else(|| self.defaults.author.clone()),
            agency_id: record
                .get_non_empty(AGENCY_ID)
                .map(str::to_string)
                .or_else(|| self.defaults.agency_id.clone()),
            creation_time,
        })
    }

    /// Creation info for a pick attributed to a different author or agency
    pub fn with_overrides(
        &self,
        base: &CreationInfo,
        author: Option<&str>,
        agency_id: Option<&str>,
    ) -> CreationInfo {
        CreationInfo {
            author: author.map(str::to_string).or_else(|| base.author.clone()),
            agency_id: agency_id.map(str::to_string).or_else(|| base.agency_id.clone()),
            creation_time: base.creation_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_values_win_over_defaults() {
        let defaults = ProvenanceConfig {
            author: Some("default author".to_string()),
            agency_id: Some("GA".to_string()),
        };
        let record: EventRecord = [
            ("author", "duty seismologist"),
            ("creation_time", "2021-06-24T00:00:00.000000Z"),
        ]
        .into_iter()
        .collect();

        let info = ProvenanceBuilder::new(&defaults).creation_info(&record).unwrap();
        assert_eq!(info.author.as_deref(), Some("duty seismologist"));
        assert_eq!(info.agency_id.as_deref(), Some("GA"));
    }

    #[test]
    fn test_missing_creation_time_is_error() {
        let defaults = ProvenanceConfig::default();
        let err = ProvenanceBuilder::new(&defaults)
            .creation_info(&EventRecord::new())
            .unwrap_err();
        assert_eq!(err.field(), Some("creation_time"));
    }
}
