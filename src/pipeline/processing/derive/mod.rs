//! Field derivation: computes the fields the input does not supply directly.
//!
//! Every derived value is a deterministic function of fields already in the
//! record, except `creation_time` which records the wall clock.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::constants::*;
use crate::error::{GenQuakemlError, Result};
use crate::types::EventRecord;

pub mod time;

pub use time::{format_instant, parse_instant};

/// Uncertainties entered in kilometres and the metre fields derived from them
const KM_UNCERTAINTIES: &[(&str, &str)] = &[
    (DEPTH_UNCERTAINTY, DEPTH_UNCERTAINTY_M),
    (HORIZONTAL_UNCERTAINTY, HORIZONTAL_UNCERTAINTY_M),
];

pub struct FieldDeriver {
    /// Authority component of `smi:` resource ids
    pub authority: String,
}

impl FieldDeriver {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
        }
    }

    /// Derive every field, stamping `creation_time` with the current time
    pub fn derive<'r>(&self, record: &'r mut EventRecord) -> Result<&'r mut EventRecord> {
        self.derive_at(record, Utc::now())
    }

    /// Derive every field using `now` as the creation time
    pub fn derive_at<'r>(
        &self,
        record: &'r mut EventRecord,
        now: DateTime<Utc>,
    ) -> Result<&'r mut EventRecord> {
        self.derive_origin_time(record)?;
        self.derive_depth(record)?;
        self.derive_identifiers(record)?;
        record.insert(CREATION_TIME, format_instant(&now));
        info!(
            "Derived fields for event {}",
            record.get(EVENTID).unwrap_or("<unknown>")
        );
        Ok(record)
    }

    /// `date` + `time` become `origin_time`; a directly supplied
    /// `origin_time` is validated and rewritten in canonical form.
    fn derive_origin_time(&self, record: &mut EventRecord) -> Result<()> {
        let composed = match (record.get_non_empty(DATE), record.get_non_empty(TIME)) {
            (Some(date), Some(clock)) => Some(time::compose_instant(DATE, date, TIME, clock)?),
            (Some(_), None) => return Err(GenQuakemlError::validation(TIME, "date given without a time")),
            (None, Some(_)) => return Err(GenQuakemlError::validation(DATE, "time given without a date")),
            (None, None) => match record.get_non_empty(ORIGIN_TIME) {
                Some(raw) => Some(parse_instant(ORIGIN_TIME, raw)?),
                None => None,
            },
        };

        match composed {
            Some(instant) => {
                let formatted = format_instant(&instant);
                debug!("origin_time = {}", formatted);
                record.insert(ORIGIN_TIME, formatted);
            }
            None => debug!("No origin time supplied"),
        }
        Ok(())
    }

    /// Kilometres as entered become metres as exchanged
    fn derive_depth(&self, record: &mut EventRecord) -> Result<()> {
        let depth_km = record.require_f64(DEPTH)?;
        let depth_m = checked_km_to_m(DEPTH, depth_km)?;
        record.insert(DEPTH_M, depth_m.to_string());

        for (km_field, m_field) in KM_UNCERTAINTIES {
            if let Some(uncertainty_km) = record.optional_f64(km_field)? {
                if uncertainty_km < 0.0 {
                    return Err(GenQuakemlError::validation(
                        *km_field,
                        format!("'{}' must not be negative", uncertainty_km),
                    ));
                }
                let uncertainty_m = checked_km_to_m(km_field, uncertainty_km)?;
                record.insert(*m_field, uncertainty_m.to_string());
            }
        }
        Ok(())
    }

    fn derive_identifiers(&self, record: &mut EventRecord) -> Result<()> {
        let eventid = match record.get_non_empty(EVENTID) {
            Some(eventid) => eventid.to_string(),
            None => {
                let source = require_for(record, EVENTSOURCE, EVENTID)?;
                let origin_time = require_for(record, ORIGIN_TIME, EVENTID)?;
                let instant = parse_instant(ORIGIN_TIME, origin_time)?;
                format!("{}{}", source, instant.format("%Y%m%d%H%M%S"))
            }
        };
        record.insert(EVENTID, eventid.clone());

        if record.get_non_empty(DATAID).is_none() {
            let datasource = require_for(record, DATASOURCE, DATAID)?;
            let dataid = format!("{}{}", datasource, eventid);
            record.insert(DATAID, dataid);
        }

        let magnitude_type = require_for(record, MAGNITUDE_TYPE, MAGNITUDE_PID)?.to_string();

        let eventid = eventid.as_str();
        record.insert(EP_PID, self.resource_id("catalog", &[eventid]));
        record.insert(EVENT_PID, self.resource_id("event", &[eventid]));
        record.insert(ORIGIN_PID, self.resource_id("origin", &[eventid]));
        record.insert(
            MAGNITUDE_PID,
            self.resource_id("magnitude", &[eventid, magnitude_type.as_str()]),
        );
        Ok(())
    }

    pub fn resource_id(&self, kind: &str, parts: &[&str]) -> String {
        compose_resource_id(&self.authority, kind, parts)
    }
}

/// `smi:<authority>/<kind>/<part>/<part>...`
pub fn compose_resource_id(authority: &str, kind: &str, parts: &[&str]) -> String {
    let mut id = format!("smi:{}/{}", authority, kind);
    for part in parts {
        id.push('/');
        id.push_str(&sanitize_id_part(part));
    }
    id
}

fn km_to_m(km: f64) -> f64 {
    km * 1000.0
}

/// Fails naming `km_field` when the metre value overflows
fn checked_km_to_m(km_field: &str, km: f64) -> Result<f64> {
    let metres = km_to_m(km);
    if metres.is_finite() {
        Ok(metres)
    } else {
        Err(GenQuakemlError::validation(
            km_field,
            format!("'{}' km is out of range once converted to metres", km),
        ))
    }
}

/// Resource ids may not contain whitespace
fn sanitize_id_part(part: &str) -> String {
    part.trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

fn require_for<'a>(record: &'a EventRecord, source: &str, target: &str) -> Result<&'a str> {
    record.get_non_empty(source).ok_or_else(|| {
        GenQuakemlError::validation(source, format!("required to compose '{}'", target))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_record() -> EventRecord {
        [
            ("eventid", "ga2021abc"),
            ("eventsource", "ga"),
            ("datasource", "ga"),
            ("dataid", "ga2021abc"),
            ("depth", "10"),
            ("latitude", "-32.1"),
            ("longitude", "151.2"),
            ("magnitude", "4.5"),
            ("magnitude_type", "ml"),
            ("event_type", "earthquake"),
        ]
        .into_iter()
        .collect()
    }

    fn deriver() -> FieldDeriver {
        FieldDeriver::new("ga.gov.au")
    }

    #[test]
    fn test_depth_converted_to_metres() {
        let mut record = base_record();
        deriver().derive(&mut record).unwrap();
        assert_eq!(record.get("depth_m").unwrap().parse::<f64>().unwrap(), 10000.0);
    }

    #[test]
    fn test_fractional_depth_conversion() {
        for depth_km in [0.0, 0.001, 2.35, 33.3, 700.25, -1.5] {
            let mut record = base_record();
            record.insert("depth", depth_km.to_string());
            deriver().derive(&mut record).unwrap();
            let depth_m: f64 = record.get("depth_m").unwrap().parse().unwrap();
            assert!((depth_m - depth_km * 1000.0).abs() < f64::EPSILON * 1000.0);
        }
    }

    #[test]
    fn test_missing_depth_names_field() {
        let mut record = base_record();
        record.remove("depth");
        let err = deriver().derive(&mut record).unwrap_err();
        assert!(matches!(err, GenQuakemlError::Validation { .. }));
        assert_eq!(err.field(), Some("depth"));
    }

    #[test]
    fn test_uncertainties_converted_to_metres() {
        let mut record = base_record();
        record.insert("depth_uncertainty", "1.5");
        record.insert("horizontal_uncertainty", "0.25");
        deriver().derive(&mut record).unwrap();
        assert_eq!(record.get("depth_uncertainty_m"), Some("1500"));
        assert_eq!(record.get("horizontal_uncertainty_m"), Some("250"));
    }

    #[test]
    fn test_negative_uncertainty_rejected() {
        let mut record = base_record();
        record.insert("depth_uncertainty", "-1");
        let err = deriver().derive(&mut record).unwrap_err();
        assert_eq!(err.field(), Some("depth_uncertainty"));
    }

    #[test]
    fn test_depth_overflowing_metres_names_depth() {
        let mut record = base_record();
        record.insert("depth", "1e306");
        let err = deriver().derive(&mut record).unwrap_err();
        assert!(matches!(err, GenQuakemlError::Validation { .. }));
        assert_eq!(err.field(), Some("depth"));
        assert_eq!(record.get("depth_m"), None);

        let mut record = base_record();
        record.insert("horizontal_uncertainty", "1e307");
        let err = deriver().derive(&mut record).unwrap_err();
        assert_eq!(err.field(), Some("horizontal_uncertainty"));
    }

    #[test]
    fn test_non_numeric_depth_rejected() {
        let mut record = base_record();
        record.insert("depth", "shallow");
        let err = deriver().derive(&mut record).unwrap_err();
        assert_eq!(err.field(), Some("depth"));
    }

    #[test]
    fn test_identifiers_composed_from_eventid() {
        let mut record = base_record();
        deriver().derive(&mut record).unwrap();
        assert_eq!(record.get("epPid"), Some("smi:ga.gov.au/catalog/ga2021abc"));
        assert_eq!(record.get("event_pid"), Some("smi:ga.gov.au/event/ga2021abc"));
        assert_eq!(record.get("origin_pid"), Some("smi:ga.gov.au/origin/ga2021abc"));
        assert_eq!(record.get("magnitude_pid"), Some("smi:ga.gov.au/magnitude/ga2021abc/ml"));
    }

    #[test]
    fn test_eventid_and_dataid_derived_when_absent() {
        let mut record = base_record();
        record.remove("eventid");
        record.remove("dataid");
        record.insert("date", "2021-06-24");
        record.insert("time", "09:27:05");
        deriver().derive(&mut record).unwrap();
        assert_eq!(record.get("origin_time"), Some("2021-06-24T09:27:05.000000Z"));
        assert_eq!(record.get("eventid"), Some("ga20210624092705"));
        assert_eq!(record.get("dataid"), Some("gaga20210624092705"));
    }

    #[test]
    fn test_eventid_composition_names_first_missing_source() {
        let mut record = base_record();
        record.remove("eventid");
        record.remove("eventsource");
        let err = deriver().derive(&mut record).unwrap_err();
        assert_eq!(err.field(), Some("eventsource"));

        let mut record = base_record();
        record.remove("eventid");
        let err = deriver().derive(&mut record).unwrap_err();
        assert_eq!(err.field(), Some("origin_time"));
    }

    #[test]
    fn test_invalid_calendar_date_rejected() {
        let mut record = base_record();
        record.insert("date", "2021-02-30");
        record.insert("time", "01:02:03");
        let err = deriver().derive(&mut record).unwrap_err();
        assert_eq!(err.field(), Some("date"));
    }

    #[test]
    fn test_date_without_time_rejected() {
        let mut record = base_record();
        record.insert("date", "2021-02-03");
        let err = deriver().derive(&mut record).unwrap_err();
        assert_eq!(err.field(), Some("time"));
    }

    #[test]
    fn test_direct_origin_time_canonicalised() {
        let mut record = base_record();
        record.insert("origin_time", "2021-06-24 09:27:00");
        deriver().derive(&mut record).unwrap();
        assert_eq!(record.get("origin_time"), Some("2021-06-24T09:27:00.000000Z"));
    }

    #[test]
    fn test_derivation_is_idempotent_except_creation_time() {
        let first_clock = Utc.with_ymd_and_hms(2021, 6, 24, 0, 0, 0).unwrap();
        let second_clock = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();

        let mut record = base_record();
        record.insert("date", "2021-06-24");
        record.insert("time", "09:27:00.5");
        record.insert("depth_uncertainty", "1.5");
        record.insert("horizontal_uncertainty", "2");
        deriver().derive_at(&mut record, first_clock).unwrap();
        let once = record.clone();
        deriver().derive_at(&mut record, second_clock).unwrap();

        for (key, value) in once.iter() {
            if key == "creation_time" {
                assert_ne!(record.get(key), Some(value));
            } else {
                assert_eq!(record.get(key), Some(value), "field {} changed", key);
            }
        }
        assert_eq!(once.len(), record.len());
    }

    #[test]
    fn test_resource_id_replaces_whitespace() {
        assert_eq!(
            deriver().resource_id("magnitude", &["ga 1", "mb_lg"]),
            "smi:ga.gov.au/magnitude/ga_1/mb_lg"
        );
    }
}
