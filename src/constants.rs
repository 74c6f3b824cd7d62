/// Field names of the `key = value` input contract and the derived fields
/// the pipeline adds to the record. Keeping them here keeps the parser,
/// deriver and builder in agreement.

// ANSS catalog extension fields (attached to the event element)
pub const EVENTSOURCE: &str = "eventsource";
pub const DATAID: &str = "dataid";
pub const EVENTID: &str = "eventid";
pub const DATASOURCE: &str = "datasource";

// Event fields
pub const EVENT_TYPE: &str = "event_type";
pub const EVENT_TYPE_CERTAINTY: &str = "event_type_certainty";
pub const REGION: &str = "region";

// Origin fields
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const DEPTH: &str = "depth";
pub const DEPTH_UNCERTAINTY: &str = "depth_uncertainty";
pub const DEPTH_TYPE: &str = "depth_type";
pub const DATE: &str = "date";
pub const TIME: &str = "time";
pub const ORIGIN_TIME: &str = "origin_time";
pub const TIME_UNCERTAINTY: &str = "time_uncertainty";
pub const EVALUATION_MODE: &str = "evaluation_mode";
pub const EVALUATION_STATUS: &str = "evaluation_status";
pub const USED_PHASE_COUNT: &str = "used_phase_count";
pub const USED_STATION_COUNT: &str = "used_station_count";
pub const STANDARD_ERROR: &str = "standard_error";
pub const AZIMUTHAL_GAP: &str = "azimuthal_gap";
pub const MINIMUM_DISTANCE: &str = "minimum_distance";
pub const MAXIMUM_DISTANCE: &str = "maximum_distance";
pub const HORIZONTAL_UNCERTAINTY: &str = "horizontal_uncertainty";

// Magnitude fields
pub const MAGNITUDE: &str = "magnitude";
pub const MAGNITUDE_TYPE: &str = "magnitude_type";
pub const MAGNITUDE_UNCERTAINTY: &str = "magnitude_uncertainty";
pub const MAGNITUDE_STATION_COUNT: &str = "magnitude_station_count";
pub const MAGNITUDE_EVALUATION_MODE: &str = "magnitude_evaluation_mode";
pub const MAGNITUDE_EVALUATION_STATUS: &str = "magnitude_evaluation_status";

// Provenance fields
pub const AUTHOR: &str = "author";
pub const AGENCY_ID: &str = "agency_id";

// Derived fields
pub const EP_PID: &str = "epPid";
pub const EVENT_PID: &str = "event_pid";
pub const ORIGIN_PID: &str = "origin_pid";
pub const MAGNITUDE_PID: &str = "magnitude_pid";
pub const DEPTH_M: &str = "depth_m";
pub const DEPTH_UNCERTAINTY_M: &str = "depth_uncertainty_m";
pub const HORIZONTAL_UNCERTAINTY_M: &str = "horizontal_uncertainty_m";
pub const CREATION_TIME: &str = "creation_time";

// Per-pick field suffixes, used as `pick<N>_<suffix>`
pub const PICK_PREFIX: &str = "pick";
pub const PICK_ID: &str = "id";
pub const PICK_NETWORK: &str = "network";
pub const PICK_STATION: &str = "station";
pub const PICK_CHANNEL: &str = "channel";
pub const PICK_LOCATION: &str = "location";
pub const PICK_TIME: &str = "time";
pub const PICK_PHASE: &str = "phase";
pub const PICK_BACKAZIMUTH: &str = "backazimuth";
pub const PICK_ONSET: &str = "onset";
pub const PICK_POLARITY: &str = "polarity";
pub const PICK_EVALUATION_MODE: &str = "evaluation_mode";
pub const PICK_STATION_LATITUDE: &str = "station_latitude";
pub const PICK_STATION_LONGITUDE: &str = "station_longitude";
pub const PICK_RESIDUAL: &str = "residual";
pub const PICK_WEIGHT: &str = "weight";
pub const PICK_AUTHOR: &str = "author";
pub const PICK_AGENCY_ID: &str = "agency_id";

/// Every recognised pick suffix
pub const PICK_FIELDS: &[&str] = &[
    PICK_ID,
    PICK_NETWORK,
    PICK_STATION,
    PICK_CHANNEL,
    PICK_LOCATION,
    PICK_TIME,
    PICK_PHASE,
    PICK_BACKAZIMUTH,
    PICK_ONSET,
    PICK_POLARITY,
    PICK_EVALUATION_MODE,
    PICK_STATION_LATITUDE,
    PICK_STATION_LONGITUDE,
    PICK_RESIDUAL,
    PICK_WEIGHT,
    PICK_AUTHOR,
    PICK_AGENCY_ID,
];

/// Categorical fields whose values are compared case-insensitively.
/// Identifier and numeric fields must never appear here.
pub const CASE_FOLDED_FIELDS: &[&str] = &[
    EVENT_TYPE,
    EVENT_TYPE_CERTAINTY,
    MAGNITUDE_TYPE,
    EVALUATION_MODE,
    EVALUATION_STATUS,
    DEPTH_TYPE,
    MAGNITUDE_EVALUATION_MODE,
    MAGNITUDE_EVALUATION_STATUS,
];

/// Categorical per-pick suffixes. Phase hints stay as written: `P` and `p`
/// name different phases.
pub const CASE_FOLDED_PICK_FIELDS: &[&str] = &[PICK_ONSET, PICK_POLARITY, PICK_EVALUATION_MODE];

/// ANSS catalog extension namespace
pub const ANSS_CATALOG_NAMESPACE: &str = "http://anss.org/xmlns/catalog/0.1";
pub const ANSS_CATALOG_PREFIX: &str = "catalog";

pub const QUAKEML_NAMESPACE: &str = "http://quakeml.org/xmlns/quakeml/1.2";
pub const QUAKEML_BED_NAMESPACE: &str = "http://quakeml.org/xmlns/bed/1.2";
pub const SC3ML_NAMESPACE: &str = "http://geofon.gfz-potsdam.de/ns/seiscomp3-schema/0.12";
pub const SC3ML_VERSION: &str = "0.12";

/// Build the record key for a pick field, e.g. `pick_key(2, "station")` is `pick2_station`.
pub fn pick_key(index: u32, suffix: &str) -> String {
    format!("{}{}_{}", PICK_PREFIX, index, suffix)
}
