//! Plain data records for the seismic event hierarchy.
//!
//! Every optional sub-field is represented explicitly (`None`,
//! `QuantityError::default()`, empty `Vec`) so a built event always has the
//! same shape no matter how much detail the input supplied.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod vocabulary;

pub use vocabulary::{
    EvaluationMode, EvaluationStatus, EventType, EventTypeCertainty, MagnitudeType,
    OriginDepthType, PickOnset, PickPolarity,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreationInfo {
    pub author: Option<String>,
    pub agency_id: Option<String>,
    pub creation_time: DateTime<Utc>,
}

/// Uncertainty attached to a measured quantity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuantityError {
    pub uncertainty: Option<f64>,
    pub lower_uncertainty: Option<f64>,
    pub upper_uncertainty: Option<f64>,
    pub confidence_level: Option<f64>,
}

impl QuantityError {
    pub fn symmetric(uncertainty: Option<f64>) -> Self {
        Self {
            uncertainty,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.uncertainty.is_none()
            && self.lower_uncertainty.is_none()
            && self.upper_uncertainty.is_none()
            && self.confidence_level.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealQuantity {
    pub value: f64,
    pub errors: QuantityError,
}

impl RealQuantity {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            errors: QuantityError::default(),
        }
    }

    pub fn with_uncertainty(value: f64, uncertainty: Option<f64>) -> Self {
        Self {
            value,
            errors: QuantityError::symmetric(uncertainty),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeQuantity {
    pub value: DateTime<Utc>,
    pub errors: QuantityError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveformStreamId {
    pub network_code: String,
    pub station_code: String,
    pub location_code: Option<String>,
    pub channel_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    pub resource_id: String,
    pub time: TimeQuantity,
    pub waveform_id: WaveformStreamId,
    pub backazimuth: Option<RealQuantity>,
    pub phase_hint: String,
    pub onset: Option<PickOnset>,
    pub polarity: Option<PickPolarity>,
    pub evaluation_mode: Option<EvaluationMode>,
    pub creation_info: CreationInfo,
}

/// Association of a pick with the origin it was used to locate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrival {
    pub resource_id: String,
    pub pick_id: String,
    pub phase: String,
    /// Degrees clockwise from north, origin to station
    pub azimuth: Option<f64>,
    /// Epicentral distance in degrees
    pub distance: Option<f64>,
    pub time_residual: Option<f64>,
    pub time_weight: Option<f64>,
    pub creation_info: CreationInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OriginQuality {
    pub associated_phase_count: Option<u32>,
    pub used_phase_count: Option<u32>,
    pub used_station_count: Option<u32>,
    pub standard_error: Option<f64>,
    pub azimuthal_gap: Option<f64>,
    pub minimum_distance: Option<f64>,
    pub maximum_distance: Option<f64>,
}

impl OriginQuality {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OriginUncertainty {
    /// Metres
    pub horizontal_uncertainty: Option<f64>,
    pub min_horizontal_uncertainty: Option<f64>,
    pub max_horizontal_uncertainty: Option<f64>,
    pub azimuth_max_horizontal_uncertainty: Option<f64>,
    pub preferred_description: Option<String>,
}

impl OriginUncertainty {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Origin {
    pub resource_id: String,
    pub time: Option<TimeQuantity>,
    pub latitude: RealQuantity,
    pub longitude: RealQuantity,
    /// Metres below sea level
    pub depth: RealQuantity,
    pub depth_type: Option<OriginDepthType>,
    pub evaluation_mode: Option<EvaluationMode>,
    pub evaluation_status: Option<EvaluationStatus>,
    pub quality: OriginQuality,
    pub origin_uncertainty: OriginUncertainty,
    pub arrivals: Vec<Arrival>,
    pub creation_info: CreationInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Magnitude {
    pub resource_id: String,
    pub mag: RealQuantity,
    pub magnitude_type: MagnitudeType,
    /// Resource id of the origin this magnitude was computed for
    pub origin_id: String,
    pub station_count: Option<u32>,
    pub evaluation_mode: Option<EvaluationMode>,
    pub evaluation_status: Option<EvaluationStatus>,
    pub creation_info: CreationInfo,
}

/// ANSS catalog extension attributes carried on the event element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnssAttributes {
    pub eventsource: String,
    pub dataid: String,
    pub eventid: String,
    pub datasource: String,
}

impl AnssAttributes {
    /// (attribute name, value) pairs in document order
    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("eventsource", self.eventsource.as_str()),
            ("dataid", self.dataid.as_str()),
            ("eventid", self.eventid.as_str()),
            ("datasource", self.datasource.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub resource_id: String,
    pub event_type: EventType,
    pub event_type_certainty: Option<EventTypeCertainty>,
    /// Free-text region name
    pub description: Option<String>,
    pub preferred_origin_id: Option<String>,
    pub preferred_magnitude_id: Option<String>,
    pub picks: Vec<Pick>,
    pub origins: Vec<Origin>,
    pub magnitudes: Vec<Magnitude>,
    pub creation_info: CreationInfo,
    pub anss: AnssAttributes,
}

/// The unit handed to a serializer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub resource_id: String,
    pub description: Option<String>,
    pub creation_info: CreationInfo,
    pub events: Vec<Event>,
}
