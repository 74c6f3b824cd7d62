//! Controlled vocabularies of the QuakeML basic event description.
//!
//! Values are parsed case-insensitively; underscores are accepted in place of
//! spaces so `quarry_blast` and `Quarry Blast` both name `quarry blast`.

use serde::Serialize;
use std::fmt;

use crate::error::{GenQuakemlError, Result};

fn canonical(raw: &str) -> String {
    raw.trim().to_lowercase().replace('_', " ")
}

fn unknown(field: &str, raw: &str, allowed: &[&str]) -> GenQuakemlError {
    GenQuakemlError::validation(
        field,
        format!("'{}' is not one of: {}", raw, allowed.join(", ")),
    )
}

pub const EVENT_TYPES: &[&str] = &[
    "not existing",
    "not reported",
    "earthquake",
    "anthropogenic event",
    "collapse",
    "cavity collapse",
    "mine collapse",
    "building collapse",
    "explosion",
    "accidental explosion",
    "chemical explosion",
    "controlled explosion",
    "experimental explosion",
    "industrial explosion",
    "mining explosion",
    "quarry blast",
    "road cut",
    "blasting levee",
    "nuclear explosion",
    "induced or triggered event",
    "rock burst",
    "reservoir loading",
    "fluid injection",
    "fluid extraction",
    "crash",
    "plane crash",
    "train crash",
    "boat crash",
    "other event",
    "atmospheric event",
    "sonic boom",
    "sonic blast",
    "acoustic noise",
    "thunder",
    "avalanche",
    "snow avalanche",
    "debris avalanche",
    "hydroacoustic event",
    "ice quake",
    "slide",
    "landslide",
    "rockslide",
    "meteorite",
    "volcanic eruption",
];

pub const DEPTH_TYPES: &[&str] = &[
    "from location",
    "from moment tensor inversion",
    "from modeling of broad-band p waveforms",
    "constrained by depth phases",
    "constrained by direct phases",
    "constrained by depth and direct phases",
    "operator assigned",
    "other",
];

/// QuakeML event type, always stored in its canonical lower-case form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EventType(String);

impl EventType {
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        let value = canonical(raw);
        if EVENT_TYPES.contains(&value.as_str()) {
            Ok(Self(value))
        } else {
            Err(unknown(field, raw, EVENT_TYPES))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How the origin depth was determined
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OriginDepthType(String);

impl OriginDepthType {
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        let value = canonical(raw);
        if DEPTH_TYPES.contains(&value.as_str()) {
            Ok(Self(value))
        } else {
            Err(unknown(field, raw, DEPTH_TYPES))
        }
    }

    /// The schema spells the P-wave variant with an upper-case P
    pub fn as_str(&self) -> &str {
        if self.0 == "from modeling of broad-band p waveforms" {
            "from modeling of broad-band P waveforms"
        } else {
            &self.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventTypeCertainty {
    Known,
    Suspected,
}

impl EventTypeCertainty {
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        match canonical(raw).as_str() {
            "known" => Ok(Self::Known),
            "suspected" => Ok(Self::Suspected),
            _ => Err(unknown(field, raw, &["known", "suspected"])),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Known => "known",
            Self::Suspected => "suspected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    Manual,
    Automatic,
}

impl EvaluationMode {
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        match canonical(raw).as_str() {
            "manual" => Ok(Self::Manual),
            "automatic" => Ok(Self::Automatic),
            _ => Err(unknown(field, raw, &["manual", "automatic"])),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automatic => "automatic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    Preliminary,
    Confirmed,
    Reviewed,
    Final,
    Rejected,
}

impl EvaluationStatus {
    const ALLOWED: &'static [&'static str] =
        &["preliminary", "confirmed", "reviewed", "final", "rejected"];

    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        match canonical(raw).as_str() {
            "preliminary" => Ok(Self::Preliminary),
            "confirmed" => Ok(Self::Confirmed),
            "reviewed" => Ok(Self::Reviewed),
            "final" => Ok(Self::Final),
            "rejected" => Ok(Self::Rejected),
            _ => Err(unknown(field, raw, Self::ALLOWED)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preliminary => "preliminary",
            Self::Confirmed => "confirmed",
            Self::Reviewed => "reviewed",
            Self::Final => "final",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PickOnset {
    Emergent,
    Impulsive,
    Questionable,
}

impl PickOnset {
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        match canonical(raw).as_str() {
            "emergent" => Ok(Self::Emergent),
            "impulsive" => Ok(Self::Impulsive),
            "questionable" => Ok(Self::Questionable),
            _ => Err(unknown(field, raw, &["emergent", "impulsive", "questionable"])),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergent => "emergent",
            Self::Impulsive => "impulsive",
            Self::Questionable => "questionable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PickPolarity {
    Positive,
    Negative,
    Undecidable,
}

impl PickPolarity {
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        match canonical(raw).as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "undecidable" => Ok(Self::Undecidable),
            _ => Err(unknown(field, raw, &["positive", "negative", "undecidable"])),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Undecidable => "undecidable",
        }
    }
}

/// Conventional spellings of common magnitude scales, keyed by lower case.
/// Once the input is case-folded `mb`/`mB` and `Ms`/`MS` can no longer be
/// told apart, so each key maps to the more common scale.
const MAGNITUDE_SCALES: &[(&str, &str)] = &[
    ("m", "M"),
    ("ml", "ML"),
    ("mlv", "MLv"),
    ("mla", "MLa"),
    ("mw", "Mw"),
    ("mww", "Mww"),
    ("mwp", "Mwp"),
    ("mwr", "Mwr"),
    ("mb", "mb"),
    ("mb_lg", "mb_Lg"),
    ("ms", "Ms"),
    ("ms_20", "Ms_20"),
    ("md", "Md"),
    ("mc", "Mc"),
    ("me", "Me"),
];

/// Magnitude scale label, e.g. `ML` or `Mw`. Labels missing from the scale
/// table are kept as given, which after case folding means lower case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MagnitudeType(String);

impl MagnitudeType {
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GenQuakemlError::missing(field));
        }
        let key = trimmed.to_lowercase();
        let label = MAGNITUDE_SCALES
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| trimmed.to_string());
        Ok(Self(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MagnitudeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_accepts_any_case_and_underscores() {
        let a = EventType::parse("event_type", "EARTHQUAKE").unwrap();
        let b = EventType::parse("event_type", "earthquake").unwrap();
        assert_eq!(a, b);
        assert_eq!(
            EventType::parse("event_type", "Quarry_Blast").unwrap().as_str(),
            "quarry blast"
        );
    }

    #[test]
    fn test_event_type_rejects_unknown_value() {
        let err = EventType::parse("event_type", "tremor party").unwrap_err();
        assert_eq!(err.field(), Some("event_type"));
    }

    #[test]
    fn test_magnitude_type_restores_conventional_case() {
        assert_eq!(MagnitudeType::parse("magnitude_type", "ml").unwrap().as_str(), "ML");
        assert_eq!(MagnitudeType::parse("magnitude_type", "MW").unwrap().as_str(), "Mw");
        assert_eq!(MagnitudeType::parse("magnitude_type", "mb_lg").unwrap().as_str(), "mb_Lg");
        assert_eq!(MagnitudeType::parse("magnitude_type", "Mjma").unwrap().as_str(), "Mjma");
    }

    #[test]
    fn test_folded_magnitude_types() {
        assert_eq!(MagnitudeType::parse("magnitude_type", "mjma").unwrap().as_str(), "mjma");
        assert_eq!(MagnitudeType::parse("magnitude_type", "mb").unwrap().as_str(), "mb");
        assert_eq!(MagnitudeType::parse("magnitude_type", "ms").unwrap().as_str(), "Ms");
    }

    #[test]
    fn test_depth_type_schema_spelling() {
        let depth_type =
            OriginDepthType::parse("depth_type", "from modeling of broad-band p waveforms").unwrap();
        assert_eq!(depth_type.as_str(), "from modeling of broad-band P waveforms");
        assert_eq!(
            OriginDepthType::parse("depth_type", "operator_assigned").unwrap().as_str(),
            "operator assigned"
        );
    }

    #[test]
    fn test_evaluation_status_rejects_typo() {
        assert!(EvaluationStatus::parse("evaluation_status", "prelim").is_err());
        assert_eq!(
            EvaluationStatus::parse("evaluation_status", "Reviewed").unwrap(),
            EvaluationStatus::Reviewed
        );
    }
}
