//! SeisComP3 XML (schema 0.12) rendering.
//!
//! SC3ML keeps picks and origins as siblings of the event inside
//! `EventParameters`, nests magnitudes inside their origin, links the event
//! to its origin through `originReference` and states depth in kilometres.
//! It has no slot for the ANSS catalog attributes, so those are dropped.

use tracing::debug;

use super::xml_document::XmlDocument;
use super::{CatalogSerializer, NamespaceMap, OutputFormat};
use crate::constants::{SC3ML_NAMESPACE, SC3ML_VERSION};
use crate::domain::{Arrival, Catalog, Event, Magnitude, Origin, Pick, QuantityError, RealQuantity};
use crate::error::Result;

const METRES_PER_KM: f64 = 1000.0;

fn metres_to_km(quantity: &RealQuantity) -> RealQuantity {
    let scale = |v: f64| v / METRES_PER_KM;
    RealQuantity {
        value: scale(quantity.value),
        errors: QuantityError {
            uncertainty: quantity.errors.uncertainty.map(scale),
            lower_uncertainty: quantity.errors.lower_uncertainty.map(scale),
            upper_uncertainty: quantity.errors.upper_uncertainty.map(scale),
            confidence_level: quantity.errors.confidence_level,
        },
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sc3mlSerializer {
    pub indent: bool,
}

impl Default for Sc3mlSerializer {
    fn default() -> Self {
        Self { indent: true }
    }
}

impl CatalogSerializer for Sc3mlSerializer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Sc3ml
    }

    fn serialize(&self, catalog: &Catalog, namespaces: &NamespaceMap) -> Result<Vec<u8>> {
        if namespaces.iter().next().is_some() {
            debug!("SC3ML has no vendor attributes; extra namespaces ignored");
        }

        let mut doc = XmlDocument::new(self.indent);
        doc.start_root("seiscomp", SC3ML_NAMESPACE, &[], &[("version", SC3ML_VERSION)])?;
        doc.start("EventParameters", &[])?;
        for event in &catalog.events {
            for pick in &event.picks {
                write_pick(&mut doc, pick)?;
            }
            for origin in &event.origins {
                let magnitudes: Vec<&Magnitude> = event
                    .magnitudes
                    .iter()
                    .filter(|m| m.origin_id == origin.resource_id)
                    .collect();
                write_origin(&mut doc, origin, &magnitudes)?;
            }
            write_event(&mut doc, event)?;
        }
        doc.end()?;
        doc.end()?;

        let bytes = doc.finish();
        debug!("Serialized {} event(s) as SC3ML ({} bytes)", catalog.events.len(), bytes.len());
        Ok(bytes)
    }
}

fn write_pick(doc: &mut XmlDocument, pick: &Pick) -> Result<()> {
    doc.start("pick", &[("publicID", pick.resource_id.as_str())])?;
    doc.time_quantity("time", &pick.time)?;

    let stream = &pick.waveform_id;
    let mut codes = vec![
        ("networkCode", stream.network_code.as_str()),
        ("stationCode", stream.station_code.as_str()),
    ];
    codes.push(("locationCode", stream.location_code.as_deref().unwrap_or("")));
    if let Some(channel) = &stream.channel_code {
        codes.push(("channelCode", channel.as_str()));
    }
    doc.empty("waveformID", &codes)?;

    if let Some(backazimuth) = &pick.backazimuth {
        doc.real_quantity("backazimuth", backazimuth)?;
    }
    doc.optional_text("onset", pick.onset.map(|o| o.as_str()))?;
    doc.optional_text("polarity", pick.polarity.map(|p| p.as_str()))?;
    doc.optional_text("evaluationMode", pick.evaluation_mode.map(|m| m.as_str()))?;
    doc.text("phaseHint", &pick.phase_hint)?;
    doc.creation_info(&pick.creation_info)?;
    doc.end()
}

fn write_origin(doc: &mut XmlDocument, origin: &Origin, magnitudes: &[&Magnitude]) -> Result<()> {
    doc.start("origin", &[("publicID", origin.resource_id.as_str())])?;
    if let Some(time) = &origin.time {
        doc.time_quantity("time", time)?;
    }
    doc.real_quantity("latitude", &origin.latitude)?;
    doc.real_quantity("longitude", &origin.longitude)?;
    doc.real_quantity("depth", &metres_to_km(&origin.depth))?;
    doc.optional_text("depthType", origin.depth_type.as_ref().map(|d| d.as_str()))?;

    let quality = &origin.quality;
    if !quality.is_empty() {
        doc.start("quality", &[])?;
        doc.optional_count("associatedPhaseCount", quality.associated_phase_count)?;
        doc.optional_count("usedPhaseCount", quality.used_phase_count)?;
        doc.optional_count("usedStationCount", quality.used_station_count)?;
        doc.optional_number("standardError", quality.standard_error)?;
        doc.optional_number("azimuthalGap", quality.azimuthal_gap)?;
        doc.optional_number("minimumDistance", quality.minimum_distance)?;
        doc.optional_number("maximumDistance", quality.maximum_distance)?;
        doc.end()?;
    }

    let uncertainty = &origin.origin_uncertainty;
    if !uncertainty.is_empty() {
        doc.start("uncertainty", &[])?;
        doc.optional_number(
            "horizontalUncertainty",
            uncertainty.horizontal_uncertainty.map(|m| m / METRES_PER_KM),
        )?;
        doc.optional_text("preferredDescription", uncertainty.preferred_description.as_deref())?;
        doc.end()?;
    }

    doc.optional_text("evaluationMode", origin.evaluation_mode.map(|m| m.as_str()))?;
    doc.optional_text("evaluationStatus", origin.evaluation_status.map(|s| s.as_str()))?;
    doc.creation_info(&origin.creation_info)?;
    for arrival in &origin.arrivals {
        write_arrival(doc, arrival)?;
    }
    for magnitude in magnitudes {
        write_magnitude(doc, magnitude)?;
    }
    doc.end()
}

fn write_arrival(doc: &mut XmlDocument, arrival: &Arrival) -> Result<()> {
    // arrivals are identified by their pick in SC3ML
    doc.start("arrival", &[])?;
    doc.text("pickID", &arrival.pick_id)?;
    doc.text("phase", &arrival.phase)?;
    doc.optional_number("azimuth", arrival.azimuth)?;
    doc.optional_number("distance", arrival.distance)?;
    doc.optional_number("timeResidual", arrival.time_residual)?;
    doc.optional_number("weight", arrival.time_weight)?;
    doc.creation_info(&arrival.creation_info)?;
    doc.end()
}

fn write_magnitude(doc: &mut XmlDocument, magnitude: &Magnitude) -> Result<()> {
    doc.start("magnitude", &[("publicID", magnitude.resource_id.as_str())])?;
    doc.real_quantity("magnitude", &magnitude.mag)?;
    doc.text("type", magnitude.magnitude_type.as_str())?;
    doc.optional_count("stationCount", magnitude.station_count)?;
    doc.optional_text("evaluationMode", magnitude.evaluation_mode.map(|m| m.as_str()))?;
    doc.optional_text("evaluationStatus", magnitude.evaluation_status.map(|s| s.as_str()))?;
    doc.creation_info(&magnitude.creation_info)?;
    doc.end()
}

fn write_event(doc: &mut XmlDocument, event: &Event) -> Result<()> {
    doc.start("event", &[("publicID", event.resource_id.as_str())])?;
    doc.optional_text("preferredOriginID", event.preferred_origin_id.as_deref())?;
    doc.optional_text("preferredMagnitudeID", event.preferred_magnitude_id.as_deref())?;
    doc.text("type", event.event_type.as_str())?;
    doc.optional_text("typeCertainty", event.event_type_certainty.map(|c| c.as_str()))?;
    if let Some(region) = &event.description {
        doc.start("description", &[])?;
        doc.text("text", region)?;
        doc.text("type", "region name")?;
        doc.end()?;
    }
    doc.creation_info(&event.creation_info)?;
    for origin in &event.origins {
        doc.text("originReference", &origin.resource_id)?;
    }
    doc.end()
}
