use tracing::debug;

use super::xml_document::XmlDocument;
use super::{CatalogSerializer, NamespaceMap, OutputFormat};
use crate::constants::{ANSS_CATALOG_PREFIX, QUAKEML_BED_NAMESPACE, QUAKEML_NAMESPACE};
use crate::domain::{
    Arrival, Catalog, Event, Magnitude, Origin, OriginQuality, OriginUncertainty, Pick,
};
use crate::error::{GenQuakemlError, Result};

/// QuakeML 1.2 BED documents with the ANSS catalog attributes on each event
#[derive(Debug, Clone, Copy)]
pub struct QuakeMlSerializer {
    pub indent: bool,
}

impl Default for QuakeMlSerializer {
    fn default() -> Self {
        Self { indent: true }
    }
}

impl CatalogSerializer for QuakeMlSerializer {
    fn format(&self) -> OutputFormat {
        OutputFormat::QuakeMl
    }

    fn serialize(&self, catalog: &Catalog, namespaces: &NamespaceMap) -> Result<Vec<u8>> {
        if namespaces.uri(ANSS_CATALOG_PREFIX).is_none() {
            return Err(GenQuakemlError::Serialization(format!(
                "namespace prefix '{}' is not declared",
                ANSS_CATALOG_PREFIX
            )));
        }

        let mut declared: Vec<(&str, &str)> = vec![("q", QUAKEML_NAMESPACE)];
        declared.extend(namespaces.iter());

        let mut doc = XmlDocument::new(self.indent);
        doc.start_root("q:quakeml", QUAKEML_BED_NAMESPACE, &declared, &[])?;
        doc.start("eventParameters", &[("publicID", catalog.resource_id.as_str())])?;
        doc.optional_text("description", catalog.description.as_deref())?;
        doc.creation_info(&catalog.creation_info)?;
        for event in &catalog.events {
            write_event(&mut doc, event)?;
        }
        doc.end()?;
        doc.end()?;

        let bytes = doc.finish();
        debug!("Serialized {} event(s) as QuakeML ({} bytes)", catalog.events.len(), bytes.len());
        Ok(bytes)
    }
}

fn write_event(doc: &mut XmlDocument, event: &Event) -> Result<()> {
    let anss: Vec<(String, &str)> = event
        .anss
        .pairs()
        .iter()
        .map(|(name, value)| (format!("{}:{}", ANSS_CATALOG_PREFIX, name), *value))
        .collect();
    let mut attributes: Vec<(&str, &str)> = vec![("publicID", event.resource_id.as_str())];
    attributes.extend(anss.iter().map(|(name, value)| (name.as_str(), *value)));

    doc.start("event", &attributes)?;
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
    for pick in &event.picks {
        write_pick(doc, pick)?;
    }
    for origin in &event.origins {
        write_origin(doc, origin)?;
    }
    for magnitude in &event.magnitudes {
        write_magnitude(doc, magnitude)?;
    }
    doc.end()
}

fn write_pick(doc: &mut XmlDocument, pick: &Pick) -> Result<()> {
    doc.start("pick", &[("publicID", pick.resource_id.as_str())])?;
    doc.time_quantity("time", &pick.time)?;

    let stream = &pick.waveform_id;
    let mut codes = vec![
        ("networkCode", stream.network_code.as_str()),
        ("stationCode", stream.station_code.as_str()),
    ];
    if let Some(location) = &stream.location_code {
        codes.push(("locationCode", location.as_str()));
    }
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

fn write_origin(doc: &mut XmlDocument, origin: &Origin) -> Result<()> {
    doc.start("origin", &[("publicID", origin.resource_id.as_str())])?;
    if let Some(time) = &origin.time {
        doc.time_quantity("time", time)?;
    }
    doc.real_quantity("latitude", &origin.latitude)?;
    doc.real_quantity("longitude", &origin.longitude)?;
    doc.real_quantity("depth", &origin.depth)?;
    doc.optional_text("depthType", origin.depth_type.as_ref().map(|d| d.as_str()))?;
    write_quality(doc, &origin.quality)?;
    write_uncertainty(doc, &origin.origin_uncertainty)?;
    doc.optional_text("evaluationMode", origin.evaluation_mode.map(|m| m.as_str()))?;
    doc.optional_text("evaluationStatus", origin.evaluation_status.map(|s| s.as_str()))?;
    doc.creation_info(&origin.creation_info)?;
    for arrival in &origin.arrivals {
        write_arrival(doc, arrival)?;
    }
    doc.end()
}

fn write_quality(doc: &mut XmlDocument, quality: &OriginQuality) -> Result<()> {
    if quality.is_empty() {
        return Ok(());
    }
    doc.start("quality", &[])?;
    doc.optional_count("associatedPhaseCount", quality.associated_phase_count)?;
    doc.optional_count("usedPhaseCount", quality.used_phase_count)?;
    doc.optional_count("usedStationCount", quality.used_station_count)?;
    doc.optional_number("standardError", quality.standard_error)?;
    doc.optional_number("azimuthalGap", quality.azimuthal_gap)?;
    doc.optional_number("minimumDistance", quality.minimum_distance)?;
    doc.optional_number("maximumDistance", quality.maximum_distance)?;
    doc.end()
}

fn write_uncertainty(doc: &mut XmlDocument, uncertainty: &OriginUncertainty) -> Result<()> {
    if uncertainty.is_empty() {
        return Ok(());
    }
    doc.start("originUncertainty", &[])?;
    doc.optional_number("horizontalUncertainty", uncertainty.horizontal_uncertainty)?;
    doc.optional_number("minHorizontalUncertainty", uncertainty.min_horizontal_uncertainty)?;
    doc.optional_number("maxHorizontalUncertainty", uncertainty.max_horizontal_uncertainty)?;
    doc.optional_number(
        "azimuthMaxHorizontalUncertainty",
        uncertainty.azimuth_max_horizontal_uncertainty,
    )?;
    doc.optional_text("preferredDescription", uncertainty.preferred_description.as_deref())?;
    doc.end()
}

fn write_arrival(doc: &mut XmlDocument, arrival: &Arrival) -> Result<()> {
    doc.start("arrival", &[("publicID", arrival.resource_id.as_str())])?;
    doc.text("pickID", &arrival.pick_id)?;
    doc.text("phase", &arrival.phase)?;
    doc.optional_number("azimuth", arrival.azimuth)?;
    doc.optional_number("distance", arrival.distance)?;
    doc.optional_number("timeResidual", arrival.time_residual)?;
    doc.optional_number("timeWeight", arrival.time_weight)?;
    doc.creation_info(&arrival.creation_info)?;
    doc.end()
}

fn write_magnitude(doc: &mut XmlDocument, magnitude: &Magnitude) -> Result<()> {
    doc.start("magnitude", &[("publicID", magnitude.resource_id.as_str())])?;
    doc.real_quantity("mag", &magnitude.mag)?;
    doc.text("type", magnitude.magnitude_type.as_str())?;
    doc.text("originID", &magnitude.origin_id)?;
    doc.optional_count("stationCount", magnitude.station_count)?;
    doc.optional_text("evaluationMode", magnitude.evaluation_mode.map(|m| m.as_str()))?;
    doc.optional_text("evaluationStatus", magnitude.evaluation_status.map(|s| s.as_str()))?;
    doc.creation_info(&magnitude.creation_info)?;
    doc.end()
}
