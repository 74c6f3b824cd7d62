use chrono::{DateTime, Utc};
use xml::writer::{EmitterConfig, EventWriter, XmlEvent};

use crate::domain::{CreationInfo, QuantityError, RealQuantity, TimeQuantity};
use crate::error::Result;
use crate::pipeline::processing::derive::format_instant;

/// Thin element-level wrapper over the xml-rs event writer
pub(crate) struct XmlDocument {
    writer: EventWriter<Vec<u8>>,
}

impl XmlDocument {
    pub fn new(indent: bool) -> Self {
        let writer = EmitterConfig::new()
            .perform_indent(indent)
            .create_writer(Vec::new());
        Self { writer }
    }

    /// Root element with namespace declarations
    pub fn start_root(
        &mut self,
        name: &str,
        default_namespace: &str,
        namespaces: &[(&str, &str)],
        attributes: &[(&str, &str)],
    ) -> Result<()> {
        let mut element = XmlEvent::start_element(name).default_ns(default_namespace);
        for (prefix, uri) in namespaces {
            element = element.ns(*prefix, *uri);
        }
        for (key, value) in attributes {
            element = element.attr(*key, value);
        }
        self.writer.write(element)?;
        Ok(())
    }

    pub fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let mut element = XmlEvent::start_element(name);
        for (key, value) in attributes {
            element = element.attr(*key, value);
        }
        self.writer.write(element)?;
        Ok(())
    }

    pub fn end(&mut self) -> Result<()> {
        self.writer.write(XmlEvent::end_element())?;
        Ok(())
    }

    /// Self-contained element with attributes only
    pub fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        self.start(name, attributes)?;
        self.end()
    }

    pub fn text(&mut self, name: &str, value: &str) -> Result<()> {
        self.start(name, &[])?;
        self.writer.write(XmlEvent::characters(value))?;
        self.end()
    }

    pub fn optional_text(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => self.text(name, value),
            None => Ok(()),
        }
    }

    pub fn number(&mut self, name: &str, value: f64) -> Result<()> {
        self.text(name, &value.to_string())
    }

    pub fn optional_number(&mut self, name: &str, value: Option<f64>) -> Result<()> {
        match value {
            Some(value) => self.number(name, value),
            None => Ok(()),
        }
    }

    pub fn optional_count(&mut self, name: &str, value: Option<u32>) -> Result<()> {
        match value {
            Some(value) => self.text(name, &value.to_string()),
            None => Ok(()),
        }
    }

    pub fn instant(&mut self, name: &str, value: &DateTime<Utc>) -> Result<()> {
        self.text(name, &format_instant(value))
    }

    /// `<name><value>..</value><uncertainty>..</uncertainty></name>`
    pub fn real_quantity(&mut self, name: &str, quantity: &RealQuantity) -> Result<()> {
        self.start(name, &[])?;
        self.number("value", quantity.value)?;
        self.quantity_errors(&quantity.errors)?;
        self.end()
    }

    pub fn time_quantity(&mut self, name: &str, quantity: &TimeQuantity) -> Result<()> {
        self.start(name, &[])?;
        self.instant("value", &quantity.value)?;
        self.quantity_errors(&quantity.errors)?;
        self.end()
    }

    fn quantity_errors(&mut self, errors: &QuantityError) -> Result<()> {
        self.optional_number("uncertainty", errors.uncertainty)?;
        self.optional_number("lowerUncertainty", errors.lower_uncertainty)?;
        self.optional_number("upperUncertainty", errors.upper_uncertainty)?;
        self.optional_number("confidenceLevel", errors.confidence_level)
    }

    pub fn creation_info(&mut self, info: &CreationInfo) -> Result<()> {
        self.start("creationInfo", &[])?;
        self.optional_text("agencyID", info.agency_id.as_deref())?;
        self.optional_text("author", info.author.as_deref())?;
        self.instant("creationTime", &info.creation_time)?;
        self.end()
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}
