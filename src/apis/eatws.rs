//! Read-only client for the Geoscience Australia earthquake WFS service.
//!
//! Every query is a WFS `GetFeature` request returning GeoJSON. The trace
//! diagram is a PNG served from a separate CDN.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::app::ports::{HttpClientPort, HttpGetResult};
use crate::config::EatwsConfig;
use crate::error::{GenQuakemlError, Result};

const EVENTS_LAYER: &str = "earthquakes:earthquakes";
const FOCAL_MECHANISM_LAYER: &str = "earthquakes:earthquakes_focal_mechanism";
const SHAKEMAP_LAYER: &str = "earthquakes:shakemap";
const FELT_REPORTS_LAYER: &str = "earthquakes:earthquakes_felt_reports";
const STATIONS_LAYER: &str = "earthquakes:earthquakes_stations";
const MAGNITUDES_LAYER: &str = "earthquakes:earthquakes_magnitude";

const TRACE_DIAGRAM_FILE: &str = "traces.png";

/// Everything the service knows about one event
#[derive(Debug, Clone, Serialize)]
pub struct EventInformation {
    pub event_details: Value,
    pub focal_mechanism_information: Value,
    pub shakemap_information: Value,
    pub felt_reports: Value,
    /// Where the trace diagram was saved, if the CDN had one
    pub trace_diagram: Option<PathBuf>,
    pub station_information: Value,
    pub magnitudes_information: Value,
}

pub struct EatwsClient<P: HttpClientPort> {
    http: P,
    base_url: String,
    cdn_url: String,
}

impl<P: HttpClientPort> EatwsClient<P> {
    pub fn new(http: P, config: &EatwsConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cdn_url: config.cdn_url.trim_end_matches('/').to_string(),
        }
    }

    fn feature_url(&self, layer: &str, filter: &str) -> String {
        format!(
            "{}?service=WFS&request=getfeature&typeNames={}&outputFormat=application/json&CQL_FILTER={}",
            self.base_url, layer, filter
        )
    }

    /// Australian events with a displayable magnitude in `[start, end]`
    pub fn event_list_url(&self, start: &NaiveDateTime, end: &NaiveDateTime) -> String {
        let filter = format!(
            "display_flag=%27Y%27%20AND%20located_in_australia=%27Y%27%20AND%20preferred_magnitude%3E=0%20AND%20preferred_magnitude%3C=9.94%20AND%20origin_time%20BETWEEN%20{}Z%20AND%20{}Z",
            start.format("%Y-%m-%dT%H:%M:%S"),
            end.format("%Y-%m-%dT%H:%M:%S")
        );
        self.feature_url(EVENTS_LAYER, &filter)
    }

    pub fn focal_mechanism_url(&self, earthquake_id: &str) -> String {
        self.feature_url(FOCAL_MECHANISM_LAYER, &format!("earthquake_id={}", earthquake_id))
    }

    pub fn shakemap_url(&self, event_id: &str) -> String {
        self.feature_url(SHAKEMAP_LAYER, &format!("event_id=%27{}%27", event_id))
    }

    pub fn felt_reports_url(&self, event_id: &str) -> String {
        self.feature_url(FELT_REPORTS_LAYER, &format!("event_id=%27{}%27", event_id))
    }

    pub fn stations_url(&self, earthquake_id: &str) -> String {
        self.feature_url(STATIONS_LAYER, &format!("earthquake_id={}", earthquake_id))
    }

    pub fn magnitudes_url(&self, earthquake_id: &str) -> String {
        self.feature_url(MAGNITUDES_LAYER, &format!("earthquake_id={}", earthquake_id))
    }

    pub fn trace_diagram_url(&self, event_id: &str) -> String {
        format!("{}/{}/{}", self.cdn_url, event_id, TRACE_DIAGRAM_FILE)
    }

    async fn get_ok(&self, url: &str) -> Result<HttpGetResult> {
        let response = self.http.get(url).await?;
        if !response.is_success() {
            return Err(GenQuakemlError::Api {
                message: format!("GET {} returned status {}", url, response.status),
            });
        }
        Ok(response)
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self.get_ok(url).await?;
        Ok(serde_json::from_slice(&response.bytes)?)
    }

    /// GeoJSON features for events between `start` and `end`
    pub async fn list_events(&self, start: &NaiveDateTime, end: &NaiveDateTime) -> Result<Vec<Value>> {
        let collection = self.get_json(&self.event_list_url(start, end)).await?;
        let features = match collection.get("features") {
            Some(Value::Array(features)) => features.clone(),
            _ => {
                return Err(GenQuakemlError::Api {
                    message: "event list response has no 'features' array".to_string(),
                })
            }
        };
        info!("Found {} event(s) between {} and {}", features.len(), start, end);
        Ok(features)
    }

    pub async fn focal_mechanism(&self, earthquake_id: &str) -> Result<Value> {
        self.get_json(&self.focal_mechanism_url(earthquake_id)).await
    }

    pub async fn shakemap(&self, event_id: &str) -> Result<Value> {
        self.get_json(&self.shakemap_url(event_id)).await
    }

    pub async fn felt_reports(&self, event_id: &str) -> Result<Value> {
        self.get_json(&self.felt_reports_url(event_id)).await
    }

    pub async fn stations(&self, earthquake_id: &str) -> Result<Value> {
        self.get_json(&self.stations_url(earthquake_id)).await
    }

    pub async fn magnitudes(&self, earthquake_id: &str) -> Result<Value> {
        self.get_json(&self.magnitudes_url(earthquake_id)).await
    }

    /// Save the trace diagram into `directory`. A diagram the CDN does not
    /// have is logged and skipped.
    pub async fn save_trace_diagram(&self, event_id: &str, directory: &Path) -> Result<Option<PathBuf>> {
        let url = self.trace_diagram_url(event_id);
        let response = self.http.get(&url).await?;
        if !response.is_success() {
            warn!("No trace diagram for {} (status {})", event_id, response.status);
            return Ok(None);
        }
        let path = directory.join(TRACE_DIAGRAM_FILE);
        tokio::fs::write(&path, &response.bytes).await?;
        info!("Trace diagram saved to {}", path.display());
        Ok(Some(path))
    }

    /// Gather everything about one listed event
    #[instrument(skip(self, event_details, trace_directory))]
    pub async fn event_information(&self, event_details: Value, trace_directory: &Path) -> Result<EventInformation> {
        let earthquake_id = property(&event_details, "earthquake_id")?;
        let event_id = property(&event_details, "event_id")?;
        debug!("Collecting details for event {} (earthquake {})", event_id, earthquake_id);

        info!("Getting focal mechanism information");
        let focal_mechanism_information = self.focal_mechanism(&earthquake_id).await?;
        info!("Getting shakemap information");
        let shakemap_information = self.shakemap(&event_id).await?;
        info!("Getting felt reports");
        let felt_reports = self.felt_reports(&event_id).await?;
        info!("Getting trace diagram");
        let trace_diagram = self.save_trace_diagram(&event_id, trace_directory).await?;
        info!("Getting station information");
        let station_information = self.stations(&earthquake_id).await?;
        info!("Getting magnitudes information");
        let magnitudes_information = self.magnitudes(&earthquake_id).await?;

        Ok(EventInformation {
            event_details,
            focal_mechanism_information,
            shakemap_information,
            felt_reports,
            trace_diagram,
            station_information,
            magnitudes_information,
        })
    }

    /// Details for the first event listed between `start` and `end`, or
    /// `None` when the window is empty
    pub async fn fetch_event_information(
        &self,
        start: &NaiveDateTime,
        end: &NaiveDateTime,
        trace_directory: &Path,
    ) -> Result<Option<EventInformation>> {
        let mut events = self.list_events(start, end).await?;
        if events.is_empty() {
            return Ok(None);
        }
        let first = events.swap_remove(0);
        self.event_information(first, trace_directory).await.map(Some)
    }
}

/// A GeoJSON feature property as text; ids come back as numbers or strings
fn property(feature: &Value, name: &str) -> Result<String> {
    match feature.get("properties").and_then(|p| p.get(name)) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Number(value)) => Ok(value.to_string()),
        _ => Err(GenQuakemlError::Api {
            message: format!("feature has no '{}' property", name),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct Unreachable;

    #[async_trait]
    impl HttpClientPort for Unreachable {
        async fn get(&self, url: &str) -> Result<HttpGetResult> {
            Err(GenQuakemlError::Api {
                message: format!("unexpected request to {}", url),
            })
        }
    }

    fn client() -> EatwsClient<Unreachable> {
        EatwsClient::new(Unreachable, &EatwsConfig::default())
    }

    fn instant(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 6, day)
            .unwrap()
            .and_hms_opt(9, 27, 0)
            .unwrap()
    }

    #[test]
    fn test_event_list_url_window() {
        let url = client().event_list_url(&instant(23), &instant(24));
        assert!(url.starts_with("https://earthquakes.ga.gov.au/geoserver/earthquakes/wfs?service=WFS"));
        assert!(url.contains("typeNames=earthquakes:earthquakes&"));
        assert!(url.ends_with("origin_time%20BETWEEN%202021-06-23T09:27:00Z%20AND%202021-06-24T09:27:00Z"));
    }

    #[test]
    fn test_per_event_urls() {
        let client = client();
        assert!(client
            .focal_mechanism_url("12345")
            .ends_with("typeNames=earthquakes:earthquakes_focal_mechanism&outputFormat=application/json&CQL_FILTER=earthquake_id=12345"));
        assert!(client.shakemap_url("ga2021abc").ends_with("CQL_FILTER=event_id=%27ga2021abc%27"));
        assert!(client.felt_reports_url("ga2021abc").contains("earthquakes_felt_reports"));
        assert!(client.stations_url("12345").contains("earthquakes_stations"));
        assert!(client.magnitudes_url("12345").contains("earthquakes_magnitude"));
        assert_eq!(
            client.trace_diagram_url("ga2021abc"),
            "https://cdn.eatws.net/skip/events/ga2021abc/traces.png"
        );
    }

    #[test]
    fn test_property_accepts_numbers_and_strings() {
        let feature = serde_json::json!({
            "properties": { "earthquake_id": 12345, "event_id": "ga2021abc" }
        });
        assert_eq!(property(&feature, "earthquake_id").unwrap(), "12345");
        assert_eq!(property(&feature, "event_id").unwrap(), "ga2021abc");
        assert!(property(&feature, "missing").is_err());
    }
}
