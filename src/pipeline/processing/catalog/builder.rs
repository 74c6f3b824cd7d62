use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::constants::*;
use crate::domain::*;
use crate::error::{GenQuakemlError, Result};
use crate::pipeline::processing::catalog::geodesy::distance_azimuth;
use crate::pipeline::processing::catalog::provenance::ProvenanceBuilder;
use crate::pipeline::processing::derive::{compose_resource_id, parse_instant};
use crate::types::{split_pick_key, EventRecord};

/// The event aggregate together with the creation info shared by all of
/// its entities
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltEvent {
    pub event: Event,
    pub creation_info: CreationInfo,
}

/// Assembles the entity graph from a normalized and derived record.
///
/// Construction follows the reference order: picks, then the origin (whose
/// arrivals point at the picks), then the magnitude (which points at the
/// origin), then the event holding all three.
pub struct EntityBuilder<'a> {
    config: &'a Config,
}

impl<'a> EntityBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn build(&self, record: &EventRecord) -> Result<BuiltEvent> {
        let creation_info = ProvenanceBuilder::new(&self.config.provenance).creation_info(record)?;

        let picks = self.build_picks(record, &creation_info)?;
        let origin = self.build_origin(record, &creation_info, &picks)?;
        let picks = picks.into_iter().map(|(_, pick)| pick).collect();
        let magnitude = self.build_magnitude(record, &creation_info, &origin)?;
        let event = self.build_event(record, &creation_info, picks, origin, magnitude)?;

        verify_references(&event)?;
        info!(
            "Built event {} with {} pick(s)",
            event.resource_id,
            event.picks.len()
        );
        Ok(BuiltEvent {
            event,
            creation_info,
        })
    }

    fn build_origin(
        &self,
        record: &EventRecord,
        creation_info: &CreationInfo,
        picks: &[(u32, Pick)],
    ) -> Result<Origin> {
        let latitude = require_in_range(record, LATITUDE, -90.0, 90.0)?;
        let longitude = require_in_range(record, LONGITUDE, -180.0, 180.0)?;
        let depth_m = record.require_f64(DEPTH_M)?;
        let resource_id = record.require(ORIGIN_PID)?.to_string();

        let time = match record.get_non_empty(ORIGIN_TIME) {
            Some(raw) => Some(TimeQuantity {
                value: parse_instant(ORIGIN_TIME, raw)?,
                errors: QuantityError::symmetric(non_negative(record, TIME_UNCERTAINTY)?),
            }),
            None => {
                warn!("No origin time given; origin {} will have no time", resource_id);
                None
            }
        };

        let arrivals = picks
            .iter()
            .map(|(index, pick)| self.build_arrival(record, *index, pick, latitude, longitude))
            .collect::<Result<Vec<_>>>()?;

        let quality = OriginQuality {
            associated_phase_count: (!arrivals.is_empty()).then_some(arrivals.len() as u32),
            used_phase_count: record.optional_u32(USED_PHASE_COUNT)?,
            used_station_count: record.optional_u32(USED_STATION_COUNT)?,
            standard_error: non_negative(record, STANDARD_ERROR)?,
            azimuthal_gap: optional_in_range(record, AZIMUTHAL_GAP, 0.0, 360.0)?,
            minimum_distance: non_negative(record, MINIMUM_DISTANCE)?,
            maximum_distance: non_negative(record, MAXIMUM_DISTANCE)?,
        };

        let horizontal_uncertainty = record.optional_f64(HORIZONTAL_UNCERTAINTY_M)?;
        let origin_uncertainty = OriginUncertainty {
            horizontal_uncertainty,
            preferred_description: horizontal_uncertainty.map(|_| "horizontal uncertainty".to_string()),
            ..OriginUncertainty::default()
        };

        Ok(Origin {
            resource_id,
            time,
            latitude: RealQuantity::new(latitude),
            longitude: RealQuantity::new(longitude),
            depth: RealQuantity::with_uncertainty(
                depth_m,
                record.optional_f64(DEPTH_UNCERTAINTY_M)?,
            ),
            depth_type: optional_parse(record, DEPTH_TYPE, OriginDepthType::parse)?,
            evaluation_mode: optional_parse(record, EVALUATION_MODE, EvaluationMode::parse)?,
            evaluation_status: optional_parse(record, EVALUATION_STATUS, EvaluationStatus::parse)?,
            quality,
            origin_uncertainty,
            arrivals,
            creation_info: creation_info.clone(),
        })
    }

    fn build_magnitude(
        &self,
        record: &EventRecord,
        creation_info: &CreationInfo,
        origin: &Origin,
    ) -> Result<Magnitude> {
        let value = record.require_f64(MAGNITUDE)?;
        let magnitude_type = MagnitudeType::parse(MAGNITUDE_TYPE, record.require(MAGNITUDE_TYPE)?)?;

        Ok(Magnitude {
            resource_id: record.require(MAGNITUDE_PID)?.to_string(),
            mag: RealQuantity::with_uncertainty(value, non_negative(record, MAGNITUDE_UNCERTAINTY)?),
            magnitude_type,
            origin_id: origin.resource_id.clone(),
            station_count: record.optional_u32(MAGNITUDE_STATION_COUNT)?,
            evaluation_mode: optional_parse(record, MAGNITUDE_EVALUATION_MODE, EvaluationMode::parse)?,
            evaluation_status: optional_parse(
                record,
                MAGNITUDE_EVALUATION_STATUS,
                EvaluationStatus::parse,
            )?,
            creation_info: creation_info.clone(),
        })
    }

    fn build_event(
        &self,
        record: &EventRecord,
        creation_info: &CreationInfo,
        picks: Vec<Pick>,
        origin: Origin,
        magnitude: Magnitude,
    ) -> Result<Event> {
        let event_type = EventType::parse(EVENT_TYPE, record.require(EVENT_TYPE)?)?;
        let event_type_certainty =
            optional_parse(record, EVENT_TYPE_CERTAINTY, EventTypeCertainty::parse)?
                .or(Some(EventTypeCertainty::Known));

        let anss = AnssAttributes {
            eventsource: record.require(EVENTSOURCE)?.to_string(),
            dataid: record.require(DATAID)?.to_string(),
            eventid: record.require(EVENTID)?.to_string(),
            datasource: record.require(DATASOURCE)?.to_string(),
        };

        Ok(Event {
            resource_id: record.require(EVENT_PID)?.to_string(),
            event_type,
            event_type_certainty,
            description: record.get_non_empty(REGION).map(str::to_string),
            preferred_origin_id: Some(origin.resource_id.clone()),
            preferred_magnitude_id: Some(magnitude.resource_id.clone()),
            picks,
            origins: vec![origin],
            magnitudes: vec![magnitude],
            creation_info: creation_info.clone(),
            anss,
        })
    }

    /// Picks keyed by the `pick<N>_` number they were read from
    fn build_picks(
        &self,
        record: &EventRecord,
        creation_info: &CreationInfo,
    ) -> Result<Vec<(u32, Pick)>> {
        for key in record.keys() {
            if let Some((_, suffix)) = split_pick_key(key) {
                if !PICK_FIELDS.contains(&suffix) {
                    warn!("Ignoring unrecognised pick field '{}'", key);
                }
            }
        }

        let eventid = record.require(EVENTID)?;
        let provenance = ProvenanceBuilder::new(&self.config.provenance);
        let mut seen = HashSet::new();
        let mut picks = Vec::new();

        for index in record.pick_indices() {
            let field = |suffix: &str| pick_key(index, suffix);
            let get = |suffix: &str| record.get_non_empty(&pick_key(index, suffix));

            let network = record.require(&field(PICK_NETWORK))?.to_string();
            let station = record.require(&field(PICK_STATION))?.to_string();
            let time_field = field(PICK_TIME);
            let time = parse_instant(&time_field, record.require(&time_field)?)?;
            let phase_hint = record.require(&field(PICK_PHASE))?.to_string();

            let resource_id = match get(PICK_ID) {
                Some(id) => id.to_string(),
                None => {
                    let number = index.to_string();
                    compose_resource_id(
                        &self.config.identifiers.authority,
                        "pick",
                        &[eventid, number.as_str()],
                    )
                }
            };
            if !seen.insert(resource_id.clone()) {
                return Err(GenQuakemlError::validation(
                    field(PICK_ID),
                    format!("duplicate pick id '{}'", resource_id),
                ));
            }

            let backazimuth = optional_in_range(record, &field(PICK_BACKAZIMUTH), 0.0, 360.0)?
                .map(RealQuantity::new);

            debug!("Pick {}: {}.{} {} at {}", index, network, station, phase_hint, time);
            picks.push((index, Pick {
                resource_id,
                time: TimeQuantity {
                    value: time,
                    errors: QuantityError::default(),
                },
                waveform_id: WaveformStreamId {
                    network_code: network,
                    station_code: station,
                    location_code: get(PICK_LOCATION).map(str::to_string),
                    channel_code: get(PICK_CHANNEL).map(str::to_string),
                },
                backazimuth,
                phase_hint,
                onset: optional_parse(record, &field(PICK_ONSET), PickOnset::parse)?,
                polarity: optional_parse(record, &field(PICK_POLARITY), PickPolarity::parse)?,
                evaluation_mode: optional_parse(
                    record,
                    &field(PICK_EVALUATION_MODE),
                    EvaluationMode::parse,
                )?,
                creation_info: provenance.with_overrides(
                    creation_info,
                    get(PICK_AUTHOR),
                    get(PICK_AGENCY_ID),
                ),
            }));
        }
        Ok(picks)
    }

    fn build_arrival(
        &self,
        record: &EventRecord,
        index: u32,
        pick: &Pick,
        origin_latitude: f64,
        origin_longitude: f64,
    ) -> Result<Arrival> {
        let lat_field = pick_key(index, PICK_STATION_LATITUDE);
        let lon_field = pick_key(index, PICK_STATION_LONGITUDE);
        let station_latitude = optional_in_range(record, &lat_field, -90.0, 90.0)?;
        let station_longitude = optional_in_range(record, &lon_field, -180.0, 180.0)?;
        let (azimuth, distance) = match (station_latitude, station_longitude) {
            (Some(lat), Some(lon)) => {
                let geo = distance_azimuth(origin_latitude, origin_longitude, lat, lon);
                (Some(geo.azimuth_deg), Some(geo.distance_deg))
            }
            (None, None) => (None, None),
            (Some(_), None) => return Err(GenQuakemlError::missing(lon_field)),
            (None, Some(_)) => return Err(GenQuakemlError::missing(lat_field)),
        };

        let time_residual = record.optional_f64(&pick_key(index, PICK_RESIDUAL))?;
        let time_weight = record.optional_f64(&pick_key(index, PICK_WEIGHT))?;

        Ok(Arrival {
            resource_id: format!("{}_arrival", pick.resource_id),
            pick_id: pick.resource_id.clone(),
            phase: pick.phase_hint.clone(),
            azimuth,
            distance,
            time_residual,
            time_weight,
            creation_info: pick.creation_info.clone(),
        })
    }
}

/// Every reference inside the event must point at an entity built in this run
pub fn verify_references(event: &Event) -> Result<()> {
    let origin_ids: HashSet<&str> = event.origins.iter().map(|o| o.resource_id.as_str()).collect();
    let pick_ids: HashSet<&str> = event.picks.iter().map(|p| p.resource_id.as_str()).collect();
    let magnitude_ids: HashSet<&str> =
        event.magnitudes.iter().map(|m| m.resource_id.as_str()).collect();

    for magnitude in &event.magnitudes {
        if !origin_ids.contains(magnitude.origin_id.as_str()) {
            return Err(GenQuakemlError::validation(
                MAGNITUDE_PID,
                format!("magnitude references unknown origin '{}'", magnitude.origin_id),
            ));
        }
    }
    for arrival in event.origins.iter().flat_map(|o| o.arrivals.iter()) {
        if !pick_ids.contains(arrival.pick_id.as_str()) {
            return Err(GenQuakemlError::validation(
                PICK_ID,
                format!("arrival references unknown pick '{}'", arrival.pick_id),
            ));
        }
    }
    if let Some(id) = &event.preferred_origin_id {
        if !origin_ids.contains(id.as_str()) {
            return Err(GenQuakemlError::validation(
                ORIGIN_PID,
                format!("preferred origin '{}' is not part of the event", id),
            ));
        }
    }
    if let Some(id) = &event.preferred_magnitude_id {
        if !magnitude_ids.contains(id.as_str()) {
            return Err(GenQuakemlError::validation(
                MAGNITUDE_PID,
                format!("preferred magnitude '{}' is not part of the event", id),
            ));
        }
    }
    Ok(())
}

fn optional_parse<T>(
    record: &EventRecord,
    field: &str,
    parse: fn(&str, &str) -> Result<T>,
) -> Result<Option<T>> {
    record
        .get_non_empty(field)
        .map(|raw| parse(field, raw))
        .transpose()
}

fn require_in_range(record: &EventRecord, field: &str, min: f64, max: f64) -> Result<f64> {
    let value = record.require_f64(field)?;
    check_range(field, value, min, max)
}

fn optional_in_range(record: &EventRecord, field: &str, min: f64, max: f64) -> Result<Option<f64>> {
    record
        .optional_f64(field)?
        .map(|value| check_range(field, value, min, max))
        .transpose()
}

fn non_negative(record: &EventRecord, field: &str) -> Result<Option<f64>> {
    optional_in_range(record, field, 0.0, f64::MAX)
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<f64> {
    if value < min || value > max {
        return Err(GenQuakemlError::validation(
            field,
            format!("{} is outside [{}, {}]", value, min, max),
        ));
    }
    Ok(value)
}
