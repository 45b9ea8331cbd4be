//! Measurement messages: simple, non-structured sensor readings, optionally
//! as a series of samples over time.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset};
use once_cell::sync::Lazy;
use schema::{Entity, EntityError, EntityType, Kind, Property, Value};

use super::common::{self, define, Device};
use super::series::{self, SeriesError, TIME_KEY};
use crate::constants::content_specs;
use crate::offsets;

pub static LIMIT: Lazy<EntityType> = Lazy::new(|| {
    define(
        "Limit",
        vec![
            Property::float("upperError"),
            Property::float("lowerError"),
            Property::float("upperWarning"),
            Property::float("lowerWarning"),
        ],
        None,
    )
});

/// Error and warning thresholds, keyed by measurement point.
pub static LIMITS: Lazy<EntityType> = Lazy::new(|| {
    define("Limits", vec![], None).with_dimensions(Property::entity("limit", &LIMIT), false)
});

pub static SERIES: Lazy<EntityType> = Lazy::new(|| {
    define(
        "Series",
        vec![Property::sequence_of(TIME_KEY, Kind::Integer).default_value(Value::Sequence(vec![]))],
        None,
    )
    .with_dimensions(series::column(), true)
});

pub static MEASUREMENT: Lazy<EntityType> = Lazy::new(|| {
    define(
        "Measurement",
        vec![
            Property::timestamp("ts").required(),
            common::result(),
            common::code(),
            Property::entity("series", &SERIES).default_value(Entity::new(&SERIES)),
            Property::entity("limits", &LIMITS),
        ],
        None,
    )
});

pub static PART: Lazy<EntityType> = Lazy::new(|| {
    define(
        "Part",
        vec![
            Property::string("partTypeID"),
            Property::string("partID").max_length(256),
            common::result(),
            common::code(),
            common::meta_data(),
        ],
        None,
    )
});

pub static PAYLOAD: Lazy<EntityType> = Lazy::new(|| {
    define(
        "MeasurementPayload",
        vec![
            common::content_spec(content_specs::MEASUREMENT),
            Property::entity("device", &common::DEVICE).required(),
            Property::entity("part", &PART),
            Property::sequence_of("measurements", Kind::Entity(&MEASUREMENT))
                .default_value(Value::Sequence(vec![])),
        ],
        Some(content_specs::MEASUREMENT),
    )
});

/// One row of a measurement series with its absolute time.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub ts: DateTime<FixedOffset>,
    pub values: BTreeMap<String, Value>,
}

pub fn new_payload(device: Device) -> Result<Entity, EntityError> {
    Entity::from_values(&PAYLOAD, [("device", Value::from(device))])
}

/// An empty measurement at `ts` whose series declares `dimensions`.
pub fn new_measurement(ts: DateTime<FixedOffset>, dimensions: &[&str]) -> Result<Entity, SeriesError> {
    let mut measurement = Entity::from_values(&MEASUREMENT, [("ts", ts)])?;
    let series = measurement.entity_mut("series")?;
    for name in dimensions {
        series::add_dimension(series, name)?;
    }
    Ok(measurement)
}

/// Record values taken at `ts`.
///
/// The first sample moves the measurement to `ts`; later ones are stored as
/// the milliseconds elapsed since then.
pub fn add_sample(
    measurement: &mut Entity,
    ts: DateTime<FixedOffset>,
    values: &[(&str, f64)],
) -> Result<(), SeriesError> {
    let started = match measurement.get("series")?.as_entity() {
        Some(series) => !series::offsets(series).is_empty(),
        None => false,
    };
    let start = measurement.get("ts")?.as_timestamp();
    let offset = match start {
        Some(start) if started => (ts - start).num_milliseconds(),
        _ => 0,
    };

    series::add_sample(measurement.entity_mut("series")?, offset, values)?;
    if !started {
        measurement.set("ts", ts)?;
    }
    Ok(())
}

/// The series as timestamped rows. Rows whose offset puts them outside the
/// representable time range are skipped.
pub fn samples(measurement: &Entity) -> Vec<Sample> {
    let Some(start) = measurement.get("ts").ok().and_then(Value::as_timestamp) else {
        return vec![];
    };
    let Some(series) = measurement.get("series").ok().and_then(Value::as_entity) else {
        return vec![];
    };
    let mut rows = series::rows(series).into_iter();
    series::offsets(series)
        .into_iter()
        .filter_map(|offset| {
            let values = rows.next().unwrap_or_default();
            let ts = Duration::try_milliseconds(offset).and_then(|d| start.checked_add_signed(d));
            if ts.is_none() {
                log::warn!("skipping sample at offset {offset} ms: out of range");
            }
            Some(Sample { ts: ts?, values })
        })
        .collect()
}

impl Device {
    /// A measurement payload holding a single sample taken at `ts`, or now in
    /// the configured offset.
    pub fn measurement(
        &self,
        ts: Option<DateTime<FixedOffset>>,
        values: &[(&str, f64)],
    ) -> Result<Entity, SeriesError> {
        let ts = ts.unwrap_or_else(offsets::local_now);
        let dimensions: Vec<&str> = values.iter().map(|(name, _)| *name).collect();
        let mut measurement = new_measurement(ts, &dimensions)?;
        add_sample(&mut measurement, ts, values)?;

        let mut payload = new_payload(self.clone())?;
        payload.push("measurements", measurement)?;
        Ok(payload)
    }
}
