//! Process messages: data describing one run of a production process, such
//! as a screwing or welding cycle, with its phases and their series.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use schema::{Entity, EntityError, EntityType, Kind, Property, Value};

use super::common::{self, define, Device};
use super::series::{self, SeriesError};
use crate::constants::content_specs;

pub const PART_TYPES: [&str; 2] = ["SINGLE", "BATCH"];

pub static PART: Lazy<EntityType> = Lazy::new(|| {
    define(
        "Part",
        vec![
            Property::string("partTypeID"),
            Property::string("type").one_of(PART_TYPES),
            Property::string("partID").max_length(256).required(),
            common::result(),
            common::code(),
            common::meta_data(),
        ],
        None,
    )
});

pub static PROGRAM: Lazy<EntityType> = Lazy::new(|| {
    define(
        "Program",
        vec![
            Property::string("id").max_length(36).required(),
            Property::string("name").max_length(256).required(),
            Property::timestamp("lastChangedDate"),
        ],
        None,
    )
});

pub static SHUTOFF_VALUE: Lazy<EntityType> = Lazy::new(|| {
    define(
        "ShutoffValue",
        vec![
            Property::float("value"),
            Property::timestamp("ts"),
            Property::float("upperError"),
            Property::float("lowerError"),
            Property::float("upperWarning"),
            Property::float("lowerWarning"),
        ],
        None,
    )
});

/// Values that ended the process, keyed by measurement point.
pub static SHUTOFF_VALUES: Lazy<EntityType> = Lazy::new(|| {
    define("ShutoffValues", vec![], None)
        .with_dimensions(Property::entity("shutoffValue", &SHUTOFF_VALUE), false)
});

pub static PROCESS: Lazy<EntityType> = Lazy::new(|| {
    define(
        "Process",
        vec![
            Property::timestamp("ts").required(),
            Property::string("externalProcessId").max_length(36),
            common::result(),
            Property::string("shutoffPhase"),
            common::meta_data(),
            Property::entity("program", &PROGRAM),
            Property::entity("shutoffValues", &SHUTOFF_VALUES),
        ],
        None,
    )
});

pub static SPECIAL_VALUE: Lazy<EntityType> = Lazy::new(|| {
    define(
        "SpecialValue",
        vec![
            Property::float("time"),
            Property::string("name").max_length(256),
            Property::map_of("value", Kind::Float).required(),
        ],
        None,
    )
});

/// Thresholds may be a single number or one number per sample.
pub static LIMIT: Lazy<EntityType> = Lazy::new(|| {
    define(
        "Limit",
        vec![
            Property::any("upperError"),
            Property::any("lowerError"),
            Property::any("upperWarning"),
            Property::any("lowerWarning"),
            Property::any("target"),
        ],
        None,
    )
});

pub static LIMITS: Lazy<EntityType> = Lazy::new(|| {
    define("Limits", vec![], None).with_dimensions(Property::entity("limit", &LIMIT), false)
});

pub static SERIES: Lazy<EntityType> =
    Lazy::new(|| define("Series", vec![], None).with_dimensions(series::column(), true));

pub static MEASUREMENT: Lazy<EntityType> = Lazy::new(|| {
    define(
        "Measurement",
        vec![
            Property::timestamp("ts").required(),
            Property::string("phase").max_length(256),
            Property::string("name").max_length(256),
            common::result(),
            common::code(),
            Property::sequence_of("specialValues", Kind::Entity(&SPECIAL_VALUE)),
            Property::entity("series", &SERIES).default_value(Entity::new(&SERIES)),
            Property::entity("limits", &LIMITS),
        ],
        None,
    )
});

pub static PAYLOAD: Lazy<EntityType> = Lazy::new(|| {
    define(
        "ProcessPayload",
        vec![
            common::content_spec(content_specs::PROCESS),
            Property::entity("device", &common::DEVICE),
            Property::entity("part", &PART),
            Property::entity("process", &PROCESS),
            Property::sequence_of("measurements", Kind::Entity(&MEASUREMENT)),
        ],
        Some(content_specs::PROCESS),
    )
});

pub fn new_payload(device: Device, process: Entity) -> Result<Entity, EntityError> {
    Entity::from_values(
        &PAYLOAD,
        [("device", Value::from(device)), ("process", Value::from(process))],
    )
}

pub fn new_process(ts: DateTime<FixedOffset>) -> Result<Entity, EntityError> {
    Entity::from_values(&PROCESS, [("ts", ts)])
}

/// A process phase at `ts` whose series declares `dimensions`.
pub fn new_measurement(ts: DateTime<FixedOffset>, dimensions: &[&str]) -> Result<Entity, SeriesError> {
    let mut measurement = Entity::from_values(&MEASUREMENT, [("ts", ts)])?;
    let series = measurement.entity_mut("series")?;
    for name in dimensions {
        series::add_dimension(series, name)?;
    }
    Ok(measurement)
}

pub fn special_value(name: &str, values: &[(&str, f64)]) -> Result<Entity, EntityError> {
    let value: BTreeMap<String, Value> = values
        .iter()
        .map(|(k, v)| (k.to_string(), Value::from(*v)))
        .collect();
    Entity::from_values(
        &SPECIAL_VALUE,
        [("name", Value::from(name)), ("value", Value::Map(value))],
    )
}

/// Append one row to the measurement's series.
pub fn add_sample(measurement: &mut Entity, values: &[(&str, f64)]) -> Result<(), SeriesError> {
    series::add_row(measurement.entity_mut("series")?, values)
}

pub fn samples(measurement: &Entity) -> Vec<BTreeMap<String, Value>> {
    measurement
        .get("series")
        .ok()
        .and_then(Value::as_entity)
        .map(series::rows)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};
    use schema::Problem;

    use crate::{dumps, loads};

    fn ts() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2002, 5, 30, 9, 30, 10)
            .unwrap()
            + Duration::milliseconds(123)
    }

    fn set_all(entity: &mut Entity, values: &[(&str, f64)]) {
        for (name, value) in values {
            entity.set(name, *value).unwrap();
        }
    }

    fn build_sample() -> Entity {
        let device = Device::new("a4927dad-58d4-4580-b460-79cefd56775b")
            .and_then(|d| d.with_status("normal"))
            .and_then(|d| d.with_meta("swVersion", "2.0.3.13"))
            .and_then(|d| d.with_meta("swBuildId", "41535"))
            .unwrap();

        let mut process = new_process(ts()).unwrap();
        process.set("externalProcessId", "b4927dad-58d4-4580-b460-79cefd56775b").unwrap();
        process.set("result", "NOK").unwrap();
        process.set("shutoffPhase", "phase 1").unwrap();
        let program = Entity::from_values(
            &PROGRAM,
            [
                ("id", Value::from("1")),
                ("name", Value::from("Programm 1")),
                ("lastChangedDate", Value::from(ts())),
            ],
        )
        .unwrap();
        process.set("program", program).unwrap();

        let shutoff = process.entity_mut("shutoffValues").unwrap();
        shutoff.add_dimension("force").unwrap();
        shutoff.add_dimension("pressure").unwrap();
        let force = shutoff.entity_mut("force").unwrap();
        force.set("ts", ts()).unwrap();
        set_all(force, &[("value", 24.0), ("upperError", 26.0), ("lowerError", 22.0)]);
        let pressure = shutoff.entity_mut("pressure").unwrap();
        set_all(pressure, &[("value", 50.0), ("upperError", 52.0), ("lowerError", 48.0)]);

        let mut payload = new_payload(device, process).unwrap();
        let part = Entity::from_values(
            &PART,
            [
                ("type", "SINGLE"),
                ("partTypeID", "F00VH07328"),
                ("partID", "420003844"),
                ("result", "NOK"),
                ("code", "HUH289"),
            ],
        )
        .unwrap();
        payload.set("part", part).unwrap();

        let dimensions = ["time", "force", "pressure", "temperature"];
        let mut m = new_measurement(ts(), &dimensions).unwrap();
        m.set("phase", "phasen name 2").unwrap();
        m.set("name", "500 Grad links drehen").unwrap();
        m.set("result", "NOK").unwrap();
        m.set("code", "0000 EE01").unwrap();
        let limits = m.entity_mut("limits").unwrap();
        limits.add_dimension("temperature").unwrap();
        set_all(
            limits.entity_mut("temperature").unwrap(),
            &[("upperError", 4444.0), ("lowerError", 44.0), ("upperWarning", 2222.0), ("lowerWarning", 46.0)],
        );
        m.push("specialValues", special_value("turning point", &[("pressure", 24.0), ("force", 50.0)]).unwrap())
            .unwrap();
        add_sample(&mut m, &[("time", 0.0), ("force", 26.0), ("pressure", 52.4), ("temperature", 45.4243)]).unwrap();
        add_sample(&mut m, &[("time", 23.0), ("force", 23.0), ("pressure", 46.32), ("temperature", 46.42342)]).unwrap();
        add_sample(&mut m, &[("time", 24.0), ("force", 24.0), ("pressure", 44.2432), ("temperature", 44.2432)]).unwrap();
        payload.push("measurements", m).unwrap();

        let mut m = new_measurement(ts(), &dimensions).unwrap();
        m.set("phase", "phasen name").unwrap();
        m.set("result", "OK").unwrap();
        let limits = m.entity_mut("limits").unwrap();
        limits.add_dimension("force").unwrap();
        let force = limits.entity_mut("force").unwrap();
        force.set("upperError", vec![27, 24, 25]).unwrap();
        force.set("lowerError", vec![25, 22, 23]).unwrap();
        limits.add_dimension("pressure").unwrap();
        let pressure = limits.entity_mut("pressure").unwrap();
        pressure.set("upperError", vec![54, 48, 46]).unwrap();
        pressure.set("lowerError", vec![50, 44, 42]).unwrap();
        m.push("specialValues", special_value("some special value", &[("force", 50.0), ("pressure", 24.0)]).unwrap())
            .unwrap();
        add_sample(&mut m, &[("time", 30.0), ("force", 26.0), ("pressure", 52.4), ("temperature", 45.4243)]).unwrap();
        add_sample(&mut m, &[("time", 36.0), ("force", 23.0), ("pressure", 46.32), ("temperature", 46.42342)]).unwrap();
        add_sample(&mut m, &[("time", 42.0), ("force", 24.0), ("pressure", 44.2432), ("temperature", 44.2432)]).unwrap();
        assert_eq!(samples(&m).len(), 3);
        payload.push("measurements", m).unwrap();

        payload
    }

    #[test]
    fn process_needs_only_a_timestamp() {
        let process = new_process(ts()).unwrap();
        assert!(process.problems().is_empty());
        assert!(Entity::new(&PROCESS).problems().len() == 1);
    }

    #[test]
    fn built_sample_is_valid() {
        let payload = build_sample();
        assert_eq!(payload.problems(), Vec::<Problem>::new());
        assert!(dumps(&payload, true).is_ok());
    }

    #[test]
    fn problems_accumulate_across_the_tree() {
        let mut payload = build_sample();
        payload.entity_mut("device").unwrap().set_lenient("murx", Value::from(9));
        assert_eq!(payload.problems().len(), 1);

        payload.set_lenient(content_specs::KEY, Value::from("wrong"));
        let problems = payload.problems();
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].path, "ProcessPayload.content-spec");
        assert_eq!(problems[1].path, "ProcessPayload.device");
    }

    #[test]
    fn sample_survives_round_trip() {
        let payload = build_sample();
        let clone = loads(&dumps(&payload, false).unwrap(), true).unwrap();
        assert_eq!(payload, clone);
    }

    #[test]
    fn series_rejects_unknown_dimension() {
        let mut m = new_measurement(ts(), &["pressure", "temperature"]).unwrap();
        add_sample(&mut m, &[("pressure", 1.0), ("temperature", 36.7)]).unwrap();
        series::add_dimension(m.entity_mut("series").unwrap(), "torque").unwrap();

        let err = add_sample(&mut m, &[("love", 42.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::UnknownDimension(_)));
        assert_eq!(samples(&m).len(), 1);
        assert_eq!(samples(&m)[0]["torque"], Value::Null);
    }

    #[test]
    fn special_value_requires_values() {
        let blank = Entity::new(&SPECIAL_VALUE);
        assert_eq!(blank.problems().len(), 1);
        assert!(special_value("peak", &[("force", 50.0)]).unwrap().problems().is_empty());
    }

    #[test]
    fn part_id_is_required_here() {
        let part = Entity::from_values(&PART, [("type", "BATCH")]).unwrap();
        assert_eq!(part.problems()[0].path, "Part.partID");
        assert!(Entity::from_values(&PART, [("type", "PALLET")]).is_err());
    }
}
