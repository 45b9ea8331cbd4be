//! Entities and properties shared by every PPMP payload.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use schema::{Entity, EntityError, EntityType, Kind, Property, Value};

use crate::constants::content_specs;

pub const RESULT_VALUES: [&str; 3] = ["OK", "NOK", "UNKNOWN"];

pub static DEVICE: Lazy<EntityType> = Lazy::new(|| {
    define(
        "Device",
        vec![
            Property::string("deviceID").max_length(36).required(),
            Property::string("operationalStatus"),
            meta_data(),
        ],
        None,
    )
});

pub fn code() -> Property {
    Property::string("code").max_length(36)
}

pub fn result() -> Property {
    Property::string("result").one_of(RESULT_VALUES)
}

pub fn meta_data() -> Property {
    Property::map_of("metaData", Kind::String)
}

/// Required discriminator of a payload type, pinned to `urn`.
pub fn content_spec(urn: &'static str) -> Property {
    Property::string(content_specs::KEY)
        .required()
        .one_of([urn])
        .default_value(urn)
}

/// Catalog entries are static; a malformed one is a programming error.
pub(crate) fn define(
    name: &str,
    properties: Vec<Property>,
    discriminator: Option<&str>,
) -> EntityType {
    EntityType::define(name, properties, discriminator)
        .unwrap_or_else(|e| panic!("malformed PPMP entity type {name}: {e}"))
}

/// Add one string pair to the `metaData` map of `entity`.
pub fn insert_meta(entity: &mut Entity, key: &str, value: &str) -> Result<(), EntityError> {
    let mut meta = entity
        .get("metaData")?
        .as_map()
        .cloned()
        .unwrap_or_else(BTreeMap::new);
    meta.insert(key.to_string(), Value::from(value));
    entity.set("metaData", Value::Map(meta))
}

/// The device a payload originates from.
///
/// ```
/// use ppmp::Device;
///
/// let device = Device::new("a4927dad-58d4-4580-b460-79cefd56775b")
///     .and_then(|d| d.with_meta("maker", "Bosch"))
///     .unwrap();
/// assert_eq!(device.meta("maker"), Some("Bosch"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Device(Entity);

impl Device {
    pub fn new(device_id: &str) -> Result<Self, EntityError> {
        Entity::from_values(&DEVICE, [("deviceID", device_id)]).map(Self)
    }

    /// Wrap a `Device` entity, e.g. one taken from a parsed payload.
    pub fn from_entity(entity: Entity) -> Result<Self, EntityError> {
        if entity.entity_type().name() != DEVICE.name() {
            return Err(EntityError::WrongKind {
                entity: entity.type_name().to_string(),
                property: String::new(),
                expected: DEVICE.name().to_string(),
                found: "entity",
            });
        }
        Ok(Self(entity))
    }

    pub fn with_status(mut self, status: &str) -> Result<Self, EntityError> {
        self.0.set("operationalStatus", status)?;
        Ok(self)
    }

    pub fn with_meta(mut self, key: &str, value: &str) -> Result<Self, EntityError> {
        insert_meta(&mut self.0, key, value)?;
        Ok(self)
    }

    pub fn device_id(&self) -> Option<&str> {
        self.0.get("deviceID").ok().and_then(Value::as_str)
    }

    pub fn status(&self) -> Option<&str> {
        self.0.get("operationalStatus").ok().and_then(Value::as_str)
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.0
            .get("metaData")
            .ok()
            .and_then(Value::as_map)
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
    }

    pub fn entity(&self) -> &Entity {
        &self.0
    }

    pub fn into_entity(self) -> Entity {
        self.0
    }
}

impl From<Device> for Value {
    fn from(device: Device) -> Self {
        Value::from(device.0)
    }
}
