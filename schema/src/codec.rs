//! Conversion between entity trees and JSON.
//!
//! Parsing is lenient: values of the wrong kind, unknown keys and constraint
//! violations are kept in the entity and surface through
//! [`crate::problems`]. Only unparsable JSON, an unclassifiable document or a
//! malformed timestamp fail a parse.

use serde_json::{Map, Number, Value as Json};
use thiserror::Error;

use crate::classify::{ClassifyError, Registry};
use crate::entity::{Entity, EntityType};
use crate::offset::{
    format_naive, format_timestamp, parse_timestamp, OffsetProvider, SystemOffset, TimestampError,
};
use crate::validate::ValidationError;
use crate::value::{Kind, Value};

#[derive(Error, Debug)]
pub enum CodecError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("top-level JSON value is not an object")]
    NotAnObject,
    #[error("{path}: malformed timestamp {text:?}: {source}")]
    MalformedTimestamp {
        path: String,
        text: String,
        #[source]
        source: TimestampError,
    },
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Parses documents of the types known to a [`Registry`].
pub struct Codec<'a> {
    registry: &'a Registry,
    offsets: &'a dyn OffsetProvider,
}

impl<'a> Codec<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            offsets: &SystemOffset,
        }
    }

    /// Use `offsets` for timestamp text that carries no offset.
    pub fn with_offsets(mut self, offsets: &'a dyn OffsetProvider) -> Self {
        self.offsets = offsets;
        self
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    /// Parse, classify and reconstruct a payload.
    ///
    /// With `validate` set, any problem of the result fails the call with
    /// [`CodecError::Validation`].
    pub fn loads(&self, text: &str, validate: bool) -> Result<Entity, CodecError> {
        let document: Json = serde_json::from_str(text)?;
        let Json::Object(document) = document else {
            return Err(CodecError::NotAnObject);
        };
        let ty = self.registry.classify(&document)?;
        log::debug!("classified payload as {}", ty.name());

        let entity = from_primitive(&document, ty, self.offsets)?;
        if validate {
            entity.validate()?;
        }
        Ok(entity)
    }

    pub fn from_primitive(
        &self,
        primitive: &Map<String, Json>,
        ty: &'static EntityType,
    ) -> Result<Entity, CodecError> {
        from_primitive(primitive, ty, self.offsets)
    }
}

/// JSON text of an entity. Unset properties are omitted.
pub fn dumps(entity: &Entity, pretty: bool) -> Result<String, CodecError> {
    let document = Json::Object(to_primitive(entity));
    let text = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    log::trace!("encoded {}: {}", entity.type_name(), text);
    Ok(text)
}

/// Declared properties in declaration order, then dimensions, then overflow
/// keys. Unset properties are omitted.
pub fn to_primitive(entity: &Entity) -> Map<String, Json> {
    let declared = entity.properties().map(|(p, v)| (p.name(), v));
    let extra = entity
        .dimensions()
        .iter()
        .chain(entity.overflow().iter())
        .map(|(k, v)| (k.as_str(), v));
    declared
        .chain(extra)
        .filter(|(_, v)| !v.is_absent())
        .map(|(k, v)| (k.to_string(), encode(v)))
        .collect()
}

/// Rebuild an entity of type `ty` from a JSON object.
pub fn from_primitive(
    primitive: &Map<String, Json>,
    ty: &'static EntityType,
    offsets: &dyn OffsetProvider,
) -> Result<Entity, CodecError> {
    decode_entity(primitive, ty, ty.name(), offsets)
}

fn decode_entity(
    primitive: &Map<String, Json>,
    ty: &'static EntityType,
    prefix: &str,
    offsets: &dyn OffsetProvider,
) -> Result<Entity, CodecError> {
    let mut entity = Entity::blank(ty);
    for (key, json) in primitive {
        let kind = ty
            .property(key)
            .map(|p| p.kind())
            .or_else(|| ty.dimensions().map(|d| d.template.kind()));
        let value = match kind {
            Some(_) if json.is_null() => Value::Absent,
            Some(kind) => decode(kind, json, &format!("{prefix}.{key}"), offsets)?,
            None => {
                log::debug!("keeping unrecognised key '{key}' of {}", ty.name());
                untyped(json)
            }
        };
        entity.set_lenient(key, value);
    }
    Ok(entity)
}

fn decode(
    kind: &Kind,
    json: &Json,
    path: &str,
    offsets: &dyn OffsetProvider,
) -> Result<Value, CodecError> {
    let value = match (kind, json) {
        (_, Json::Null) => Value::Null,
        (Kind::Nullable(inner), json) => decode(inner, json, path, offsets)?,
        (Kind::Timestamp, Json::String(text)) => {
            let ts = parse_timestamp(text, offsets).map_err(|source| {
                CodecError::MalformedTimestamp {
                    path: path.to_string(),
                    text: text.clone(),
                    source,
                }
            })?;
            Value::Timestamp(ts)
        }
        (Kind::Entity(ty), Json::Object(map)) => {
            Value::Entity(Box::new(decode_entity(map, ty, path, offsets)?))
        }
        (Kind::Sequence(inner), Json::Array(items)) => Value::Sequence(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| decode(inner, item, &format!("{path}[{i}]"), offsets))
                .collect::<Result<_, _>>()?,
        ),
        (Kind::Map(inner), Json::Object(map)) => Value::Map(
            map.iter()
                .map(|(k, item)| {
                    decode(inner, item, &format!("{path}.{k}"), offsets).map(|v| (k.clone(), v))
                })
                .collect::<Result<_, _>>()?,
        ),
        (Kind::Integer, Json::Number(n)) => integral(n).unwrap_or_else(|| untyped(json)),
        (_, json) => untyped(json),
    };
    Ok(value)
}

/// Whole numbers written as floats (`10.0`) are read as integers.
fn integral(n: &Number) -> Option<Value> {
    if let Some(i) = n.as_i64() {
        return Some(Value::Integer(i));
    }
    let f = n.as_f64()?;
    let whole = f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&f);
    whole.then_some(Value::Integer(f as i64))
}

/// Structural conversion, used when no (matching) kind is declared.
fn untyped(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::Sequence(items.iter().map(untyped).collect()),
        Json::Object(map) => Value::Map(map.iter().map(|(k, v)| (k.clone(), untyped(v))).collect()),
    }
}

fn encode(value: &Value) -> Json {
    match value {
        Value::Absent | Value::Null => Json::Null,
        Value::String(s) => Json::String(s.clone()),
        Value::Integer(i) => Json::from(*i),
        Value::Float(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
        Value::Boolean(b) => Json::Bool(*b),
        Value::Timestamp(ts) => Json::String(format_timestamp(ts)),
        Value::Naive(ts) => Json::String(format_naive(ts)),
        Value::Entity(entity) => Json::Object(to_primitive(entity)),
        Value::Sequence(items) => Json::Array(items.iter().map(encode).collect()),
        Value::Map(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), encode(v)))
                .collect(),
        ),
    }
}
