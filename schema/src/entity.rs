//! Entity types (immutable schemas) and entity instances.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::NaiveDateTime;
use itertools::Itertools;
use thiserror::Error;

use crate::constraint::{self, Constraint, Problem};
use crate::offset::{localize, truncate, OffsetProvider, SystemOffset};
use crate::property::Property;
use crate::value::{Kind, Value};

#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("property '{property}' is declared twice in '{entity}'")]
    DuplicateProperty { entity: String, property: String },
    #[error("'{entity}' has no discriminator and cannot be a payload type")]
    MissingDiscriminator { entity: String },
    #[error("discriminator '{discriminator}' is claimed by both '{first}' and '{second}'")]
    DuplicateDiscriminator {
        discriminator: String,
        first: String,
        second: String,
    },
}

#[derive(Error, Debug)]
pub enum EntityError {
    #[error("'{property}' is not a valid key for '{entity}' objects")]
    UnknownProperty { entity: String, property: String },
    #[error("{entity}.{property}: {value} violates {constraint}: {}", .problems.iter().join("; "))]
    Constraint {
        entity: String,
        property: String,
        value: Box<Value>,
        constraint: String,
        problems: Vec<Problem>,
    },
    #[error("{entity}.{property} holds a {found} value, expected {expected}")]
    WrongKind {
        entity: String,
        property: String,
        expected: String,
        found: &'static str,
    },
    #[error("{entity}.{property}: {value} is out of range once its UTC offset is applied")]
    TimestampOutOfRange {
        entity: String,
        property: String,
        value: NaiveDateTime,
    },
}

/// Free-form keys of an open entity type.
#[derive(Clone, Debug)]
pub struct Dimensions {
    /// Constraints applied to every dimension value.
    pub template: Property,
    /// All sequence values of the entity must have the same length.
    pub aligned: bool,
}

/// A named, ordered set of property descriptors.
///
/// Types are defined once (usually in a `Lazy` static) and referenced by
/// every instance.
#[derive(Debug)]
pub struct EntityType {
    name: String,
    properties: Vec<Property>,
    discriminator: Option<String>,
    dimensions: Option<Dimensions>,
}

impl EntityType {
    pub fn define(
        name: impl Into<String>,
        properties: Vec<Property>,
        discriminator: Option<&str>,
    ) -> Result<Self, DefinitionError> {
        let name = name.into();
        let mut seen = HashSet::new();
        for property in &properties {
            if !seen.insert(property.name()) {
                return Err(DefinitionError::DuplicateProperty {
                    entity: name,
                    property: property.name().to_string(),
                });
            }
        }
        Ok(Self {
            name,
            properties,
            discriminator: discriminator.map(str::to_string),
            dimensions: None,
        })
    }

    /// Allow undeclared keys whose values satisfy `template`.
    pub fn with_dimensions(mut self, template: Property, aligned: bool) -> Self {
        self.dimensions = Some(Dimensions { template, aligned });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    pub fn dimensions(&self) -> Option<&Dimensions> {
        self.dimensions.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.dimensions.is_some()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name() == name)
    }
}

enum Slot {
    Declared(usize),
    Dimension,
}

/// An instance of an [`EntityType`].
///
/// Declared properties hold either a value or [`Value::Absent`]. Open types
/// additionally hold dimensions. Keys that are neither (only stored by
/// lenient parsing) live in the overflow area and are reported by
/// [`crate::problems`].
#[derive(Clone, Debug)]
pub struct Entity {
    ty: &'static EntityType,
    values: Vec<Value>,
    dimensions: BTreeMap<String, Value>,
    overflow: BTreeMap<String, Value>,
}

impl Entity {
    /// A fresh instance with descriptor defaults applied.
    pub fn new(ty: &'static EntityType) -> Self {
        let values = ty
            .properties
            .iter()
            .map(|p| p.default().cloned().unwrap_or_default())
            .collect();
        Self {
            ty,
            values,
            dimensions: BTreeMap::new(),
            overflow: BTreeMap::new(),
        }
    }

    /// An instance with every given value assigned strictly.
    pub fn from_values<I, K, V>(ty: &'static EntityType, values: I) -> Result<Self, EntityError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        Self::from_values_with(ty, values, &SystemOffset)
    }

    pub fn from_values_with<I, K, V>(
        ty: &'static EntityType,
        values: I,
        offsets: &dyn OffsetProvider,
    ) -> Result<Self, EntityError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut entity = Self::new(ty);
        for (name, value) in values {
            entity.set_with(name.as_ref(), value, offsets)?;
        }
        Ok(entity)
    }

    /// A blank instance without defaults, as the codec starts from.
    pub(crate) fn blank(ty: &'static EntityType) -> Self {
        Self {
            ty,
            values: vec![Value::Absent; ty.properties.len()],
            dimensions: BTreeMap::new(),
            overflow: BTreeMap::new(),
        }
    }

    pub fn entity_type(&self) -> &'static EntityType {
        self.ty
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// The value of a declared property or dimension.
    ///
    /// Unset properties (and unknown dimensions of open types) yield
    /// [`Value::Absent`].
    pub fn get(&self, name: &str) -> Result<&Value, EntityError> {
        const ABSENT: &Value = &Value::Absent;
        match self.slot(name)? {
            Slot::Declared(i) => Ok(&self.values[i]),
            Slot::Dimension => Ok(self.dimensions.get(name).unwrap_or(ABSENT)),
        }
    }

    /// Strict assignment: the value is rejected unless it satisfies every
    /// constraint of the property. Naive timestamps get the local offset.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), EntityError> {
        self.set_with(name, value, &SystemOffset)
    }

    pub fn set_with(
        &mut self,
        name: &str,
        value: impl Into<Value>,
        offsets: &dyn OffsetProvider,
    ) -> Result<(), EntityError> {
        let slot = self.slot(name)?;
        let value = self.normalize(name, value.into(), offsets)?;
        let descriptor = self.descriptor(&slot);
        if let Some((constraint, problems)) = descriptor.first_violation(&self.path(name), &value) {
            return Err(EntityError::Constraint {
                entity: self.ty.name.clone(),
                property: name.to_string(),
                value: Box::new(value),
                constraint,
                problems,
            });
        }
        self.store(slot, name, value);
        Ok(())
    }

    pub fn unset(&mut self, name: &str) -> Result<(), EntityError> {
        self.set(name, Value::Absent)
    }

    /// Store without any checks. Undeclared names of closed types go to the
    /// overflow area.
    pub fn set_lenient(&mut self, name: &str, value: Value) {
        match self.slot(name) {
            Ok(slot) => self.store(slot, name, value),
            Err(_) => {
                if value.is_absent() {
                    self.overflow.remove(name);
                } else {
                    self.overflow.insert(name.to_string(), value);
                }
            }
        }
    }

    /// Append to a sequence property, checking the new element first.
    pub fn push(&mut self, name: &str, value: impl Into<Value>) -> Result<(), EntityError> {
        self.push_with(name, value, &SystemOffset)
    }

    pub fn push_with(
        &mut self,
        name: &str,
        value: impl Into<Value>,
        offsets: &dyn OffsetProvider,
    ) -> Result<(), EntityError> {
        let slot = self.slot(name)?;
        let value = self.normalize(name, value.into(), offsets)?;
        let descriptor = self.descriptor(&slot).clone();
        let element = match descriptor.kind() {
            Kind::Sequence(element) => (**element).clone(),
            _ => return Err(self.wrong_kind(name, "sequence".to_string(), "non-sequence")),
        };
        let len = match self.get(name)? {
            Value::Absent => 0,
            Value::Sequence(items) => items.len(),
            other => {
                let found = other.kind_name();
                return Err(self.wrong_kind(name, descriptor.kind().to_string(), found));
            }
        };

        let mut problems = Vec::new();
        let path = format!("{}[{len}]", self.path(name));
        constraint::check_element(&element, &path, &value, &mut problems);
        let mut violated = format!("sequence-of({element})");
        if problems.is_empty() {
            for c in descriptor.constraints() {
                if let Constraint::MaxLength(max) = c {
                    if len + 1 > *max {
                        violated = c.describe();
                        problems.push(Problem::new(
                            self.path(name),
                            format!("may not be longer than {max}"),
                        ));
                    }
                }
            }
        }
        if !problems.is_empty() {
            return Err(EntityError::Constraint {
                entity: self.ty.name.clone(),
                property: name.to_string(),
                value: Box::new(value),
                constraint: violated,
                problems,
            });
        }

        let slot_value = self.slot_value_mut(slot, name);
        match slot_value {
            Value::Sequence(items) => items.push(value),
            absent => *absent = Value::Sequence(vec![value]),
        }
        Ok(())
    }

    /// Mutable access to a nested entity, created blank if unset.
    pub fn entity_mut(&mut self, name: &str) -> Result<&mut Entity, EntityError> {
        let slot = self.slot(name)?;
        let ty = match self.descriptor(&slot).kind() {
            Kind::Entity(ty) => *ty,
            other => {
                let expected = other.to_string();
                return Err(self.wrong_kind(name, expected, "entity"));
            }
        };
        if let Some(found) = match self.get(name)? {
            Value::Absent | Value::Entity(_) => None,
            other => Some(other.kind_name()),
        } {
            return Err(self.wrong_kind(name, ty.name().to_string(), found));
        }

        let slot_value = self.slot_value_mut(slot, name);
        if slot_value.is_absent() {
            *slot_value = Value::Entity(Box::new(Entity::new(ty)));
        }
        match slot_value {
            Value::Entity(entity) => Ok(entity),
            _ => unreachable!("slot was just filled with an entity"),
        }
    }

    /// Declare a dimension of an open type, initialised empty.
    ///
    /// An existing dimension is left untouched.
    pub fn add_dimension(&mut self, name: &str) -> Result<(), EntityError> {
        let Some(dimensions) = self.ty.dimensions() else {
            return Err(self.unknown(name));
        };
        if self.ty.index_of(name).is_some() {
            return Err(self.unknown(name));
        }
        if !self.dimensions.contains_key(name) {
            let initial = empty_value(&dimensions.template);
            self.dimensions.insert(name.to_string(), initial);
        }
        Ok(())
    }

    pub fn dimensions(&self) -> &BTreeMap<String, Value> {
        &self.dimensions
    }

    pub fn dimension_names(&self) -> impl Iterator<Item = &str> {
        self.dimensions.keys().map(String::as_str)
    }

    pub fn overflow(&self) -> &BTreeMap<String, Value> {
        &self.overflow
    }

    /// Declared properties with their current values, in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&Property, &Value)> {
        self.ty.properties.iter().zip(self.values.iter())
    }

    fn path(&self, name: &str) -> String {
        format!("{}.{name}", self.ty.name)
    }

    fn slot(&self, name: &str) -> Result<Slot, EntityError> {
        if let Some(i) = self.ty.index_of(name) {
            return Ok(Slot::Declared(i));
        }
        if self.ty.is_open() {
            return Ok(Slot::Dimension);
        }
        Err(self.unknown(name))
    }

    fn descriptor(&self, slot: &Slot) -> &'static Property {
        let ty: &'static EntityType = self.ty;
        match slot {
            Slot::Declared(i) => &ty.properties[*i],
            Slot::Dimension => match &ty.dimensions {
                Some(dimensions) => &dimensions.template,
                None => unreachable!("dimension slot of a closed type"),
            },
        }
    }

    fn slot_value_mut(&mut self, slot: Slot, name: &str) -> &mut Value {
        match slot {
            Slot::Declared(i) => &mut self.values[i],
            Slot::Dimension => self.dimensions.entry(name.to_string()).or_default(),
        }
    }

    fn store(&mut self, slot: Slot, name: &str, value: Value) {
        match slot {
            Slot::Declared(i) => self.values[i] = value,
            Slot::Dimension if value.is_absent() => {
                self.dimensions.remove(name);
            }
            Slot::Dimension => {
                self.dimensions.insert(name.to_string(), value);
            }
        }
    }

    fn normalize(
        &self,
        name: &str,
        value: Value,
        offsets: &dyn OffsetProvider,
    ) -> Result<Value, EntityError> {
        normalize(value, offsets).map_err(|value| EntityError::TimestampOutOfRange {
            entity: self.ty.name.clone(),
            property: name.to_string(),
            value,
        })
    }

    fn unknown(&self, name: &str) -> EntityError {
        EntityError::UnknownProperty {
            entity: self.ty.name.clone(),
            property: name.to_string(),
        }
    }

    fn wrong_kind(&self, name: &str, expected: String, found: &'static str) -> EntityError {
        EntityError::WrongKind {
            entity: self.ty.name.clone(),
            property: name.to_string(),
            expected,
            found,
        }
    }
}

/// Structural equality over declared properties and dimensions. The overflow
/// area does not take part.
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.ty, other.ty)
            && self.values == other.values
            && self.dimensions == other.dimensions
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self
            .properties()
            .filter(|(_, v)| !v.is_absent())
            .map(|(p, v)| format!("{}={v}", p.name()))
            .chain(self.dimensions.iter().map(|(k, v)| format!("{k}={v}")))
            .join(", ");
        write!(f, "{}({fields})", self.ty.name)
    }
}

/// Give naive timestamps the provider's offset and drop sub-millisecond
/// digits. Fails with the first naive timestamp that cannot be placed.
fn normalize(value: Value, offsets: &dyn OffsetProvider) -> Result<Value, NaiveDateTime> {
    let value = match value {
        Value::Naive(naive) => Value::Timestamp(localize(naive, offsets).ok_or(naive)?),
        Value::Timestamp(ts) => Value::Timestamp(truncate(ts)),
        Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(|v| normalize(v, offsets))
                .collect::<Result<_, _>>()?,
        ),
        Value::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| normalize(v, offsets).map(|v| (k, v)))
                .collect::<Result<_, _>>()?,
        ),
        other => other,
    };
    Ok(value)
}

/// Initial value of a fresh dimension.
fn empty_value(template: &Property) -> Value {
    if let Some(default) = template.default() {
        return default.clone();
    }
    match template.kind() {
        Kind::Entity(ty) => Value::Entity(Box::new(Entity::new(ty))),
        Kind::Sequence(_) => Value::Sequence(vec![]),
        Kind::Map(_) => Value::Map(BTreeMap::new()),
        _ => Value::Absent,
    }
}
