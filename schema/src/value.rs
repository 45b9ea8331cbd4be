use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use crate::entity::{Entity, EntityType};

/// A property value as held by an [`Entity`].
///
/// `Absent` is the unset sentinel; it is never serialized. `Null` only
/// appears inside sequences and maps (e.g. gaps in series data).
/// `Naive` is a timestamp without UTC offset: strict assignment converts it
/// to `Timestamp`, so it can only be stored by lenient parsing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Absent,
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
    Entity(Box<Entity>),
    Sequence(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view; integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Value::Entity(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_entity_mut(&mut self) -> Option<&mut Entity> {
        match self {
            Value::Entity(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Short name of the value's variant, used in problem messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::Timestamp(_) => "timestamp",
            Value::Naive(_) => "naive timestamp",
            Value::Entity(_) => "entity",
            Value::Sequence(_) => "sequence",
            Value::Map(_) => "map",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => write!(f, "<unset>"),
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::Naive(ts) => write!(f, "{ts}"),
            Value::Entity(e) => write!(f, "{e}"),
            Value::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Value::Naive(ts)
    }
}

impl From<Entity> for Value {
    fn from(e: Entity) -> Self {
        Value::Entity(Box::new(e))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Absent)
    }
}

/// The semantic category a property expects.
#[derive(Clone, Debug)]
pub enum Kind {
    Any,
    String,
    Integer,
    /// Any finite number; integers are accepted as-is.
    Float,
    Boolean,
    Timestamp,
    Entity(&'static EntityType),
    Sequence(Box<Kind>),
    /// String-keyed map of values of the inner kind.
    Map(Box<Kind>),
    /// The inner kind, or `null`.
    Nullable(Box<Kind>),
}

impl Kind {
    pub fn sequence_of(kind: Kind) -> Self {
        Kind::Sequence(Box::new(kind))
    }

    pub fn map_of(kind: Kind) -> Self {
        Kind::Map(Box::new(kind))
    }

    pub fn nullable(kind: Kind) -> Self {
        Kind::Nullable(Box::new(kind))
    }

    /// Shallow check of the value's tag against this kind.
    ///
    /// Elements of sequences and maps are not inspected here.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Absent) => false,
            (Kind::Nullable(_), Value::Null) => true,
            (Kind::Nullable(inner), v) => inner.matches(v),
            (_, Value::Null) => false,
            (_, Value::Float(f)) if !f.is_finite() => false,
            (Kind::Any, _) => true,
            (Kind::String, Value::String(_)) => true,
            (Kind::Integer, Value::Integer(_)) => true,
            (Kind::Float, Value::Float(_) | Value::Integer(_)) => true,
            (Kind::Boolean, Value::Boolean(_)) => true,
            (Kind::Timestamp, Value::Timestamp(_)) => true,
            (Kind::Entity(ty), Value::Entity(e)) => std::ptr::eq(e.entity_type(), *ty),
            (Kind::Sequence(_), Value::Sequence(_)) => true,
            (Kind::Map(_), Value::Map(_)) => true,
            _ => false,
        }
    }

    /// The element kind, if this kind is a container.
    pub fn element(&self) -> Option<&Kind> {
        match self {
            Kind::Sequence(inner) | Kind::Map(inner) => Some(inner),
            Kind::Nullable(inner) => inner.element(),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Any => write!(f, "any"),
            Kind::String => write!(f, "string"),
            Kind::Integer => write!(f, "integer"),
            Kind::Float => write!(f, "number"),
            Kind::Boolean => write!(f, "boolean"),
            Kind::Timestamp => write!(f, "timestamp"),
            Kind::Entity(ty) => write!(f, "{}", ty.name()),
            Kind::Sequence(inner) => write!(f, "sequence<{inner}>"),
            Kind::Map(inner) => write!(f, "map<{inner}>"),
            Kind::Nullable(inner) => write!(f, "{inner}?"),
        }
    }
}
