//! Constraint engine: pure checks of a candidate value against one declared
//! constraint.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::entity::EntityType;
use crate::validate;
use crate::value::{Kind, Value};

/// A single validation finding.
///
/// `path` locates the offending value, starting at the root entity's type
/// name (e.g. `MeasurementPayload.measurements[0].ts`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub path: String,
    pub message: String,
}

impl Problem {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Clone, Debug)]
pub enum Constraint {
    /// Shallow type check of the value's tag.
    Type(Kind),
    /// Maximum number of characters of a string, or elements of a sequence.
    MaxLength(usize),
    Range { min: Option<f64>, max: Option<f64> },
    OneOf(Vec<Value>),
    /// The value is an entity of the given type and must itself be valid.
    Nested(&'static EntityType),
    /// Every element of a sequence must be of the given kind (and valid).
    SequenceOf(Kind),
    /// Every value of a map must be of the given kind (and valid).
    MapOf(Kind),
}

impl Constraint {
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Constraint::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn describe(&self) -> String {
        match self {
            Constraint::Type(kind) => format!("type({kind})"),
            Constraint::MaxLength(n) => format!("max-length({n})"),
            Constraint::Range { min, max } => format!(
                "range({}, {})",
                min.map_or("-inf".to_string(), |m| m.to_string()),
                max.map_or("inf".to_string(), |m| m.to_string())
            ),
            Constraint::OneOf(values) => format!("one-of({})", values.iter().join(", ")),
            Constraint::Nested(ty) => format!("nested({})", ty.name()),
            Constraint::SequenceOf(kind) => format!("sequence-of({kind})"),
            Constraint::MapOf(kind) => format!("map-of({kind})"),
        }
    }

    /// Check `value` found at `path`.
    ///
    /// Absent values always pass; presence is governed by the descriptor's
    /// `required` flag. Constraints that do not apply to the value's kind pass.
    pub fn check(&self, path: &str, value: &Value) -> Result<(), Vec<Problem>> {
        if value.is_absent() {
            return Ok(());
        }
        let mut problems = Vec::new();
        match self {
            Constraint::Type(kind) => {
                if !kind.matches(value) {
                    problems.push(type_problem(path, kind, value));
                }
            }
            Constraint::MaxLength(max) => {
                let len = match value {
                    Value::String(s) => Some(s.chars().count()),
                    Value::Sequence(items) => Some(items.len()),
                    _ => None,
                };
                if let Some(len) = len.filter(|len| len > max) {
                    problems.push(Problem::new(
                        path,
                        format!("may not be longer than {max} (is {len})"),
                    ));
                }
            }
            Constraint::Range { min, max } => {
                if let Some(x) = value.as_f64() {
                    if let Some(min) = min.filter(|min| x < *min) {
                        problems.push(Problem::new(path, format!("{x} is below minimum {min}")));
                    }
                    if let Some(max) = max.filter(|max| x > *max) {
                        problems.push(Problem::new(path, format!("{x} is above maximum {max}")));
                    }
                }
            }
            Constraint::OneOf(allowed) => {
                if !allowed.contains(value) {
                    problems.push(Problem::new(
                        path,
                        format!("{value} must be one of {}", allowed.iter().join(", ")),
                    ));
                }
            }
            Constraint::Nested(ty) => {
                if let Value::Entity(entity) = value {
                    if std::ptr::eq(entity.entity_type(), *ty) {
                        validate::collect(entity, path, &mut problems);
                    }
                }
            }
            Constraint::SequenceOf(kind) => {
                if let Value::Sequence(items) = value {
                    for (i, item) in items.iter().enumerate() {
                        check_element(kind, &format!("{path}[{i}]"), item, &mut problems);
                    }
                }
            }
            Constraint::MapOf(kind) => {
                if let Value::Map(entries) = value {
                    for (key, item) in entries {
                        check_element(kind, &format!("{path}.{key}"), item, &mut problems);
                    }
                }
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

fn type_problem(path: &str, kind: &Kind, value: &Value) -> Problem {
    match value {
        Value::Naive(_) => Problem::new(path, "timestamp carries no UTC offset"),
        Value::Null => Problem::new(path, "may not be 'null'"),
        Value::Float(f) if !f.is_finite() => Problem::new(path, format!("{f} is not a finite number")),
        _ => Problem::new(
            path,
            format!(
                "{value} is not an appropriate value (expected {kind}, got {})",
                value.kind_name()
            ),
        ),
    }
}

/// Check one element of a container, descending into nested containers and
/// entities.
pub(crate) fn check_element(kind: &Kind, path: &str, value: &Value, problems: &mut Vec<Problem>) {
    if !kind.matches(value) {
        problems.push(type_problem(path, kind, value));
        return;
    }
    let kind = match kind {
        Kind::Nullable(inner) => inner,
        other => other,
    };
    match (kind, value) {
        (Kind::Entity(_), Value::Entity(entity)) => validate::collect(entity, path, problems),
        (Kind::Sequence(inner), Value::Sequence(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_element(inner, &format!("{path}[{i}]"), item, problems);
            }
        }
        (Kind::Map(inner), Value::Map(entries)) => {
            for (key, item) in entries {
                check_element(inner, &format!("{path}.{key}"), item, problems);
            }
        }
        _ => {}
    }
}
