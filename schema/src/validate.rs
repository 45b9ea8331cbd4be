//! Validator: collects every constraint violation of an entity tree.
//!
//! Order is deterministic: declared properties in declaration order (nested
//! entities and sequence elements inline, depth first), then dimensions by
//! name, then sequence-length mismatches, then unrecognised keys.

use itertools::Itertools;
use thiserror::Error;

use crate::constraint::Problem;
use crate::entity::Entity;
use crate::value::Value;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("validation failed with {} problem(s):\n{}", .problems.len(), .problems.iter().join("\n"))]
pub struct ValidationError {
    pub problems: Vec<Problem>,
}

pub fn problems(entity: &Entity) -> Vec<Problem> {
    let mut found = Vec::new();
    collect(entity, entity.type_name(), &mut found);
    found
}

pub fn validate_or_raise(entity: &Entity) -> Result<(), ValidationError> {
    let problems = problems(entity);
    if problems.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { problems })
    }
}

impl Entity {
    pub fn problems(&self) -> Vec<Problem> {
        problems(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_or_raise(self)
    }
}

pub(crate) fn collect(entity: &Entity, prefix: &str, found: &mut Vec<Problem>) {
    for (property, value) in entity.properties() {
        found.extend(property.check(&format!("{prefix}.{}", property.name()), value));
    }

    if let Some(dimensions) = entity.entity_type().dimensions() {
        for (name, value) in entity.dimensions() {
            found.extend(dimensions.template.check(&format!("{prefix}.{name}"), value));
        }
        if dimensions.aligned {
            check_alignment(entity, prefix, found);
        }
    }

    for key in entity.overflow().keys() {
        found.push(Problem::new(
            prefix,
            format!("'{key}' is not a valid key for '{}' objects", entity.type_name()),
        ));
    }
}

/// Every sequence held by the entity must be as long as the first one.
fn check_alignment(entity: &Entity, prefix: &str, found: &mut Vec<Problem>) {
    let mut lengths = entity
        .properties()
        .map(|(p, v)| (p.name(), v))
        .chain(entity.dimensions().iter().map(|(k, v)| (k.as_str(), v)))
        .filter_map(|(name, value)| match value {
            Value::Sequence(items) => Some((name, items.len())),
            _ => None,
        });

    let Some((reference, expected)) = lengths.next() else {
        return;
    };
    for (name, len) in lengths.filter(|(_, len)| *len != expected) {
        found.push(Problem::new(
            format!("{prefix}.{name}"),
            format!("has {len} values, expected {expected} (length of '{reference}')"),
        ));
    }
}
