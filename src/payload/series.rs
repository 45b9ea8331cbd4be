//! Column-oriented sample data: one sequence per dimension, all of equal
//! length. Measurement series carry an extra `$_time` column of offsets in
//! milliseconds.

use std::collections::BTreeMap;

use itertools::Itertools;
use schema::{Entity, EntityError, Kind, Property, Value};
use thiserror::Error;

pub const TIME_KEY: &str = "$_time";

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("dimensions not defined in this series: {}", .0.join(", "))]
    UnknownDimension(Vec<String>),
    #[error("value of '{dimension}' is not a finite number: {value}")]
    NotFinite { dimension: String, value: f64 },
    #[error(transparent)]
    Entity(#[from] EntityError),
}

/// Constraints of every named column: numbers, with `null` marking a gap.
pub fn column() -> Property {
    Property::sequence_of("column", Kind::nullable(Kind::Float))
}

/// Declare a column. Rows that already exist get a gap in the new column.
pub fn add_dimension(series: &mut Entity, name: &str) -> Result<(), SeriesError> {
    let existing = row_count(series);
    let known = series.dimensions().contains_key(name);
    series.add_dimension(name)?;
    if !known {
        for _ in 0..existing {
            series.push(name, Value::Null)?;
        }
    }
    Ok(())
}

/// Append one row of values. Columns without a value get `null`.
pub fn add_row(series: &mut Entity, values: &[(&str, f64)]) -> Result<(), SeriesError> {
    for name in writable_columns(series, values)? {
        let value = values
            .iter()
            .find(|(n, _)| *n == name)
            .map_or(Value::Null, |(_, v)| Value::from(*v));
        series.push(&name, value)?;
    }
    Ok(())
}

/// Append one row at `offset` milliseconds after the measurement time.
pub fn add_sample(series: &mut Entity, offset: i64, values: &[(&str, f64)]) -> Result<(), SeriesError> {
    if series.entity_type().property(TIME_KEY).is_none() {
        return Err(EntityError::UnknownProperty {
            entity: series.type_name().to_string(),
            property: TIME_KEY.to_string(),
        }
        .into());
    }
    writable_columns(series, values)?;
    series.push(TIME_KEY, offset)?;
    add_row(series, values)
}

pub fn offsets(series: &Entity) -> Vec<i64> {
    series
        .get(TIME_KEY)
        .ok()
        .and_then(Value::as_sequence)
        .map(|items| items.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

/// The named columns read row by row. Short columns are padded with `null`.
pub fn rows(series: &Entity) -> Vec<BTreeMap<String, Value>> {
    let columns: Vec<(&str, &[Value])> = series
        .dimensions()
        .iter()
        .filter_map(|(name, value)| value.as_sequence().map(|items| (name.as_str(), items)))
        .collect();
    let len = columns.iter().map(|(_, items)| items.len()).max().unwrap_or(0);
    (0..len)
        .map(|i| {
            columns
                .iter()
                .map(|(name, items)| (name.to_string(), items.get(i).cloned().unwrap_or(Value::Null)))
                .collect()
        })
        .collect()
}

/// Length of the longest column, `$_time` included.
pub fn row_count(series: &Entity) -> usize {
    series
        .properties()
        .map(|(_, value)| value)
        .chain(series.dimensions().values())
        .filter_map(Value::as_sequence)
        .map(<[Value]>::len)
        .max()
        .unwrap_or(0)
}

// Checked before anything is appended so that a rejected row leaves the
// series untouched.
fn writable_columns(series: &Entity, values: &[(&str, f64)]) -> Result<Vec<String>, SeriesError> {
    let unknown: Vec<String> = values
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| !series.dimensions().contains_key(*name))
        .unique()
        .map(str::to_string)
        .collect();
    if !unknown.is_empty() {
        return Err(SeriesError::UnknownDimension(unknown));
    }
    if let Some((name, value)) = values.iter().find(|(_, value)| !value.is_finite()) {
        return Err(SeriesError::NotFinite {
            dimension: name.to_string(),
            value: *value,
        });
    }
    if let Some((name, value)) = series
        .dimensions()
        .iter()
        .find(|(_, value)| value.as_sequence().is_none())
    {
        return Err(EntityError::WrongKind {
            entity: series.type_name().to_string(),
            property: name.clone(),
            expected: Kind::sequence_of(Kind::nullable(Kind::Float)).to_string(),
            found: value.kind_name(),
        }
        .into());
    }
    Ok(series.dimension_names().map(str::to_string).collect())
}
