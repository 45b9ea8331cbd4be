//! Which UTC offset naive timestamps are assumed to carry.
//!
//! `PPMP_TIMEZONE` names an IANA zone whose current offset is used; without
//! it the offset of the local process timezone applies.

use std::env;

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use schema::{OffsetProvider, SystemOffset, ZoneOffset};
use thiserror::Error;

use crate::constants::envvars;

#[derive(Error, Debug)]
pub enum OffsetConfigError {
    #[error("invalid time zone {value:?} in {var}: {reason}")]
    InvalidZone {
        var: &'static str,
        value: String,
        reason: String,
    },
}

pub fn configured() -> Result<Box<dyn OffsetProvider>, OffsetConfigError> {
    let name = match env::var(envvars::TIMEZONE) {
        Ok(name) if !name.trim().is_empty() => name,
        _ => return Ok(Box::new(SystemOffset)),
    };
    let tz = name
        .trim()
        .parse::<Tz>()
        .map_err(|e| OffsetConfigError::InvalidZone {
            var: envvars::TIMEZONE,
            value: name.clone(),
            reason: e.to_string(),
        })?;
    log::debug!("Assuming time zone {} for naive timestamps", tz.name());
    Ok(Box::new(ZoneOffset(tz)))
}

/// Current time in the configured offset, or in the system offset if the
/// configuration is invalid.
pub fn local_now() -> DateTime<FixedOffset> {
    match configured() {
        Ok(offsets) => offsets.now(),
        Err(e) => {
            log::warn!("{e}; using system offset");
            SystemOffset.now()
        }
    }
}
