//! UTC-offset capability used to normalise naive timestamps, plus the
//! textual timestamp format of the wire representation.

use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, SubsecRound,
    TimeZone, Utc,
};
use chrono_tz::Tz;
use thiserror::Error;

/// ISO-8601 with millisecond fraction and explicit numeric offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";
const NAIVE_OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

const OFFSET_INPUT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_INPUT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum TimestampError {
    #[error(transparent)]
    Malformed(#[from] chrono::ParseError),
    #[error("out of range once its UTC offset is applied")]
    OutOfRange,
}

/// Produces the UTC offset that naive timestamps are assumed to be in.
pub trait OffsetProvider {
    fn current_offset(&self) -> FixedOffset;

    /// Current time, carrying the provider's offset.
    fn now(&self) -> DateTime<FixedOffset> {
        truncate(Utc::now().with_timezone(&self.current_offset()))
    }
}

/// The offset of the local process timezone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemOffset;

impl OffsetProvider for SystemOffset {
    fn current_offset(&self) -> FixedOffset {
        Local::now().offset().fix()
    }
}

impl OffsetProvider for FixedOffset {
    fn current_offset(&self) -> FixedOffset {
        *self
    }
}

/// The current offset of a named IANA zone.
#[derive(Clone, Copy, Debug)]
pub struct ZoneOffset(pub Tz);

impl OffsetProvider for ZoneOffset {
    fn current_offset(&self) -> FixedOffset {
        Utc::now().with_timezone(&self.0).offset().fix()
    }
}

/// Drop everything below millisecond precision.
pub fn truncate(ts: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    ts.trunc_subsecs(3)
}

/// Attach the provider's offset to a naive timestamp.
///
/// `None` when the UTC instant falls outside the representable range.
pub fn localize(naive: NaiveDateTime, offsets: &dyn OffsetProvider) -> Option<DateTime<FixedOffset>> {
    let offset = offsets.current_offset();
    let utc = naive.checked_sub_signed(Duration::seconds(offset.local_minus_utc().into()))?;
    Some(truncate(offset.from_utc_datetime(&utc)))
}

pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_naive(ts: &NaiveDateTime) -> String {
    ts.format(NAIVE_OUTPUT_FORMAT).to_string()
}

/// Parse ISO-8601 text.
///
/// An explicit offset (or `Z`) is kept as given; text without an offset gets
/// the provider's offset.
pub fn parse_timestamp(
    text: &str,
    offsets: &dyn OffsetProvider,
) -> Result<DateTime<FixedOffset>, TimestampError> {
    let text = text.trim();
    let first_err = match DateTime::parse_from_rfc3339(text) {
        Ok(ts) => return Ok(truncate(ts)),
        Err(e) => e,
    };
    for format in OFFSET_INPUT_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(text, format) {
            return Ok(truncate(ts));
        }
    }
    for format in NAIVE_INPUT_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return localize(naive, offsets).ok_or(TimestampError::OutOfRange);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_INPUT_FORMAT) {
        return localize(date.and_time(Default::default()), offsets).ok_or(TimestampError::OutOfRange);
    }
    Err(first_err.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn plus_two() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    #[test]
    fn keeps_explicit_offset() {
        let ts = parse_timestamp("2002-05-30T09:30:10.123+02:00", &SystemOffset).unwrap();
        assert_eq!(ts.offset(), &plus_two());
        assert_eq!(ts.nanosecond(), 123_000_000);
        assert_eq!(format_timestamp(&ts), "2002-05-30T09:30:10.123+02:00");
    }

    #[test]
    fn z_marker_is_utc() {
        let ts = parse_timestamp("2002-05-30T09:30:10Z", &plus_two()).unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 0);
        assert_eq!(format_timestamp(&ts), "2002-05-30T09:30:10.000+00:00");
    }

    #[test]
    fn compact_offset_is_accepted() {
        let ts = parse_timestamp("2002-05-30T09:30:10.5+0200", &SystemOffset).unwrap();
        assert_eq!(ts.offset(), &plus_two());
    }

    #[test]
    fn naive_text_gets_provider_offset() {
        let ts = parse_timestamp("2002-05-30T09:30:10.123", &plus_two()).unwrap();
        assert_eq!(format_timestamp(&ts), "2002-05-30T09:30:10.123+02:00");
    }

    #[test]
    fn sub_millisecond_digits_are_dropped() {
        let ts = parse_timestamp("2002-05-30T09:30:10.123456+02:00", &SystemOffset).unwrap();
        assert_eq!(ts.nanosecond(), 123_000_000);
    }

    #[test]
    fn garbage_fails() {
        assert!(parse_timestamp("xx", &SystemOffset).is_err());
        assert!(parse_timestamp("", &SystemOffset).is_err());
    }

    #[test]
    fn naive_text_at_the_calendar_edge_is_out_of_range() {
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        let err = parse_timestamp("+262142-12-31T23:59:59", &minus_five).unwrap_err();
        assert!(matches!(err, TimestampError::OutOfRange));

        let plus_five = FixedOffset::east_opt(5 * 3600).unwrap();
        let ts = parse_timestamp("+262142-12-31T23:59:59", &plus_five).unwrap();
        assert_eq!(ts.offset(), &plus_five);
    }

    #[test]
    fn zone_offset_follows_zone() {
        let provider = ZoneOffset(chrono_tz::Asia::Kolkata);
        assert_eq!(provider.current_offset().local_minus_utc(), 5 * 3600 + 1800);
        assert_eq!(provider.now().offset().local_minus_utc(), 5 * 3600 + 1800);
    }
}
