pub use time::Date;
use time::{
    format_description::well_known::Rfc3339, macros::format_description,
    OffsetDateTime, Time, UtcOffset,
};

pub type StaticDateFormat<'a> =
    &'static [time::format_description::BorrowedFormatItem<'a>];
pub type DynDateFormat = time::format_description::OwnedFormatItem;

pub const STANDARD_DATE_FORMAT: StaticDateFormat =
    format_description!("[year]-[month]-[day]");

pub fn parse_standard_date(date_str: &str) -> Result<Date, time::error::Parse> {
    Date::parse(date_str, STANDARD_DATE_FORMAT)
}

pub fn parse_dyn_date_format(fmt: &str) -> Result<DynDateFormat, String> {
    // The documentation recommends version 2
    const VERSION: usize = 2;
    time::format_description::parse_owned::<VERSION>(fmt)
        .map_err(|e| format!("{}", e))
}

/// Midnight UTC of the given calendar date.
pub fn utc_midnight(d: Date) -> OffsetDateTime {
    d.with_time(Time::MIDNIGHT).assume_utc()
}

/// Parses a transaction timestamp, normalized to UTC.
///
/// With a custom format, the value is parsed as a calendar date in that
/// format. Otherwise an RFC 3339 timestamp (any offset) is accepted, falling
/// back to a plain [year]-[month]-[day] date.
pub fn parse_utc_timestamp(
    s: &str,
    fmt: &Option<DynDateFormat>,
) -> Result<OffsetDateTime, String> {
    if let Some(fmt_) = fmt {
        return Date::parse(s, fmt_)
            .map(utc_midnight)
            .map_err(|e| e.to_string());
    }
    match OffsetDateTime::parse(s, &Rfc3339) {
        Ok(dt) => Ok(dt.to_offset(UtcOffset::UTC)),
        Err(_) => parse_standard_date(s)
            .map(utc_midnight)
            .map_err(|e| e.to_string()),
    }
}

// Used by both unit and integration tests
pub mod pub_testlib {
    use time::{Date, Duration, Month, OffsetDateTime};

    use super::utc_midnight;

    pub fn doy_date(year: u32, day: i64) -> Date {
        Date::from_calendar_date(year as i32, Month::January, 1)
            .unwrap()
            .saturating_add(Duration::days(day))
    }

    pub fn doy_datetime(year: u32, day: i64) -> OffsetDateTime {
        utc_midnight(doy_date(year, day))
    }
}
