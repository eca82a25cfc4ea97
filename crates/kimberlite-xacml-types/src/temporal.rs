//! XML Schema calendar and duration values.
//!
//! Calendar values keep their optional zone offset separately from the local
//! value so that `2024-01-01` and `2024-01-01Z` stay distinct, as XML Schema
//! requires. Durations are normalized to a signed total so that `PT60S` and
//! `PT1M` compare equal.

use std::fmt::{self, Display};

use chrono::{Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::datatype::DataType;
use crate::error::ValueError;

// ============================================================================
// Zone offsets
// ============================================================================

/// Splits a trailing `Z` or `[+-]hh:mm` zone designator off `text`.
fn split_zone(text: &str) -> (&str, Option<&str>) {
    if let Some(body) = text.strip_suffix('Z') {
        return (body, Some("Z"));
    }
    let bytes = text.as_bytes();
    let len = bytes.len();
    if len >= 6 && matches!(bytes[len - 6], b'+' | b'-') && bytes[len - 3] == b':' {
        let (body, zone) = text.split_at(len - 6);
        return (body, Some(zone));
    }
    (text, None)
}

fn parse_offset(zone: &str) -> Option<FixedOffset> {
    if zone == "Z" {
        return FixedOffset::east_opt(0);
    }
    let sign = match zone.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let (hours, minutes) = zone[1..].split_once(':')?;
    let hours = parse_fixed_digits(hours, 2)?;
    let minutes = parse_fixed_digits(minutes, 2)?;
    if hours > 14 || minutes > 59 || (hours == 14 && minutes != 0) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours as i32 * 3600 + minutes as i32 * 60))
}

fn format_offset(offset: FixedOffset, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let seconds = offset.local_minus_utc();
    if seconds == 0 {
        return f.write_str("Z");
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;
    write!(f, "{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Parses exactly `width` ASCII digits.
fn parse_fixed_digits(text: &str, width: usize) -> Option<u32> {
    if text.len() != width || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

// ============================================================================
// Calendar values
// ============================================================================

fn parse_naive_date(text: &str) -> Option<NaiveDate> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let mut parts = rest.splitn(3, '-');
    let year = parts.next()?;
    let month = parse_fixed_digits(parts.next()?, 2)?;
    let day = parse_fixed_digits(parts.next()?, 2)?;
    if year.len() < 4 || (year.len() > 4 && year.starts_with('0')) {
        return None;
    }
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(if negative { -year } else { year }, month, day)
}

/// Parses `hh:mm:ss(.f)?`. The flag is set for `24:00:00`, which is
/// midnight at the end of the day.
fn parse_naive_time(text: &str) -> Option<(NaiveTime, bool)> {
    let (clock, fraction) = match text.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (text, None),
    };
    let mut parts = clock.splitn(3, ':');
    let hour = parse_fixed_digits(parts.next()?, 2)?;
    let minute = parse_fixed_digits(parts.next()?, 2)?;
    let second = parse_fixed_digits(parts.next()?, 2)?;
    let nanos = match fraction {
        Some(digits) => parse_fraction(digits)?,
        None => 0,
    };
    if hour == 24 && minute == 0 && second == 0 && nanos == 0 {
        return NaiveTime::from_hms_opt(0, 0, 0).map(|time| (time, true));
    }
    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos).map(|time| (time, false))
}

/// Fractional seconds to nanoseconds; digits past the ninth are truncated.
fn parse_fraction(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let significant = &digits[..digits.len().min(9)];
    let scale = 10u32.pow(9 - significant.len() as u32);
    significant.parse::<u32>().ok().map(|n| n * scale)
}

fn format_time(time: NaiveTime, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
        f,
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    )?;
    format_nanos(time.nanosecond(), f)
}

fn format_nanos(nanos: u32, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if nanos == 0 {
        return Ok(());
    }
    let digits = format!("{nanos:09}");
    write!(f, ".{}", digits.trim_end_matches('0'))
}

fn format_date(date: NaiveDate, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let year = date.year();
    if year < 0 {
        write!(f, "-{:04}", year.unsigned_abs())?;
    } else {
        write!(f, "{year:04}")?;
    }
    write!(f, "-{:02}-{:02}", date.month(), date.day())
}

/// An `xs:date` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XacmlDate {
    pub date: NaiveDate,
    pub offset: Option<FixedOffset>,
}

impl XacmlDate {
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::lexical(DataType::Date, text);
        let (body, zone) = split_zone(text);
        let date = parse_naive_date(body).ok_or_else(invalid)?;
        let offset = zone.map(parse_offset).map(|o| o.ok_or_else(invalid)).transpose()?;
        Ok(Self { date, offset })
    }
}

impl Display for XacmlDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_date(self.date, f)?;
        match self.offset {
            Some(offset) => format_offset(offset, f),
            None => Ok(()),
        }
    }
}

/// An `xs:time` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XacmlTime {
    pub time: NaiveTime,
    pub offset: Option<FixedOffset>,
}

impl XacmlTime {
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::lexical(DataType::Time, text);
        let (body, zone) = split_zone(text);
        let (time, _) = parse_naive_time(body).ok_or_else(invalid)?;
        let offset = zone.map(parse_offset).map(|o| o.ok_or_else(invalid)).transpose()?;
        Ok(Self { time, offset })
    }
}

impl Display for XacmlTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_time(self.time, f)?;
        match self.offset {
            Some(offset) => format_offset(offset, f),
            None => Ok(()),
        }
    }
}

/// An `xs:dateTime` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XacmlDateTime {
    pub date_time: NaiveDateTime,
    pub offset: Option<FixedOffset>,
}

impl XacmlDateTime {
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::lexical(DataType::DateTime, text);
        let (body, zone) = split_zone(text);
        let (date, time) = body.split_once('T').ok_or_else(invalid)?;
        let date = parse_naive_date(date).ok_or_else(invalid)?;
        let (time, end_of_day) = parse_naive_time(time).ok_or_else(invalid)?;
        let date = if end_of_day {
            date.checked_add_days(Days::new(1)).ok_or_else(invalid)?
        } else {
            date
        };
        let offset = zone.map(parse_offset).map(|o| o.ok_or_else(invalid)).transpose()?;
        Ok(Self {
            date_time: date.and_time(time),
            offset,
        })
    }
}

impl Display for XacmlDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_date(self.date_time.date(), f)?;
        f.write_str("T")?;
        format_time(self.date_time.time(), f)?;
        match self.offset {
            Some(offset) => format_offset(offset, f),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Durations
// ============================================================================

/// Reads a run of digits followed by `designator`, advancing `rest`.
fn take_component(rest: &mut &str, designator: char) -> Option<Option<u64>> {
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 || !rest[end..].starts_with(designator) {
        return Some(None);
    }
    let value = rest[..end].parse().ok()?;
    *rest = &rest[end + designator.len_utf8()..];
    Some(Some(value))
}

/// An `xs:dayTimeDuration`, normalized to a signed total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DayTimeDuration {
    pub negative: bool,
    pub seconds: u64,
    pub nanos: u32,
}

impl DayTimeDuration {
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::lexical(DataType::DayTimeDuration, text);
        let overflow = || ValueError::OutOfRange {
            data_type: DataType::DayTimeDuration,
            value: text.to_string(),
        };

        let (negative, body) = match text.strip_prefix('-') {
            Some(body) => (true, body),
            None => (false, text),
        };
        let mut rest = body.strip_prefix('P').ok_or_else(invalid)?;

        let days = take_component(&mut rest, 'D').ok_or_else(overflow)?;
        let (mut hours, mut minutes, mut seconds, mut nanos) = (None, None, None, 0);
        if let Some(time) = rest.strip_prefix('T') {
            rest = time;
            hours = take_component(&mut rest, 'H').ok_or_else(overflow)?;
            minutes = take_component(&mut rest, 'M').ok_or_else(overflow)?;
            let end = rest.bytes().take_while(|b| b.is_ascii_digit() || *b == b'.').count();
            if end > 0 && rest[end..].starts_with('S') {
                let (whole, fraction) = match rest[..end].split_once('.') {
                    Some((whole, fraction)) => (whole, Some(fraction)),
                    None => (&rest[..end], None),
                };
                if whole.is_empty() {
                    return Err(invalid());
                }
                seconds = Some(whole.parse::<u64>().map_err(|_| overflow())?);
                if let Some(fraction) = fraction {
                    nanos = parse_fraction(fraction).ok_or_else(invalid)?;
                }
                rest = &rest[end + 1..];
            }
            if hours.is_none() && minutes.is_none() && seconds.is_none() {
                return Err(invalid());
            }
        }
        let empty = days.is_none() && hours.is_none() && minutes.is_none() && seconds.is_none();
        if !rest.is_empty() || empty {
            return Err(invalid());
        }

        let total = days
            .unwrap_or(0)
            .checked_mul(86_400)
            .and_then(|t| t.checked_add(hours.unwrap_or(0).checked_mul(3_600)?))
            .and_then(|t| t.checked_add(minutes.unwrap_or(0).checked_mul(60)?))
            .and_then(|t| t.checked_add(seconds.unwrap_or(0)))
            .ok_or_else(overflow)?;

        Ok(Self::new(negative, total, nanos))
    }

    /// Builds a duration; a zero length is never negative.
    pub fn new(negative: bool, seconds: u64, nanos: u32) -> Self {
        Self {
            negative: negative && (seconds != 0 || nanos != 0),
            seconds,
            nanos,
        }
    }
}

impl Display for DayTimeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str("P")?;
        if self.seconds == 0 && self.nanos == 0 {
            return f.write_str("T0S");
        }
        let days = self.seconds / 86_400;
        let hours = self.seconds % 86_400 / 3_600;
        let minutes = self.seconds % 3_600 / 60;
        let seconds = self.seconds % 60;
        if days > 0 {
            write!(f, "{days}D")?;
        }
        if hours == 0 && minutes == 0 && seconds == 0 && self.nanos == 0 {
            return Ok(());
        }
        f.write_str("T")?;
        if hours > 0 {
            write!(f, "{hours}H")?;
        }
        if minutes > 0 {
            write!(f, "{minutes}M")?;
        }
        if seconds > 0 || self.nanos > 0 {
            write!(f, "{seconds}")?;
            format_nanos(self.nanos, f)?;
            f.write_str("S")?;
        }
        Ok(())
    }
}

/// An `xs:yearMonthDuration`, normalized to a signed month count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct YearMonthDuration {
    pub negative: bool,
    pub months: u64,
}

impl YearMonthDuration {
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::lexical(DataType::YearMonthDuration, text);
        let overflow = || ValueError::OutOfRange {
            data_type: DataType::YearMonthDuration,
            value: text.to_string(),
        };

        let (negative, body) = match text.strip_prefix('-') {
            Some(body) => (true, body),
            None => (false, text),
        };
        let mut rest = body.strip_prefix('P').ok_or_else(invalid)?;
        let years = take_component(&mut rest, 'Y').ok_or_else(overflow)?;
        let months = take_component(&mut rest, 'M').ok_or_else(overflow)?;
        if !rest.is_empty() || (years.is_none() && months.is_none()) {
            return Err(invalid());
        }

        let total = years
            .unwrap_or(0)
            .checked_mul(12)
            .and_then(|t| t.checked_add(months.unwrap_or(0)))
            .ok_or_else(overflow)?;
        Ok(Self::new(negative, total))
    }

    pub fn new(negative: bool, months: u64) -> Self {
        Self {
            negative: negative && months != 0,
            months,
        }
    }
}

impl Display for YearMonthDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        let (years, months) = (self.months / 12, self.months % 12);
        match (years, months) {
            (0, months) => write!(f, "P{months}M"),
            (years, 0) => write!(f, "P{years}Y"),
            (years, months) => write!(f, "P{years}Y{months}M"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("2024-02-29", "2024-02-29"; "leap day")]
    #[test_case("2024-01-01Z", "2024-01-01Z"; "utc")]
    #[test_case("2024-01-01+00:00", "2024-01-01Z"; "zero offset")]
    #[test_case("2024-01-01-05:00", "2024-01-01-05:00"; "negative offset")]
    fn test_date_canonical(text: &str, expected: &str) {
        assert_eq!(XacmlDate::parse(text).unwrap().to_string(), expected);
    }

    #[test_case("2023-02-29"; "not a leap year")]
    #[test_case("2024-1-01"; "short month")]
    #[test_case("24-01-01"; "short year")]
    #[test_case("2024-01-01+15:00"; "offset too large")]
    #[test_case("2024-01-01T00:00:00"; "date time")]
    fn test_date_rejects(text: &str) {
        assert!(XacmlDate::parse(text).is_err());
    }

    #[test]
    fn test_zone_is_significant() {
        assert_ne!(
            XacmlDate::parse("2024-01-01").unwrap(),
            XacmlDate::parse("2024-01-01Z").unwrap()
        );
    }

    #[test_case("12:30:00", "12:30:00"; "plain")]
    #[test_case("12:30:00.500", "12:30:00.5"; "trailing zeros trimmed")]
    #[test_case("24:00:00", "00:00:00"; "end of day")]
    #[test_case("08:00:00+02:00", "08:00:00+02:00"; "offset")]
    fn test_time_canonical(text: &str, expected: &str) {
        assert_eq!(XacmlTime::parse(text).unwrap().to_string(), expected);
    }

    #[test_case("25:00:00"; "hour out of range")]
    #[test_case("12:30"; "missing seconds")]
    #[test_case("12:30:00."; "empty fraction")]
    fn test_time_rejects(text: &str) {
        assert!(XacmlTime::parse(text).is_err());
    }

    #[test]
    fn test_date_time_round_trip() {
        let parsed = XacmlDateTime::parse("2002-05-30T09:30:10.25-06:00").unwrap();
        assert_eq!(parsed.to_string(), "2002-05-30T09:30:10.25-06:00");
        assert!(XacmlDateTime::parse("2002-05-30 09:30:10").is_err());
    }

    #[test_case("2024-01-01T24:00:00", "2024-01-02T00:00:00"; "next day")]
    #[test_case("2024-02-28T24:00:00Z", "2024-02-29T00:00:00Z"; "leap day")]
    #[test_case("2023-12-31T24:00:00+01:00", "2024-01-01T00:00:00+01:00"; "next year")]
    fn test_date_time_end_of_day_rolls_over(text: &str, expected: &str) {
        let parsed = XacmlDateTime::parse(text).unwrap();
        assert_eq!(parsed.to_string(), expected);
        assert_eq!(parsed, XacmlDateTime::parse(expected).unwrap());
    }

    #[test_case("P1DT2H3M4.5S", "P1DT2H3M4.5S"; "full")]
    #[test_case("PT60S", "PT1M"; "seconds carry")]
    #[test_case("PT36H", "P1DT12H"; "hours carry")]
    #[test_case("-PT0S", "PT0S"; "negative zero")]
    #[test_case("P0D", "PT0S"; "zero days")]
    #[test_case("-P2D", "-P2D"; "negative days")]
    fn test_day_time_duration_canonical(text: &str, expected: &str) {
        assert_eq!(DayTimeDuration::parse(text).unwrap().to_string(), expected);
    }

    #[test_case("P"; "no components")]
    #[test_case("PT"; "empty time part")]
    #[test_case("P1Y"; "year component")]
    #[test_case("1D"; "missing designator")]
    #[test_case("PT1H2D"; "out of order")]
    fn test_day_time_duration_rejects(text: &str) {
        assert!(DayTimeDuration::parse(text).is_err());
    }

    #[test]
    fn test_equal_durations_compare_equal() {
        assert_eq!(
            DayTimeDuration::parse("PT1M").unwrap(),
            DayTimeDuration::parse("PT60S").unwrap()
        );
    }

    #[test_case("P1Y2M", "P1Y2M"; "both")]
    #[test_case("P14M", "P1Y2M"; "months carry")]
    #[test_case("P0Y", "P0M"; "zero")]
    #[test_case("-P3M", "-P3M"; "negative")]
    fn test_year_month_duration_canonical(text: &str, expected: &str) {
        assert_eq!(YearMonthDuration::parse(text).unwrap().to_string(), expected);
    }

    #[test]
    fn test_year_month_duration_rejects_days() {
        assert!(YearMonthDuration::parse("P1D").is_err());
        assert!(YearMonthDuration::parse("P").is_err());
    }
}
