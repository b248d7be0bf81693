//! xs:date / xs:time / xs:dateTime values and their lexical parsers.
//!
//! Parsing is done with a byte cursor, one field at a time, so every
//! rejection rule (field ranges, day-of-month maximums, timezone bounds,
//! trailing garbage) is checked where the field is read.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// xs:dateTime
#[derive(Debug, Clone)]
pub struct DateTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: f64,
    pub timezone: Option<Timezone>,
}

/// xs:date
#[derive(Debug, Clone)]
pub struct Date {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub timezone: Option<Timezone>,
}

/// xs:time
#[derive(Debug, Clone)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: f64,
    pub timezone: Option<Timezone>,
}

/// A signed hour/minute offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timezone {
    pub offset_minutes: i32,
}

/// A byte cursor over a lexical form.
#[derive(Clone)]
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(s: &'a str) -> Self {
        Self {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub(crate) fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn done(&self) -> bool {
        self.pos == self.bytes.len()
    }

    /// Reads exactly `n` decimal digits.
    pub(crate) fn fixed_digits(&mut self, n: usize) -> Option<u32> {
        let mut value: u32 = 0;
        for _ in 0..n {
            let b = self.peek()?;
            if !b.is_ascii_digit() {
                return None;
            }
            value = value * 10 + u32::from(b - b'0');
            self.pos += 1;
        }
        Some(value)
    }

    /// Reads one or more decimal digits, returning the value and how many
    /// digits were consumed. Fails on overflow.
    pub(crate) fn digits(&mut self) -> Option<(u64, usize)> {
        let start = self.pos;
        let mut value: u64 = 0;
        while let Some(b) = self.peek() {
            if !b.is_ascii_digit() {
                break;
            }
            value = value.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
            self.pos += 1;
        }
        if self.pos == start {
            None
        } else {
            Some((value, self.pos - start))
        }
    }

    /// Reads a decimal number with an optional fractional part.
    pub(crate) fn fractional(&mut self) -> Option<f64> {
        let (whole, _) = self.digits()?;
        let mut value = whole as f64;
        if self.eat(b'.') {
            let (frac, count) = self.digits()?;
            value += frac as f64 / 10f64.powi(count as i32);
        }
        Some(value)
    }
}

/// Reads a year field: optional leading `-`, then at least four digits.
/// Five or more digits must not begin with a zero.
fn parse_year(cur: &mut Cursor) -> Option<i32> {
    let negative = cur.eat(b'-');
    let leading_zero = cur.peek() == Some(b'0');
    let (value, count) = cur.digits()?;
    if count < 4 || (count > 4 && leading_zero) {
        return None;
    }
    let year = i32::try_from(value).ok()?;
    if year == 0 {
        return None;
    }
    Some(if negative { -year } else { year })
}

fn parse_date_fields(cur: &mut Cursor) -> Option<(i32, u8, u8)> {
    let year = parse_year(cur)?;
    if !cur.eat(b'-') {
        return None;
    }
    let month = cur.fixed_digits(2)?;
    if !(1..=12).contains(&month) {
        return None;
    }
    if !cur.eat(b'-') {
        return None;
    }
    let day = cur.fixed_digits(2)?;
    if day < 1 || day > u32::from(days_in_month(year, month as u8)) {
        return None;
    }
    Some((year, month as u8, day as u8))
}

fn parse_time_fields(cur: &mut Cursor) -> Option<(u8, u8, f64)> {
    let hour = cur.fixed_digits(2)?;
    if !cur.eat(b':') {
        return None;
    }
    let minute = cur.fixed_digits(2)?;
    if !cur.eat(b':') {
        return None;
    }
    let second = cur.fractional()?;
    if minute > 59 || second >= 60.0 {
        return None;
    }
    // 24:00:00 is the only admitted form past hour 23.
    if hour > 24 || (hour == 24 && (minute != 0 || second != 0.0)) {
        return None;
    }
    Some((hour as u8, minute as u8, second))
}

/// Reads the optional timezone suffix. `Ok(None)` means no suffix.
fn parse_tz_suffix(cur: &mut Cursor) -> Option<Option<Timezone>> {
    match cur.peek() {
        None => Some(None),
        Some(b'Z') => {
            cur.eat(b'Z');
            Some(Some(Timezone { offset_minutes: 0 }))
        }
        Some(b'+') | Some(b'-') => {
            let sign = if cur.eat(b'+') {
                1
            } else {
                cur.eat(b'-');
                -1
            };
            let hours = cur.fixed_digits(2)?;
            if !cur.eat(b':') {
                return None;
            }
            let minutes = cur.fixed_digits(2)?;
            if hours > 14 || minutes > 59 || (hours == 14 && minutes != 0) {
                return None;
            }
            Some(Some(Timezone {
                offset_minutes: sign * (hours as i32 * 60 + minutes as i32),
            }))
        }
        Some(_) => Some(None),
    }
}

pub(crate) fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub(crate) fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Days from 1970-01-01 for a civil date, valid over the whole i32 year
/// range. Howard Hinnant's civil-calendar algorithm.
pub(crate) fn days_from_civil(year: i32, month: u8, day: u8) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u64;
    let mp = if month > 2 {
        u64::from(month) - 3
    } else {
        u64::from(month) + 9
    };
    let doy = (153 * mp + 2) / 5 + u64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe as i64 - 719_468
}

/// Whole seconds since the epoch plus nanoseconds, with a missing
/// timezone read as UTC. Used for ordering and equality only; the
/// serialized form keeps the original (absent) timezone.
fn instant_key(
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: f64,
    timezone: Option<Timezone>,
) -> (i64, u32) {
    let tz_minutes = timezone.map_or(0, |t| t.offset_minutes);
    let secs = days_from_civil(year, month, day) * 86_400
        + i64::from(hour) * 3_600
        + i64::from(minute) * 60
        + second.trunc() as i64
        - i64::from(tz_minutes) * 60;
    let nanos = (second.fract() * 1e9).round() as u32;
    (secs, nanos)
}

/// Canonical seconds field: two-digit whole part, fraction without
/// trailing zeros.
fn format_seconds(second: f64) -> String {
    if second.fract() == 0.0 {
        format!("{:02}", second as u8)
    } else {
        let s = format!("{:012.9}", second);
        s.trim_end_matches('0').to_string()
    }
}

impl DateTime {
    pub fn parse(s: &str) -> Option<Self> {
        let mut cur = Cursor::new(s.trim());
        let (year, month, day) = parse_date_fields(&mut cur)?;
        if !cur.eat(b'T') {
            return None;
        }
        let (hour, minute, second) = parse_time_fields(&mut cur)?;
        let timezone = parse_tz_suffix(&mut cur)?;
        if !cur.done() {
            return None;
        }
        Some(DateTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
            timezone,
        })
    }

    pub fn date(&self) -> Date {
        Date {
            year: self.year,
            month: self.month,
            day: self.day,
            timezone: self.timezone,
        }
    }

    pub fn time(&self) -> Time {
        Time {
            hour: self.hour,
            minute: self.minute,
            second: self.second,
            timezone: self.timezone,
        }
    }

    fn key(&self) -> (i64, u32) {
        instant_key(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.timezone,
        )
    }
}

impl PartialEq for DateTime {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
impl Eq for DateTime {}

impl PartialOrd for DateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.key().cmp(&other.key()))
    }
}

impl Hash for DateTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tz = self.timezone.map(|t| t.to_string()).unwrap_or_default();
        if self.year < 0 {
            write!(f, "-")?;
        }
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{}{}",
            self.year.unsigned_abs(),
            self.month,
            self.day,
            self.hour,
            self.minute,
            format_seconds(self.second),
            tz
        )
    }
}

impl Date {
    pub fn parse(s: &str) -> Option<Self> {
        let mut cur = Cursor::new(s.trim());
        let (year, month, day) = parse_date_fields(&mut cur)?;
        let timezone = parse_tz_suffix(&mut cur)?;
        if !cur.done() {
            return None;
        }
        Some(Date {
            year,
            month,
            day,
            timezone,
        })
    }

    pub fn at_midnight(&self) -> DateTime {
        DateTime {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: 0,
            minute: 0,
            second: 0.0,
            timezone: self.timezone,
        }
    }

    fn key(&self) -> (i64, u32) {
        instant_key(self.year, self.month, self.day, 0, 0, 0.0, self.timezone)
    }
}

impl PartialEq for Date {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
impl Eq for Date {}

impl PartialOrd for Date {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.key().cmp(&other.key()))
    }
}

impl Hash for Date {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tz = self.timezone.map(|t| t.to_string()).unwrap_or_default();
        if self.year < 0 {
            write!(f, "-")?;
        }
        write!(
            f,
            "{:04}-{:02}-{:02}{}",
            self.year.unsigned_abs(),
            self.month,
            self.day,
            tz
        )
    }
}

impl Time {
    pub fn parse(s: &str) -> Option<Self> {
        let mut cur = Cursor::new(s.trim());
        let (hour, minute, second) = parse_time_fields(&mut cur)?;
        let timezone = parse_tz_suffix(&mut cur)?;
        if !cur.done() {
            return None;
        }
        Some(Time {
            hour,
            minute,
            second,
            timezone,
        })
    }

    fn key(&self) -> (i64, u32) {
        let tz_minutes = self.timezone.map_or(0, |t| t.offset_minutes);
        let secs = i64::from(self.hour) * 3_600 + i64::from(self.minute) * 60
            + self.second.trunc() as i64
            - i64::from(tz_minutes) * 60;
        let nanos = (self.second.fract() * 1e9).round() as u32;
        (secs, nanos)
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.key().cmp(&other.key()))
    }
}

impl Hash for Time {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tz = self.timezone.map(|t| t.to_string()).unwrap_or_default();
        write!(
            f,
            "{:02}:{:02}:{}{}",
            self.hour,
            self.minute,
            format_seconds(self.second),
            tz
        )
    }
}

impl Timezone {
    pub fn parse(s: &str) -> Option<Self> {
        let mut cur = Cursor::new(s);
        let tz = parse_tz_suffix(&mut cur)??;
        if !cur.done() {
            return None;
        }
        Some(tz)
    }

    /// The offset as a day-time duration, the form the accessor
    /// functions hand back to callers.
    pub fn as_duration(&self) -> super::Duration {
        let abs = self.offset_minutes.unsigned_abs();
        super::Duration::new(
            self.offset_minutes < 0,
            0,
            0,
            0,
            abs / 60,
            abs % 60,
            0.0,
        )
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.offset_minutes == 0 {
            write!(f, "Z")
        } else {
            let sign = if self.offset_minutes >= 0 { '+' } else { '-' };
            let abs_minutes = self.offset_minutes.abs();
            write!(f, "{}{:02}:{:02}", sign, abs_minutes / 60, abs_minutes % 60)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_datetime_roundtrip() {
        let dt = DateTime::parse("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(dt.to_string(), "2024-01-01T00:00:00Z");

        let dt = DateTime::parse("2024-06-15T09:30:01.25-05:00").unwrap();
        assert_eq!(dt.to_string(), "2024-06-15T09:30:01.25-05:00");
    }

    #[test]
    fn parse_date_and_time_roundtrip() {
        assert_eq!(
            Date::parse("2024-02-29").unwrap().to_string(),
            "2024-02-29"
        );
        assert_eq!(
            Time::parse("13:20:00+14:00").unwrap().to_string(),
            "13:20:00+14:00"
        );
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(Date::parse("2024-13-01").is_none());
        assert!(Date::parse("2024-00-01").is_none());
        assert!(Date::parse("2023-02-29").is_none());
        assert!(Date::parse("2024-04-31").is_none());
        assert!(Time::parse("25:00:00").is_none());
        assert!(Time::parse("24:00:01").is_none());
        assert!(Time::parse("10:60:00").is_none());
        assert!(DateTime::parse("2024-01-01T10:00:60").is_none());
    }

    #[test]
    fn rejects_bad_years() {
        assert!(Date::parse("024-01-01").is_none());
        // Five-digit years must not start with a zero.
        assert!(Date::parse("02024-01-01").is_none());
        assert!(Date::parse("12024-01-01").is_some());
        assert!(Date::parse("0000-01-01").is_none());
        assert!(Date::parse("-0753-04-21").is_some());
    }

    #[test]
    fn rejects_bad_timezones() {
        assert!(Timezone::parse("+15:00").is_none());
        assert!(Timezone::parse("+14:30").is_none());
        assert!(Timezone::parse("+10:60").is_none());
        assert!(Timezone::parse("Z ").is_none());
        assert_eq!(Timezone::parse("-05:00").unwrap().offset_minutes, -300);
        assert_eq!(Timezone::parse("Z").unwrap().offset_minutes, 0);
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(Date::parse("2024-01-01x").is_none());
        assert!(DateTime::parse("2024-01-01T00:00:00Zx").is_none());
        assert!(Time::parse("10:00:00.5.5").is_none());
    }

    #[test]
    fn timezoneless_compares_as_utc() {
        let local = DateTime::parse("2024-01-01T00:00:00").unwrap();
        let utc = DateTime::parse("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(local, utc);
        // Serialization preserves the difference.
        assert_ne!(local.to_string(), utc.to_string());
    }

    #[test]
    fn timezone_ordering() {
        let east = DateTime::parse("2024-01-01T12:00:00+02:00").unwrap();
        let west = DateTime::parse("2024-01-01T12:00:00-02:00").unwrap();
        assert!(east < west);

        let a = Time::parse("09:00:00Z").unwrap();
        let b = Time::parse("08:00:00-05:00").unwrap();
        assert!(a < b);
    }

    #[test]
    fn far_years_compare_correctly() {
        let a = DateTime::parse("12024-01-01T00:00:00Z").unwrap();
        let b = DateTime::parse("12024-01-02T00:00:00Z").unwrap();
        assert!(a < b);
        assert_eq!(a.to_string(), "12024-01-01T00:00:00Z");
    }

    #[test]
    fn civil_day_numbers() {
        assert_eq!(days_from_civil(1970, 1, 1), 0);
        assert_eq!(days_from_civil(1970, 1, 2), 1);
        assert_eq!(days_from_civil(1969, 12, 31), -1);
        assert_eq!(days_from_civil(2000, 3, 1), 11017);
    }
}
