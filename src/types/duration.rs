//! xs:duration and its two ordered subtypes.
//!
//! A duration is a single sign over normalized magnitudes: overflowing
//! seconds roll into minutes, minutes into hours, hours into days, and
//! months into years at construction time.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::calendar::Cursor;

#[derive(Debug, Clone)]
pub struct Duration {
    pub negative: bool,
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: f64,
}

/// Which component designators a lexical form may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Designators {
    All,
    DayTime,
    YearMonth,
}

impl Duration {
    /// Builds a duration, rolling overflowing fields upward.
    pub fn new(
        negative: bool,
        years: u32,
        months: u32,
        days: u32,
        hours: u32,
        minutes: u32,
        seconds: f64,
    ) -> Self {
        let mut minutes = u64::from(minutes) + (seconds / 60.0).floor() as u64;
        let seconds = seconds % 60.0;
        let mut hours = u64::from(hours) + minutes / 60;
        minutes %= 60;
        let days = u64::from(days) + hours / 24;
        hours %= 24;
        let years = years + months / 12;
        let months = months % 12;
        Self {
            negative,
            years,
            months,
            days: days as u32,
            hours: hours as u32,
            minutes: minutes as u32,
            seconds,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::parse_with(s, Designators::All)
    }

    /// Parses the xs:dayTimeDuration lexical space (no Y or M date
    /// components).
    pub fn parse_day_time(s: &str) -> Option<Self> {
        Self::parse_with(s, Designators::DayTime)
    }

    /// Parses the xs:yearMonthDuration lexical space (no D or time
    /// components).
    pub fn parse_year_month(s: &str) -> Option<Self> {
        Self::parse_with(s, Designators::YearMonth)
    }

    fn parse_with(s: &str, allow: Designators) -> Option<Self> {
        let mut cur = Cursor::new(s.trim());
        let negative = cur.eat(b'-');
        if !cur.eat(b'P') {
            return None;
        }

        let mut years = 0u32;
        let mut months = 0u32;
        let mut days = 0u32;
        let mut hours = 0u32;
        let mut minutes = 0u32;
        let mut seconds = 0.0f64;
        let mut components = 0;

        // Date components, in fixed Y M D order.
        if allow != Designators::DayTime {
            if let Some(v) = date_component(&mut cur, b'Y')? {
                years = v;
                components += 1;
            }
            if let Some(v) = date_component(&mut cur, b'M')? {
                months = v;
                components += 1;
            }
        }
        if allow != Designators::YearMonth {
            if let Some(v) = date_component(&mut cur, b'D')? {
                days = v;
                components += 1;
            }
        }

        // Time components after a mandatory T, in fixed H M S order.
        if allow != Designators::YearMonth && cur.eat(b'T') {
            let mut time_components = 0;
            if let Some(v) = date_component(&mut cur, b'H')? {
                hours = v;
                time_components += 1;
            }
            if let Some(v) = date_component(&mut cur, b'M')? {
                minutes = v;
                time_components += 1;
            }
            if let Some(v) = seconds_component(&mut cur)? {
                seconds = v;
                time_components += 1;
            }
            // A bare T with nothing after it is malformed.
            if time_components == 0 {
                return None;
            }
            components += time_components;
        }

        if components == 0 || !cur.done() {
            return None;
        }
        Some(Self::new(negative, years, months, days, hours, minutes, seconds))
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds == 0.0
    }

    pub fn has_year_month(&self) -> bool {
        self.years != 0 || self.months != 0
    }

    pub fn has_day_time(&self) -> bool {
        self.days != 0 || self.hours != 0 || self.minutes != 0 || self.seconds != 0.0
    }

    /// Signed month count of the year/month part.
    pub fn total_months(&self) -> i64 {
        let months = i64::from(self.years) * 12 + i64::from(self.months);
        if self.negative { -months } else { months }
    }

    /// Signed second count of the day/time part.
    pub fn total_seconds(&self) -> f64 {
        let secs = f64::from(self.days) * 86_400.0
            + f64::from(self.hours) * 3_600.0
            + f64::from(self.minutes) * 60.0
            + self.seconds;
        if self.negative { -secs } else { secs }
    }

    /// Keeps only the day/time part, the `xs:duration` to
    /// `xs:dayTimeDuration` cast.
    pub fn day_time_part(&self) -> Self {
        Self {
            negative: self.negative,
            years: 0,
            months: 0,
            ..self.clone()
        }
    }

    /// Keeps only the year/month part, the `xs:duration` to
    /// `xs:yearMonthDuration` cast.
    pub fn year_month_part(&self) -> Self {
        Self {
            negative: self.negative,
            years: self.years,
            months: self.months,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0.0,
        }
    }

    fn key(&self) -> (i64, f64) {
        (self.total_months(), self.total_seconds())
    }
}

/// One `<digits><designator>` component; `Ok(None)` when the designator
/// is absent.
fn date_component(cur: &mut Cursor, designator: u8) -> Option<Option<u32>> {
    let Some(b) = cur.peek() else {
        return Some(None);
    };
    if !b.is_ascii_digit() {
        return Some(None);
    }
    // Digits must belong to this component only if its designator
    // follows; otherwise leave them for the next component.
    let mut lookahead = cur.clone();
    let (value, _) = lookahead.digits()?;
    if lookahead.peek() != Some(designator) {
        return Some(None);
    }
    lookahead.eat(designator);
    *cur = lookahead;
    u32::try_from(value).ok().map(Some)
}

/// The trailing `<decimal>S` component; only seconds admit a fraction.
fn seconds_component(cur: &mut Cursor) -> Option<Option<f64>> {
    let Some(b) = cur.peek() else {
        return Some(None);
    };
    if !b.is_ascii_digit() {
        return Some(None);
    }
    let value = cur.fractional()?;
    if !cur.eat(b'S') {
        return None;
    }
    Some(Some(value))
}

impl PartialEq for Duration {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
impl Eq for Duration {}

impl PartialOrd for Duration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let (am, asec) = self.key();
        let (bm, bsec) = other.key();
        match am.cmp(&bm) {
            Ordering::Equal => asec.partial_cmp(&bsec),
            other => Some(other),
        }
    }
}

impl Hash for Duration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.total_months().hash(state);
        self.total_seconds().to_bits().hash(state);
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "PT0S");
        }
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "P")?;
        if self.years != 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months != 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.hours != 0 || self.minutes != 0 || self.seconds != 0.0 {
            write!(f, "T")?;
            if self.hours != 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes != 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds != 0.0 {
                if self.seconds.fract() == 0.0 {
                    write!(f, "{}S", self.seconds as u32)?;
                } else {
                    write!(f, "{}S", self.seconds)?;
                }
            }
        }
        Ok(())
    }
}
