//! The atomic value lattice: one tagged union over the fixed set of
//! kinds, with casting and comparison as exhaustive matches.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use rust_decimal::Decimal;

use super::calendar::{Date, DateTime, Time};
use super::duration::Duration;
use crate::datasource::DataSourceNode;
use crate::error::XdmError;
use crate::format;
use crate::types::{XdmItem, XdmValue};

#[derive(Debug, Clone)]
pub enum AtomicValue {
    Boolean(bool),
    String(String),
    Untyped(String),
    UntypedAtomic(String),
    Decimal(Decimal),
    Integer(i64),
    Long(i64),
    Int(i32),
    Float(f32),
    Double(f64),
    Date(Date),
    DateTime(DateTime),
    Time(Time),
    Duration(Duration),
    DayTimeDuration(Duration),
    YearMonthDuration(Duration),
}

/// The type tags of [`AtomicValue`], used as cast targets and in
/// declared sequence types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomicKind {
    Boolean,
    String,
    Untyped,
    UntypedAtomic,
    Decimal,
    Integer,
    Long,
    Int,
    Float,
    Double,
    Date,
    DateTime,
    Time,
    Duration,
    DayTimeDuration,
    YearMonthDuration,
}

impl AtomicKind {
    pub fn name(&self) -> &'static str {
        match self {
            AtomicKind::Boolean => "xs:boolean",
            AtomicKind::String => "xs:string",
            AtomicKind::Untyped => "xs:untyped",
            AtomicKind::UntypedAtomic => "xs:untypedAtomic",
            AtomicKind::Decimal => "xs:decimal",
            AtomicKind::Integer => "xs:integer",
            AtomicKind::Long => "xs:long",
            AtomicKind::Int => "xs:int",
            AtomicKind::Float => "xs:float",
            AtomicKind::Double => "xs:double",
            AtomicKind::Date => "xs:date",
            AtomicKind::DateTime => "xs:dateTime",
            AtomicKind::Time => "xs:time",
            AtomicKind::Duration => "xs:duration",
            AtomicKind::DayTimeDuration => "xs:dayTimeDuration",
            AtomicKind::YearMonthDuration => "xs:yearMonthDuration",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let local = name.strip_prefix("xs:").unwrap_or(name);
        Some(match local {
            "boolean" => AtomicKind::Boolean,
            "string" => AtomicKind::String,
            "untyped" => AtomicKind::Untyped,
            "untypedAtomic" => AtomicKind::UntypedAtomic,
            "decimal" => AtomicKind::Decimal,
            "integer" => AtomicKind::Integer,
            "long" => AtomicKind::Long,
            "int" => AtomicKind::Int,
            "float" => AtomicKind::Float,
            "double" => AtomicKind::Double,
            "date" => AtomicKind::Date,
            "dateTime" => AtomicKind::DateTime,
            "time" => AtomicKind::Time,
            "duration" => AtomicKind::Duration,
            "dayTimeDuration" => AtomicKind::DayTimeDuration,
            "yearMonthDuration" => AtomicKind::YearMonthDuration,
            _ => return None,
        })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            AtomicKind::Decimal
                | AtomicKind::Integer
                | AtomicKind::Long
                | AtomicKind::Int
                | AtomicKind::Float
                | AtomicKind::Double
        )
    }
}

impl fmt::Display for AtomicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl AtomicValue {
    pub fn kind(&self) -> AtomicKind {
        match self {
            AtomicValue::Boolean(_) => AtomicKind::Boolean,
            AtomicValue::String(_) => AtomicKind::String,
            AtomicValue::Untyped(_) => AtomicKind::Untyped,
            AtomicValue::UntypedAtomic(_) => AtomicKind::UntypedAtomic,
            AtomicValue::Decimal(_) => AtomicKind::Decimal,
            AtomicValue::Integer(_) => AtomicKind::Integer,
            AtomicValue::Long(_) => AtomicKind::Long,
            AtomicValue::Int(_) => AtomicKind::Int,
            AtomicValue::Float(_) => AtomicKind::Float,
            AtomicValue::Double(_) => AtomicKind::Double,
            AtomicValue::Date(_) => AtomicKind::Date,
            AtomicValue::DateTime(_) => AtomicKind::DateTime,
            AtomicValue::Time(_) => AtomicKind::Time,
            AtomicValue::Duration(_) => AtomicKind::Duration,
            AtomicValue::DayTimeDuration(_) => AtomicKind::DayTimeDuration,
            AtomicValue::YearMonthDuration(_) => AtomicKind::YearMonthDuration,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// The canonical lexical form of this value.
    pub fn serialize(&self) -> String {
        match self {
            AtomicValue::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            AtomicValue::String(s)
            | AtomicValue::Untyped(s)
            | AtomicValue::UntypedAtomic(s) => s.clone(),
            AtomicValue::Decimal(d) => format::format_decimal(d),
            AtomicValue::Integer(i) | AtomicValue::Long(i) => i.to_string(),
            AtomicValue::Int(i) => i.to_string(),
            AtomicValue::Float(v) => format::format_float(*v),
            AtomicValue::Double(v) => format::format_double(*v),
            AtomicValue::Date(d) => d.to_string(),
            AtomicValue::DateTime(dt) => dt.to_string(),
            AtomicValue::Time(t) => t.to_string(),
            AtomicValue::Duration(d)
            | AtomicValue::DayTimeDuration(d)
            | AtomicValue::YearMonthDuration(d) => d.to_string(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind().is_numeric()
    }

    /// The effective boolean value of this value as a singleton.
    pub fn to_boolean(&self) -> bool {
        match self {
            AtomicValue::Boolean(b) => *b,
            AtomicValue::String(s)
            | AtomicValue::Untyped(s)
            | AtomicValue::UntypedAtomic(s) => !s.is_empty(),
            AtomicValue::Decimal(d) => !d.is_zero(),
            AtomicValue::Integer(i) | AtomicValue::Long(i) => *i != 0,
            AtomicValue::Int(i) => *i != 0,
            AtomicValue::Float(v) => *v != 0.0 && !v.is_nan(),
            AtomicValue::Double(v) => *v != 0.0 && !v.is_nan(),
            _ => true,
        }
    }

    /// The value under the `fn:number` rules: NaN for anything that is
    /// not a number and does not look like one.
    pub fn to_double(&self) -> f64 {
        match self {
            AtomicValue::Double(v) => *v,
            AtomicValue::Float(v) => f64::from(*v),
            AtomicValue::Decimal(d) => d.to_string().parse().unwrap_or(f64::NAN),
            AtomicValue::Integer(i) | AtomicValue::Long(i) => *i as f64,
            AtomicValue::Int(i) => f64::from(*i),
            AtomicValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            AtomicValue::String(s)
            | AtomicValue::Untyped(s)
            | AtomicValue::UntypedAtomic(s) => parse_double(s).unwrap_or(f64::NAN),
            _ => f64::NAN,
        }
    }

    /// Exact integer view of a numeric value, `None` for non-integral
    /// or non-finite values.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            AtomicValue::Integer(i) | AtomicValue::Long(i) => Some(*i),
            AtomicValue::Int(i) => Some(i64::from(*i)),
            AtomicValue::Decimal(d) => {
                if d.fract().is_zero() {
                    d.trunc().to_string().parse().ok()
                } else {
                    None
                }
            }
            AtomicValue::Double(v) => {
                if v.is_finite() && v.fract() == 0.0 {
                    Some(*v as i64)
                } else {
                    None
                }
            }
            AtomicValue::Float(v) => {
                if v.is_finite() && v.fract() == 0.0 {
                    Some(i64::from(*v as i32))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Casts this value to the target kind.
    ///
    /// Untyped values and strings re-enter through their lexical form;
    /// numeric targets follow the promotion order int ⊂ long ⊂ integer ⊂
    /// decimal → float → double, with bounds checks on the narrowing
    /// direction.
    pub fn cast(&self, target: AtomicKind) -> Result<AtomicValue, XdmError> {
        if self.kind() == target {
            return Ok(self.clone());
        }
        let fail = || XdmError::casting(self.serialize(), target.name());

        match target {
            AtomicKind::String => Ok(AtomicValue::String(self.serialize())),
            AtomicKind::Untyped => Ok(AtomicValue::Untyped(self.serialize())),
            AtomicKind::UntypedAtomic => Ok(AtomicValue::UntypedAtomic(self.serialize())),

            AtomicKind::Boolean => match self {
                AtomicValue::Decimal(_)
                | AtomicValue::Integer(_)
                | AtomicValue::Long(_)
                | AtomicValue::Int(_)
                | AtomicValue::Float(_)
                | AtomicValue::Double(_) => Ok(AtomicValue::Boolean(self.to_boolean())),
                AtomicValue::String(s)
                | AtomicValue::Untyped(s)
                | AtomicValue::UntypedAtomic(s) => match s.trim() {
                    "true" | "1" => Ok(AtomicValue::Boolean(true)),
                    "false" | "0" => Ok(AtomicValue::Boolean(false)),
                    _ => Err(fail()),
                },
                _ => Err(fail()),
            },

            AtomicKind::Decimal => self.cast_decimal().ok_or_else(fail).map(AtomicValue::Decimal),
            AtomicKind::Integer => self.cast_i64().ok_or_else(fail).map(AtomicValue::Integer),
            AtomicKind::Long => self.cast_i64().ok_or_else(fail).map(AtomicValue::Long),
            AtomicKind::Int => {
                let wide = self.cast_i64().ok_or_else(fail)?;
                i32::try_from(wide).map(AtomicValue::Int).map_err(|_| fail())
            }
            AtomicKind::Float => match self {
                AtomicValue::String(s)
                | AtomicValue::Untyped(s)
                | AtomicValue::UntypedAtomic(s) => {
                    parse_double(s).map(|v| AtomicValue::Float(v as f32)).ok_or_else(fail)
                }
                AtomicValue::Boolean(b) => Ok(AtomicValue::Float(if *b { 1.0 } else { 0.0 })),
                _ if self.is_numeric() => Ok(AtomicValue::Float(self.to_double() as f32)),
                _ => Err(fail()),
            },
            AtomicKind::Double => match self {
                AtomicValue::String(s)
                | AtomicValue::Untyped(s)
                | AtomicValue::UntypedAtomic(s) => {
                    parse_double(s).map(AtomicValue::Double).ok_or_else(fail)
                }
                AtomicValue::Boolean(b) => Ok(AtomicValue::Double(if *b { 1.0 } else { 0.0 })),
                _ if self.is_numeric() => Ok(AtomicValue::Double(self.to_double())),
                _ => Err(fail()),
            },

            AtomicKind::Date => match self {
                AtomicValue::DateTime(dt) => Ok(AtomicValue::Date(dt.date())),
                AtomicValue::String(s)
                | AtomicValue::Untyped(s)
                | AtomicValue::UntypedAtomic(s) => {
                    Date::parse(s).map(AtomicValue::Date).ok_or_else(fail)
                }
                _ => Err(fail()),
            },
            AtomicKind::DateTime => match self {
                AtomicValue::Date(d) => Ok(AtomicValue::DateTime(d.at_midnight())),
                AtomicValue::String(s)
                | AtomicValue::Untyped(s)
                | AtomicValue::UntypedAtomic(s) => {
                    DateTime::parse(s).map(AtomicValue::DateTime).ok_or_else(fail)
                }
                _ => Err(fail()),
            },
            AtomicKind::Time => match self {
                AtomicValue::DateTime(dt) => Ok(AtomicValue::Time(dt.time())),
                AtomicValue::String(s)
                | AtomicValue::Untyped(s)
                | AtomicValue::UntypedAtomic(s) => {
                    Time::parse(s).map(AtomicValue::Time).ok_or_else(fail)
                }
                _ => Err(fail()),
            },

            AtomicKind::Duration => match self {
                AtomicValue::DayTimeDuration(d) | AtomicValue::YearMonthDuration(d) => {
                    Ok(AtomicValue::Duration(d.clone()))
                }
                AtomicValue::String(s)
                | AtomicValue::Untyped(s)
                | AtomicValue::UntypedAtomic(s) => {
                    Duration::parse(s).map(AtomicValue::Duration).ok_or_else(fail)
                }
                _ => Err(fail()),
            },
            AtomicKind::DayTimeDuration => match self {
                AtomicValue::Duration(d) | AtomicValue::YearMonthDuration(d) => {
                    Ok(AtomicValue::DayTimeDuration(d.day_time_part()))
                }
                AtomicValue::String(s)
                | AtomicValue::Untyped(s)
                | AtomicValue::UntypedAtomic(s) => Duration::parse_day_time(s)
                    .map(AtomicValue::DayTimeDuration)
                    .ok_or_else(fail),
                _ => Err(fail()),
            },
            AtomicKind::YearMonthDuration => match self {
                AtomicValue::Duration(d) | AtomicValue::DayTimeDuration(d) => {
                    Ok(AtomicValue::YearMonthDuration(d.year_month_part()))
                }
                AtomicValue::String(s)
                | AtomicValue::Untyped(s)
                | AtomicValue::UntypedAtomic(s) => Duration::parse_year_month(s)
                    .map(AtomicValue::YearMonthDuration)
                    .ok_or_else(fail),
                _ => Err(fail()),
            },
        }
    }

    fn cast_decimal(&self) -> Option<Decimal> {
        match self {
            AtomicValue::Decimal(d) => Some(*d),
            AtomicValue::Integer(i) | AtomicValue::Long(i) => Some(Decimal::from(*i)),
            AtomicValue::Int(i) => Some(Decimal::from(*i)),
            // Float/double reach decimal through their shortest decimal
            // rendering; non-finite values have none.
            AtomicValue::Float(v) if v.is_finite() => Decimal::from_str(&v.to_string()).ok(),
            AtomicValue::Double(v) if v.is_finite() => Decimal::from_str(&v.to_string()).ok(),
            AtomicValue::Boolean(b) => Some(Decimal::from(u8::from(*b))),
            AtomicValue::String(s)
            | AtomicValue::Untyped(s)
            | AtomicValue::UntypedAtomic(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }

    fn cast_i64(&self) -> Option<i64> {
        match self {
            AtomicValue::Integer(i) | AtomicValue::Long(i) => Some(*i),
            AtomicValue::Int(i) => Some(i64::from(*i)),
            AtomicValue::Decimal(d) => d.trunc().to_string().parse().ok(),
            AtomicValue::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            AtomicValue::Double(v) if v.is_finite() => Some(v.trunc() as i64),
            AtomicValue::Boolean(b) => Some(i64::from(*b)),
            AtomicValue::String(s)
            | AtomicValue::Untyped(s)
            | AtomicValue::UntypedAtomic(s) => {
                let t = s.trim();
                t.strip_prefix('+').unwrap_or(t).parse().ok()
            }
            _ => None,
        }
    }
}

/// Parses the xs:double lexical space: the special tokens plus ordinary
/// decimal/scientific notation. Rust-specific spellings such as
/// `infinity` are rejected.
pub fn parse_double(s: &str) -> Option<f64> {
    let t = s.trim();
    match t {
        "INF" | "+INF" => return Some(f64::INFINITY),
        "-INF" => return Some(f64::NEG_INFINITY),
        "NaN" => return Some(f64::NAN),
        _ => {}
    }
    if t.contains(|c: char| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    t.parse().ok()
}

/// Constructor-function entry point: casts a singleton value to `kind`.
///
/// Node items contribute their string value; empty or multi-item input
/// is a casting error.
pub fn construct<N: DataSourceNode>(
    kind: AtomicKind,
    value: &XdmValue<N>,
) -> Result<XdmValue<N>, XdmError> {
    let items = value.items();
    if items.len() != 1 {
        return Err(XdmError::casting(
            format!("sequence of {} items", items.len()),
            kind.name(),
        ));
    }
    let atomic = item_as_atomic(&items[0], kind)?;
    Ok(XdmValue::from_atomic(atomic.cast(kind)?))
}

fn item_as_atomic<N: DataSourceNode>(
    item: &XdmItem<N>,
    target: AtomicKind,
) -> Result<AtomicValue, XdmError> {
    match item {
        XdmItem::Atomic(a) => Ok(a.clone()),
        XdmItem::Node(n) => Ok(AtomicValue::UntypedAtomic(n.string_value())),
        other => Err(XdmError::casting(other.type_name(), target.name())),
    }
}

/// Total order over comparable atomic pairs, `None` where the operands
/// are incomparable (including NaN).
pub fn compare_atomics(a: &AtomicValue, b: &AtomicValue) -> Option<Ordering> {
    use AtomicValue::*;
    match (a, b) {
        (Decimal(x), Decimal(y)) => Some(x.cmp(y)),
        (Integer(x) | Long(x), Integer(y) | Long(y)) => Some(x.cmp(y)),
        (Int(x), Int(y)) => Some(x.cmp(y)),
        _ if a.is_numeric() && b.is_numeric() => a.to_double().partial_cmp(&b.to_double()),

        (Boolean(x), Boolean(y)) => Some(x.cmp(y)),

        (
            String(x) | Untyped(x) | UntypedAtomic(x),
            String(y) | Untyped(y) | UntypedAtomic(y),
        ) => Some(x.cmp(y)),

        (Date(x), Date(y)) => x.partial_cmp(y),
        (DateTime(x), DateTime(y)) => x.partial_cmp(y),
        (Time(x), Time(y)) => x.partial_cmp(y),

        (
            Duration(x) | DayTimeDuration(x) | YearMonthDuration(x),
            Duration(y) | DayTimeDuration(y) | YearMonthDuration(y),
        ) => x.partial_cmp(y),

        _ => None,
    }
}

impl PartialEq for AtomicValue {
    fn eq(&self, other: &Self) -> bool {
        compare_atomics(self, other) == Some(Ordering::Equal)
    }
}

// Needed for use as a map key; NaN keys are unequal to themselves and
// therefore unreachable once inserted.
impl Eq for AtomicValue {}

impl Hash for AtomicValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use AtomicValue::*;
        // Grouped so cross-type equal values (1 vs 1.0, string vs
        // untypedAtomic) hash alike.
        match self {
            Boolean(b) => (0u8, *b).hash(state),
            String(s) | Untyped(s) | UntypedAtomic(s) => (1u8, s).hash(state),
            _ if self.is_numeric() => (2u8, self.to_double().to_bits()).hash(state),
            Date(d) => (3u8, d).hash(state),
            DateTime(dt) => (4u8, dt).hash(state),
            Time(t) => (5u8, t).hash(state),
            Duration(d) | DayTimeDuration(d) | YearMonthDuration(d) => (6u8, d).hash(state),
            // All numeric variants are covered by the guard above.
            Decimal(_) | Integer(_) | Long(_) | Int(_) | Float(_) | Double(_) => unreachable!(),
        }
    }
}

impl fmt::Display for AtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.serialize())
    }
}

impl From<bool> for AtomicValue {
    fn from(b: bool) -> Self {
        AtomicValue::Boolean(b)
    }
}

impl From<&str> for AtomicValue {
    fn from(s: &str) -> Self {
        AtomicValue::String(s.to_string())
    }
}

impl From<i64> for AtomicValue {
    fn from(i: i64) -> Self {
        AtomicValue::Integer(i)
    }
}

impl From<f64> for AtomicValue {
    fn from(v: f64) -> Self {
        AtomicValue::Double(v)
    }
}
