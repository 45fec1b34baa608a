// LogAtlas - core/field.rs
//
// Field declarations and scalar coercion for positional records.
//
// Each record kind declares an ordered table of `FieldSpec`s. A spec names
// the field, its declared scalar kind, the raw tokens that count as "absent"
// (blankish), and the coercion function applied to the raw capture. Most
// fields use `coerce_default`; a field that needs special handling swaps in
// its own function, which may pre-process the raw text and then defer to the
// generic constructors below.

use crate::util::error::{CoercionFailure, FieldCoercionError};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use std::fmt;

/// Declared scalar type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Time,
}

/// A coerced field value, before it is moved into its typed record slot.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// No capture, or a blankish token.
    Absent,
    Text(String),
    Integer(i64),
    Float(f64),
    Time(DateTime<FixedOffset>),
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_integer(self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn into_float(self) -> Option<f64> {
        match self {
            FieldValue::Float(n) => Some(n),
            _ => None,
        }
    }

    pub fn into_time(self) -> Option<DateTime<FixedOffset>> {
        match self {
            FieldValue::Time(t) => Some(t),
            _ => None,
        }
    }
}

/// Signature of a per-field coercion hook.
pub type Coercion = fn(&FieldSpec, Option<&str>) -> Result<FieldValue, FieldCoercionError>;

/// Declaration of one positional field.
#[derive(Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Raw tokens that coerce to `FieldValue::Absent` instead of being parsed.
    pub blankish: &'static [&'static str],
    pub coerce: Coercion,
}

impl FieldSpec {
    /// A field with no blankish tokens and the default coercion.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            blankish: &[],
            coerce: coerce_default,
        }
    }

    pub fn is_blankish(&self, raw: &str) -> bool {
        self.blankish.iter().any(|token| *token == raw)
    }

    /// Run this field's coercion hook on a raw capture.
    pub fn receive(&self, raw: Option<&str>) -> Result<FieldValue, FieldCoercionError> {
        (self.coerce)(self, raw)
    }

    pub fn error(&self, raw: Option<&str>, reason: CoercionFailure) -> FieldCoercionError {
        FieldCoercionError::new(self.name, raw, reason)
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("blankish", &self.blankish)
            .finish()
    }
}

// =============================================================================
// Generic coercion
// =============================================================================

/// Default coercion by declared kind: text passes through, numbers are
/// parsed, timestamps go through `coerce_time_str`.
///
/// An absent capture or a blankish token yields `FieldValue::Absent`. Text
/// fields without blankish tokens keep empty strings as-is; numeric fields
/// without them reject empty strings.
pub fn coerce_default(
    spec: &FieldSpec,
    raw: Option<&str>,
) -> Result<FieldValue, FieldCoercionError> {
    let Some(value) = raw.filter(|r| !spec.is_blankish(r)) else {
        return Ok(FieldValue::Absent);
    };

    match spec.kind {
        FieldKind::Text => Ok(FieldValue::Text(value.to_string())),
        FieldKind::Integer => value
            .trim()
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| spec.error(raw, CoercionFailure::InvalidInteger)),
        FieldKind::Float => value
            .trim()
            .parse::<f64>()
            .map(FieldValue::Float)
            .map_err(|_| spec.error(raw, CoercionFailure::InvalidFloat)),
        FieldKind::Time => coerce_time_str(value)
            .map(FieldValue::Time)
            .ok_or_else(|| spec.error(raw, CoercionFailure::InvalidTimestamp)),
    }
}

/// Generic timestamp coercion from a free-form string.
///
/// Accepts RFC 3339, the Apache `DD/Mon/YYYY:HH:MM:SS +ZZZZ` form, and
/// `YYYY-MM-DD HH:MM:SS +ZZZZ`. All forms must carry an explicit offset.
pub fn coerce_time_str(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt);
    }

    ["%d/%b/%Y:%H:%M:%S %z", "%Y-%m-%d %H:%M:%S %z"]
        .iter()
        .find_map(|format| DateTime::parse_from_str(trimmed, format).ok())
}

/// Numeric components of a timestamp plus its offset written as `±HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub utc_offset: String,
}

impl TimeParts {
    /// Generic timestamp constructor. `None` for impossible dates, times, or
    /// offsets.
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let offset = parse_utc_offset(&self.utc_offset)?;
        let naive = NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(
            self.hour,
            self.minute,
            self.second,
        )?;
        offset.from_local_datetime(&naive).single()
    }
}

/// Parse a `±HH:MM` offset string.
pub fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3_600 + minutes * 60))
}
