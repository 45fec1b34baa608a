// LogAtlas - core/model.rs
//
// Core data model types for decoded access-log lines. Pure data definitions
// with no I/O and no platform dependencies.

use crate::core::field::{FieldKind, FieldSpec, FieldValue};
use crate::core::parser::receive_visit_time;
use crate::util::constants;
use crate::util::error::{CoercionFailure, DecodeError, FieldCoercionError};
use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::Serialize;

// =============================================================================
// Logline record
// =============================================================================

/// Positional field declarations for an access-log line, in capture order.
///
/// The decoder's grammar produces exactly one capture per entry here, in
/// this order. `LoglineRecord::from_positional` consumes them in lock-step.
pub static LOGLINE_FIELDS: [FieldSpec; 12] = [
    FieldSpec::new("ip", FieldKind::Text),
    FieldSpec::new("junk1", FieldKind::Text),
    FieldSpec::new("junk2", FieldKind::Text),
    FieldSpec {
        coerce: receive_visit_time,
        ..FieldSpec::new("visit_time", FieldKind::Time)
    },
    FieldSpec::new("http_method", FieldKind::Text),
    FieldSpec::new("path", FieldKind::Text),
    FieldSpec::new("protocol", FieldKind::Text),
    FieldSpec::new("response_code", FieldKind::Integer),
    FieldSpec {
        blankish: constants::SIZE_BLANKISH,
        ..FieldSpec::new("size", FieldKind::Integer)
    },
    FieldSpec::new("referer", FieldKind::Text),
    FieldSpec::new("ua", FieldKind::Text),
    FieldSpec {
        blankish: constants::CRUFT_BLANKISH,
        ..FieldSpec::new("cruft", FieldKind::Text)
    },
];

/// One decoded line of an Apache combined-format access log.
///
/// Immutable once constructed: every coercion happens inside
/// `from_positional`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoglineRecord {
    /// Client address.
    pub ip: String,

    /// Opaque placeholder columns (RFC 1413 identity and remote user).
    pub junk1: String,
    pub junk2: String,

    /// Request time with the offset it was logged in.
    pub visit_time: DateTime<FixedOffset>,

    /// Request line components. All `None` when the request line was `-`.
    pub http_method: Option<String>,
    pub path: Option<String>,
    pub protocol: Option<String>,

    pub response_code: i64,

    /// Body size in bytes. `None` when the log wrote `-`.
    pub size: Option<i64>,

    pub referer: String,
    pub ua: String,

    /// Anything after the user agent.
    pub cruft: Option<String>,
}

impl LoglineRecord {
    /// Build a record from raw captures ordered as `LOGLINE_FIELDS`.
    ///
    /// Each value runs through its field's coercion hook. Fields that the
    /// grammar always captures are required here too; an absent value for
    /// one of them is a `CoercionFailure::Missing`.
    pub fn from_positional(raw: &[Option<&str>]) -> Result<Self, DecodeError> {
        if raw.len() != LOGLINE_FIELDS.len() {
            return Err(DecodeError::FieldCount {
                expected: LOGLINE_FIELDS.len(),
                actual: raw.len(),
            });
        }

        let coerced = LOGLINE_FIELDS
            .iter()
            .zip(raw)
            .map(|(spec, value)| {
                spec.receive(*value).map(|coerced| Coerced {
                    spec,
                    raw: *value,
                    value: coerced,
                })
            })
            .collect::<Result<Vec<_>, FieldCoercionError>>()?;

        let [
            ip,
            junk1,
            junk2,
            visit_time,
            http_method,
            path,
            protocol,
            response_code,
            size,
            referer,
            ua,
            cruft,
        ]: [Coerced<'_>; 12] = coerced.try_into().map_err(|rest: Vec<Coerced<'_>>| {
            DecodeError::FieldCount {
                expected: LOGLINE_FIELDS.len(),
                actual: rest.len(),
            }
        })?;

        Ok(Self {
            ip: ip.required(FieldValue::into_text)?,
            junk1: junk1.required(FieldValue::into_text)?,
            junk2: junk2.required(FieldValue::into_text)?,
            visit_time: visit_time.required(FieldValue::into_time)?,
            http_method: http_method.value.into_text(),
            path: path.value.into_text(),
            protocol: protocol.value.into_text(),
            response_code: response_code.required(FieldValue::into_integer)?,
            size: size.value.into_integer(),
            referer: referer.required(FieldValue::into_text)?,
            ua: ua.required(FieldValue::into_text)?,
            cruft: cruft.value.into_text(),
        })
    }

    /// Hourly bucket key: year, month, day and hour of the visit joined
    /// without separators or padding (`2008-06-07 20:..` -> `"20086720"`).
    pub fn day_hr(&self) -> String {
        let t = &self.visit_time;
        format!("{}{}{}{}", t.year(), t.month(), t.day(), t.hour())
    }
}

/// One coerced capture, still tagged with its declaration and raw text so a
/// missing required value can be reported against the right field.
struct Coerced<'a> {
    spec: &'static FieldSpec,
    raw: Option<&'a str>,
    value: FieldValue,
}

impl Coerced<'_> {
    fn required<T>(self, extract: fn(FieldValue) -> Option<T>) -> Result<T, FieldCoercionError> {
        let Coerced { spec, raw, value } = self;
        extract(value).ok_or_else(|| spec.error(raw, CoercionFailure::Missing))
    }
}

// =============================================================================
// Bad record / decode outcome
// =============================================================================

/// A line that did not fit the access-log grammar.
///
/// This is a normal decode result, not an error: it keeps the original text
/// so callers can count, report, or re-process it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadRecord {
    pub reason: String,
    /// The original line, exactly as passed in (terminator included).
    pub line: String,
}

impl BadRecord {
    pub fn new(reason: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            line: line.into(),
        }
    }
}

/// Result of decoding one line: exactly one of a record or a bad record.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Record(LoglineRecord),
    Bad(BadRecord),
}

impl ParsedLine {
    pub fn is_bad(&self) -> bool {
        matches!(self, ParsedLine::Bad(_))
    }

    pub fn record(&self) -> Option<&LoglineRecord> {
        match self {
            ParsedLine::Record(r) => Some(r),
            ParsedLine::Bad(_) => None,
        }
    }

    pub fn into_record(self) -> Option<LoglineRecord> {
        match self {
            ParsedLine::Record(r) => Some(r),
            ParsedLine::Bad(_) => None,
        }
    }

    pub fn bad(&self) -> Option<&BadRecord> {
        match self {
            ParsedLine::Bad(b) => Some(b),
            ParsedLine::Record(_) => None,
        }
    }
}
