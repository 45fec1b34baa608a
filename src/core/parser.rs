// LogAtlas - core/parser.rs
//
// Apache combined-log line decoding.
// Core layer: accepts string content, never touches the filesystem directly.
//
// A line either fits the grammar and is fed positionally into
// `LoglineRecord::from_positional`, or it does not and becomes a
// `BadRecord`. Grammar mismatch is data, not an error; only a field whose
// value cannot be coerced produces `Err`.

use crate::core::field::{coerce_default, FieldSpec, FieldValue, TimeParts};
use crate::core::model::{BadRecord, LoglineRecord, ParsedLine};
use crate::util::constants;
use crate::util::error::{CoercionFailure, DecodeError, FieldCoercionError, ParseError};
use crate::util::logging::preview;
use regex::Regex;
use std::sync::OnceLock;

/// Access-log grammar. One capture group per entry of `LOGLINE_FIELDS`.
///
/// 83.240.154.3 - - [07/Jun/2008:20:37:11 +0000] "GET /faq HTTP/1.1" 200 569 "http://infochimps.org/search?query=CAC" "Mozilla/5.0 (Windows; U; Windows NT 5.1; fr; rv:1.9.0.16) Gecko/2009120208 Firefox/3.0.16"
const LOG_PATTERN: &str = r##"(?x)
    \A
       (\S+)                        # ip             83.240.154.3
     \s(\S+)                        # junk1          -
     \s(\S+)                        # junk2          -
   \s\[([0-9]+/\w+/[0-9]+           # date part      [07/Jun/2008
       :[0-9]+:[0-9]+:[0-9]+        # time part      :20:37:11
     \s[+\-]\S*)\]                  # timezone       +0000]
   \s"(?:(\S+)                      # http_method    "GET
     \s(\S+)                        # path           /faq
     \s(HTTP/[0-9.]+)|-)"           # protocol       HTTP/1.1"
     \s([0-9]+)                     # response_code  200
     \s([0-9]+|-)                   # size           569
   \s"([^"]*)"                      # referer        "http://infochimps.org/search?query=CAC"
   \s"([^"]*)"                      # ua             "Mozilla/5.0 ..."
   (?:\s+(.*?))?                    # cruft          anything left over
    \z
"##;

/// Decomposition of the bracketed visit time, e.g. `07/Jun/2008:20:37:11 +0000`.
const TIME_PATTERN: &str =
    r"([0-9]+)/(\w+)/([0-9]+):([0-9]+):([0-9]+):([0-9]+)\s([+\-][0-9]{2})([0-9]{2})";

/// English three-letter month abbreviations, January first.
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn log_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Constant pattern, exercised by every test in this module.
    RE.get_or_init(|| Regex::new(LOG_PATTERN).expect("LOG_PATTERN: invalid regex"))
}

fn time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TIME_PATTERN).expect("TIME_PATTERN: invalid regex"))
}

/// Remove one trailing line terminator (`\r\n`, `\n` or `\r`).
fn chomp(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .or_else(|| line.strip_suffix('\r'))
        .unwrap_or(line)
}

/// Decode one access-log line.
///
/// Returns `Ok(ParsedLine::Bad)` with reason `"no match"` and the original
/// text when the line does not fit the grammar. Returns `Err` only when the
/// line fits but a field value cannot be coerced (for example an unknown
/// month abbreviation in the visit time).
pub fn parse(line: &str) -> Result<ParsedLine, DecodeError> {
    let Some(caps) = log_re().captures(chomp(line)) else {
        tracing::trace!(line = preview(line), "Line does not match access-log grammar");
        return Ok(ParsedLine::Bad(BadRecord::new(
            constants::BAD_RECORD_NO_MATCH,
            line,
        )));
    };

    let raw: Vec<Option<&str>> = caps
        .iter()
        .skip(1)
        .map(|group| group.map(|m| m.as_str()))
        .collect();

    LoglineRecord::from_positional(&raw).map(ParsedLine::Record)
}

// =============================================================================
// Visit time coercion
// =============================================================================

/// Coercion hook for `visit_time`.
///
/// A value in the Apache `DD/Mon/YYYY:HH:MM:SS ±ZZzz` form is decomposed
/// and rebuilt with an explicit `±HH:MM` offset. Anything else is handed
/// unmodified to the generic timestamp coercion.
pub fn receive_visit_time(
    spec: &FieldSpec,
    raw: Option<&str>,
) -> Result<FieldValue, FieldCoercionError> {
    let Some(value) = raw else {
        return coerce_default(spec, raw);
    };

    match decompose_timestamp(value) {
        Ok(Some(parts)) => parts
            .to_datetime()
            .map(FieldValue::Time)
            .ok_or_else(|| spec.error(raw, CoercionFailure::InvalidTimestamp)),
        Ok(None) => coerce_default(spec, raw),
        Err(reason) => Err(spec.error(raw, reason)),
    }
}

/// Split an Apache timestamp into numeric parts.
///
/// `Ok(None)` when the text is not in that form at all. `Err` when it is,
/// but the month abbreviation is unknown or a number overflows.
pub fn decompose_timestamp(raw: &str) -> Result<Option<TimeParts>, CoercionFailure> {
    let Some(caps) = time_re().captures(raw) else {
        return Ok(None);
    };

    let number = |i: usize| -> Result<u32, CoercionFailure> {
        caps[i]
            .parse()
            .map_err(|_| CoercionFailure::InvalidTimestamp)
    };

    let month = month_number(&caps[2])
        .ok_or_else(|| CoercionFailure::UnknownMonth(caps[2].to_string()))?;
    let year = caps[3]
        .parse::<i32>()
        .map_err(|_| CoercionFailure::InvalidTimestamp)?;

    Ok(Some(TimeParts {
        year,
        month,
        day: number(1)?,
        hour: number(4)?,
        minute: number(5)?,
        second: number(6)?,
        utc_offset: format!("{}:{}", &caps[7], &caps[8]),
    }))
}

/// `Jan` -> 1 ... `Dec` -> 12. Case-sensitive.
pub fn month_number(abbrev: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| *m == abbrev)
        .map(|idx| idx as u32 + 1)
}

// =============================================================================
// Batch decoding
// =============================================================================

/// Configuration for batch parsing.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Cap on the number of decode errors kept in `ParseResult::errors`.
    pub max_parse_errors: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_parse_errors: constants::MAX_PARSE_ERRORS_PER_BATCH,
        }
    }
}

/// Result of decoding a block of log content.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// Successfully decoded records, in input order.
    pub records: Vec<LoglineRecord>,
    /// Lines that did not fit the grammar, in input order.
    pub bad_records: Vec<BadRecord>,
    /// Decode errors (capped at `max_parse_errors`).
    pub errors: Vec<ParseError>,
    /// Total decode errors, including suppressed ones.
    pub decode_failures: u64,
    /// Total lines seen, including blank ones.
    pub lines_processed: u64,
}

/// Counts-only view of a `ParseResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct ParseSummary {
    pub lines_processed: u64,
    pub records: usize,
    pub bad_records: usize,
    pub decode_failures: u64,
}

impl ParseResult {
    pub fn summary(&self) -> ParseSummary {
        ParseSummary {
            lines_processed: self.lines_processed,
            records: self.records.len(),
            bad_records: self.bad_records.len(),
            decode_failures: self.decode_failures,
        }
    }
}

/// Decode every line of `content`.
///
/// Never halts on a bad line: grammar mismatches land in `bad_records` and
/// coercion failures in `errors`, each tagged with its 1-based line number.
/// Every line, blank or whitespace-only included, yields exactly one record,
/// bad record or decode failure.
pub fn parse_content(content: &str, config: &ParseConfig) -> ParseResult {
    tracing::debug!(bytes = content.len(), "Parsing started");

    let mut result = ParseResult::default();

    for (line_idx, line) in content.lines().enumerate() {
        result.lines_processed += 1;
        let line_number = (line_idx as u64) + 1;

        match parse(line) {
            Ok(ParsedLine::Record(record)) => result.records.push(record),
            Ok(ParsedLine::Bad(bad)) => result.bad_records.push(bad),
            Err(source) => {
                result.decode_failures += 1;
                tracing::debug!(line_number, error = %source, "Field coercion failed");
                if result.errors.len() < config.max_parse_errors {
                    result.errors.push(ParseError::Decode {
                        line_number,
                        source,
                    });
                }
            }
        }
    }

    tracing::debug!(
        records = result.records.len(),
        bad_records = result.bad_records.len(),
        decode_failures = result.decode_failures,
        lines = result.lines_processed,
        "Parsing complete"
    );

    result
}
