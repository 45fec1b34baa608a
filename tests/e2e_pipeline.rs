// LogAtlas - tests/e2e_pipeline.rs
//
// End-to-end tests for the decode, gazette and export pipeline.
//
// These tests exercise the real filesystem, real regex grammar, real chrono
// timestamp construction and real csv/serde_json output, with no mocks. They
// cover the full path from a raw access log on disk to typed records and
// exported files.

use chrono::{Datelike, Timelike};
use logatlas::app::batch;
use logatlas::core::export::ExportFormat;
use logatlas::core::gazette::CountryGazette;
use logatlas::core::geo::slugify_name;
use logatlas::core::parser::{parse_content, ParseConfig};
use logatlas::platform::config::load_config;
use logatlas::util::error::{CoercionFailure, DecodeError, ParseError};
use std::fs;
use std::path::PathBuf;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn coercion_reason(err: &ParseError) -> (u64, &CoercionFailure) {
    match err {
        ParseError::Decode {
            line_number,
            source: DecodeError::FieldCoercion(field),
        } => (*line_number, &field.reason),
        other => panic!("expected a field coercion error, got {other:?}"),
    }
}

// =============================================================================
// Access log decoding E2E
// =============================================================================

/// The sample log mixes good lines, grammar misses, a blank line and lines
/// with un-coercible timestamps. None of them halt the batch, and every line
/// lands in exactly one bucket.
#[test]
fn e2e_sample_log_counts() {
    let result = batch::parse_file(&fixture("access_sample.log"), &ParseConfig::default())
        .expect("fixture should be readable");
    let summary = result.summary();

    assert_eq!(summary.lines_processed, 10);
    assert_eq!(summary.records, 5);
    assert_eq!(summary.bad_records, 3);
    assert_eq!(summary.decode_failures, 2);
    assert_eq!(
        (summary.records + summary.bad_records) as u64 + summary.decode_failures,
        summary.lines_processed
    );
}

#[test]
fn e2e_sample_log_record_fields() {
    let result =
        batch::parse_file(&fixture("access_sample.log"), &ParseConfig::default()).unwrap();
    let records = &result.records;

    let first = &records[0];
    assert_eq!(first.ip, "83.240.154.3");
    assert_eq!(first.path.as_deref(), Some("/faq"));
    assert_eq!(first.size, Some(569));
    assert_eq!(first.day_hr(), "20086720");

    // Size "-" is blankish.
    assert_eq!(records[1].response_code, 304);
    assert_eq!(records[1].size, None);

    // Request line "-" leaves method, path and protocol absent.
    assert_eq!(records[2].http_method, None);
    assert_eq!(records[2].protocol, None);
    assert_eq!(records[2].response_code, 408);

    // Trailing tokens after the user agent are kept as cruft.
    assert_eq!(records[3].junk2, "frank");
    assert_eq!(records[3].ua, "Mozilla/4.0 (compatible; MSIE 7.0)");
    assert_eq!(records[3].cruft.as_deref(), Some("\"infochimps.org\" 0.031"));

    // The original offset survives decoding.
    let western = &records[4];
    assert_eq!(western.visit_time.offset().local_minus_utc(), -7 * 3_600);
    assert_eq!(western.visit_time.day(), 8);
    assert_eq!(western.visit_time.hour(), 1);
    assert_eq!(western.day_hr(), "2008681");
}

#[test]
fn e2e_sample_log_bad_records_and_errors() {
    let result =
        batch::parse_file(&fixture("access_sample.log"), &ParseConfig::default()).unwrap();

    assert!(result
        .bad_records
        .iter()
        .all(|bad| bad.reason == "no match"));
    assert_eq!(result.bad_records[0].line, "");
    assert_eq!(result.bad_records[1].line, "this is not an access log line");
    assert!(result.bad_records[2].line.ends_with("\"GET /truncated HTTP/1.1\" 200"));

    assert_eq!(result.errors.len(), 2);
    let (line, reason) = coercion_reason(&result.errors[0]);
    assert_eq!(line, 7);
    assert_eq!(reason, &CoercionFailure::UnknownMonth("Foo".to_string()));

    let (line, reason) = coercion_reason(&result.errors[1]);
    assert_eq!(line, 10);
    assert_eq!(reason, &CoercionFailure::InvalidTimestamp);
}

/// The error cap limits what is kept, never what is counted.
#[test]
fn e2e_error_cap_keeps_counting() {
    let content = fs::read_to_string(fixture("access_sample.log")).unwrap();
    let result = parse_content(
        &content,
        &ParseConfig {
            max_parse_errors: 1,
        },
    );
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.decode_failures, 2);
    assert_eq!(result.records.len(), 5);
}

// =============================================================================
// Export E2E
// =============================================================================

#[test]
fn e2e_export_csv_and_json() {
    let result =
        batch::parse_file(&fixture("access_sample.log"), &ParseConfig::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("records.csv");
    let count = batch::export_records(&result, &csv_path, ExportFormat::Csv).unwrap();
    assert_eq!(count, 5);

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), 12);
    assert_eq!(&headers[3], "visit_time");
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(&rows[4][3], "2008-06-08T01:15:30-07:00");
    assert_eq!(&rows[1][8], "");

    let json_path = dir.path().join("records.json");
    batch::export_records(&result, &json_path, ExportFormat::Json).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 5);
    assert_eq!(array[2]["http_method"], serde_json::Value::Null);
    assert_eq!(array[3]["cruft"], "\"infochimps.org\" 0.031");

    let bad_path = dir.path().join("bad.csv");
    assert_eq!(batch::export_bad_records(&result, &bad_path).unwrap(), 3);
    let bad = fs::read_to_string(&bad_path).unwrap();
    assert!(bad.starts_with("reason,line\n"));
    assert!(bad.contains("\nno match,this is not an access log line\n"));
}

// =============================================================================
// Gazette E2E
// =============================================================================

#[test]
fn e2e_gazette_fixture_loads_and_resolves() {
    let gazette = CountryGazette::load(&fixture("country_name_lookup.tsv"), false)
        .expect("fixture gazette should load");

    assert_eq!(gazette.len(), 7);
    assert_eq!(gazette.duplicate_slugs(), 1);

    let bosnia = gazette.resolve("Bosnia and Herzegovina").unwrap();
    assert_eq!(bosnia.country_al3id, "bih");

    // Empty slug cell derived from the name.
    let ivory = gazette.get(&slugify_name("Côte d'Ivoire")).unwrap();
    assert_eq!(ivory.country_numid, Some(384));
    assert_eq!(ivory.alt_name.as_deref(), Some("Ivory Coast"));

    // "Guinea - Bissau" and "Guinea-Bissau" share a slug.
    assert_eq!(
        gazette.resolve("Guinea - Bissau").map(|r| r.country_id.as_str()),
        Some("gw")
    );

    // Later duplicate wins.
    assert_eq!(
        gazette.get("united-states").unwrap().name,
        "United States of America"
    );
    assert!(gazette.resolve("Atlantis").is_none());
}

#[test]
fn e2e_every_gazette_slug_is_stable() {
    let gazette = CountryGazette::load(&fixture("country_name_lookup.tsv"), false).unwrap();
    for (slug, row) in gazette.iter() {
        assert_eq!(slugify_name(slug), slug, "slug {slug:?} is not normalised");
        assert_eq!(row.slug, slug);
    }
}

// =============================================================================
// Config E2E
// =============================================================================

#[test]
fn e2e_config_drives_parse_limits() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[parsing]\nmax_errors_tracked = 1\n\n[export]\nformat = \"json\"\n",
    )
    .unwrap();

    let (config, warnings) = load_config(&config_path);
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    assert_eq!(ExportFormat::from_name(&config.export_format), Some(ExportFormat::Json));

    let result = batch::parse_file(
        &fixture("access_sample.log"),
        &ParseConfig {
            max_parse_errors: config.max_parse_errors,
        },
    )
    .unwrap();
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.decode_failures, 2);
}
