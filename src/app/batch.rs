// LogAtlas - app/batch.rs
//
// One-shot batch processing of an access log on disk: read, decode, and
// optionally export the decoded records.
//
// Per-line problems never fail a batch; they are counted in the returned
// `ParseResult`. Only file-level I/O and export failures are errors here.

use crate::core::export::{self, ExportFormat};
use crate::core::parser::{self, ParseConfig, ParseResult};
use crate::util::error::{LogAtlasError, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::time::{Duration, Instant};

/// Back-off before each retry of a transient read error.
const RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];

/// Read `path` and decode every line.
pub fn parse_file(path: &Path, config: &ParseConfig) -> Result<ParseResult> {
    let started = Instant::now();

    let content = read_log(path).map_err(|e| LogAtlasError::Io {
        path: path.to_path_buf(),
        operation: "read log file",
        source: e,
    })?;

    let result = parser::parse_content(&content, config);
    let summary = result.summary();

    tracing::info!(
        file = %path.display(),
        lines = summary.lines_processed,
        records = summary.records,
        bad_records = summary.bad_records,
        decode_failures = summary.decode_failures,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Log file parsed"
    );

    Ok(result)
}

/// Write the decoded records of `result` to `export_path` in `format`.
///
/// Returns the number of records written.
pub fn export_records(
    result: &ParseResult,
    export_path: &Path,
    format: ExportFormat,
) -> Result<usize> {
    let writer = create_export_file(export_path)?;
    let count = match format {
        ExportFormat::Csv => export::export_csv(&result.records, writer, export_path)?,
        ExportFormat::Json => export::export_json(&result.records, writer, export_path)?,
    };

    tracing::info!(
        path = %export_path.display(),
        ?format,
        count,
        "Records exported"
    );
    Ok(count)
}

/// Write the bad records of `result` to `export_path` as CSV.
pub fn export_bad_records(result: &ParseResult, export_path: &Path) -> Result<usize> {
    let writer = create_export_file(export_path)?;
    let count = export::export_bad_records_csv(&result.bad_records, writer, export_path)?;
    tracing::info!(path = %export_path.display(), count, "Bad records exported");
    Ok(count)
}

fn create_export_file(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| LogAtlasError::Io {
            path: path.to_path_buf(),
            operation: "create export file",
            source: e,
        })
}

/// Read a log file, retrying transient I/O errors.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD so a damaged
/// line still reaches the decoder instead of failing the whole file.
fn read_log(path: &Path) -> io::Result<String> {
    let bytes = read_bytes_retrying(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(
                file = %path.display(),
                valid_up_to = e.utf8_error().valid_up_to(),
                "Log file is not valid UTF-8; invalid bytes replaced"
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    })
}

/// One initial attempt plus one retry per entry of `RETRY_DELAYS_MS`.
fn read_bytes_retrying(path: &Path) -> io::Result<Vec<u8>> {
    let mut delays = RETRY_DELAYS_MS.iter().copied();
    loop {
        match std::fs::read(path) {
            Err(e) if is_transient(e.kind()) => {
                let Some(delay_ms) = delays.next() else {
                    return Err(e);
                };
                tracing::debug!(
                    file = %path.display(),
                    delay_ms,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                std::thread::sleep(Duration::from_millis(delay_ms));
            }
            outcome => return outcome,
        }
    }
}

fn is_transient(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}
