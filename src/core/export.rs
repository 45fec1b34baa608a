// LogAtlas - core/export.rs
//
// CSV and JSON export of decoded log records.
// Core layer: writes to any Write trait object.

use crate::core::model::{BadRecord, LoglineRecord};
use crate::util::constants;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export format selectable from config or the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

fn check_size(count: usize) -> Result<(), ExportError> {
    if count > constants::MAX_EXPORT_ENTRIES {
        return Err(ExportError::TooManyEntries {
            count,
            max: constants::MAX_EXPORT_ENTRIES,
        });
    }
    Ok(())
}

/// Export decoded records to CSV format.
///
/// Writes one column per record field, in capture order. `visit_time` is
/// RFC 3339; absent optional values are empty cells.
pub fn export_csv<W: Write>(
    records: &[LoglineRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_size(records.len())?;
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };

    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "ip",
            "junk1",
            "junk2",
            "visit_time",
            "http_method",
            "path",
            "protocol",
            "response_code",
            "size",
            "referer",
            "ua",
            "cruft",
        ])
        .map_err(csv_err)?;

    let mut count = 0;
    for record in records {
        let visit_time = record.visit_time.to_rfc3339();
        let response_code = record.response_code.to_string();
        let size = record.size.map(|s| s.to_string()).unwrap_or_default();
        csv_writer
            .write_record([
                record.ip.as_str(),
                record.junk1.as_str(),
                record.junk2.as_str(),
                visit_time.as_str(),
                record.http_method.as_deref().unwrap_or(""),
                record.path.as_deref().unwrap_or(""),
                record.protocol.as_deref().unwrap_or(""),
                response_code.as_str(),
                size.as_str(),
                record.referer.as_str(),
                record.ua.as_str(),
                record.cruft.as_deref().unwrap_or(""),
            ])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export decoded records to JSON format (array of objects).
pub fn export_json<W: Write>(
    records: &[LoglineRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_size(records.len())?;
    serde_json::to_writer_pretty(writer, records).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(records.len())
}

/// Export bad records (reason and original line) to CSV format.
pub fn export_bad_records_csv<W: Write>(
    bad_records: &[BadRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_size(bad_records.len())?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    for bad in bad_records {
        csv_writer.serialize(bad).map_err(|e| ExportError::Csv {
            path: export_path.to_path_buf(),
            source: e,
        })?;
    }
    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(bad_records.len())
}
