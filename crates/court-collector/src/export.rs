//! CSV export of case records.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::ExportError;
use crate::record::{CaseRecord, CSV_COLUMNS};

/// UTF-8 byte-order mark; spreadsheet tools use it to detect the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes `records` to `path` as BOM-prefixed, comma-delimited UTF-8.
///
/// The header row is always written, so an empty slice yields a header-only
/// file. Parent directories are created as needed. Rows go to a `.part`
/// sibling that is renamed over `path` once complete; on failure it is
/// removed and `path` is left as it was.
pub fn export_csv(records: &[CaseRecord], path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::CreateDirectory {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let partial = partial_path(path);
    let result = write_rows(records, &partial).and_then(|()| {
        std::fs::rename(&partial, path).map_err(|e| ExportError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    });

    if result.is_err() {
        if let Err(e) = std::fs::remove_file(&partial) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %partial.display(), error = %e, "Failed to remove partial CSV");
            }
        }
    }
    result
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

fn write_rows(records: &[CaseRecord], path: &Path) -> Result<(), ExportError> {
    let write_err = |e: std::io::Error| ExportError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    };

    let mut out = BufWriter::new(File::create(path).map_err(write_err)?);
    out.write_all(UTF8_BOM).map_err(write_err)?;

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(CSV_COLUMNS)?;
    for record in records {
        writer.write_record(record.as_row())?;
    }
    writer.flush().map_err(write_err)?;

    Ok(())
}
