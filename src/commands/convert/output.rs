use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::util::ensure_directory;

/// Writes one table as comma-delimited UTF-8 with a leading byte-order
/// marker so spreadsheet tools pick up the encoding. Header row included,
/// no index column; null cells serialize as empty fields.
pub fn write_table_csv(
    path: &Path,
    columns: &[String],
    rows: &[Vec<Option<String>>],
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }

    let mut file = File::create(path)
        .with_context(|| format!("failed to create csv file: {}", path.display()))?;
    file.write_all("\u{FEFF}".as_bytes())
        .with_context(|| format!("failed to write byte-order marker: {}", path.display()))?;

    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(columns)
        .with_context(|| format!("failed to write csv header: {}", path.display()))?;
    for row in rows {
        writer
            .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
            .with_context(|| format!("failed to write csv row: {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush csv file: {}", path.display()))?;

    Ok(())
}
