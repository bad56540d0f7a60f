use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::Utc;

use crate::cli::Flavor;

use super::table::RawTable;

/// Black-box boundary to the table-detection engine. One call runs a single
/// named strategy against the requested page range and returns every raw
/// table it found.
pub trait TableDetector {
    fn detect(&self, pdf_path: &Path, pages: &str, flavor: Flavor) -> Result<Vec<RawTable>>;
}

/// Result of the ordered-fallback selection: the winning strategy's tables
/// plus its name. Both stay empty when every strategy came back empty,
/// a legitimate "no tables in this document" outcome distinct from a
/// detection failure.
#[derive(Debug, Default)]
pub struct DetectionOutcome {
    pub tables: Vec<RawTable>,
    pub flavor: Option<Flavor>,
}

/// Tries the flavors in order and keeps the first result set whose total
/// row count is non-zero. When no flavor yields rows and at least one
/// raised, the last error propagates; when every flavor returned empty, the
/// outcome is empty rather than an error.
pub fn detect_with_fallback(
    detector: &dyn TableDetector,
    pdf_path: &Path,
    pages: &str,
    flavors: &[Flavor],
) -> Result<DetectionOutcome> {
    let mut last_error = None;

    for &flavor in flavors {
        match detector.detect(pdf_path, pages, flavor) {
            Ok(tables) => {
                let total_rows: usize = tables.iter().map(Vec::len).sum();
                if total_rows > 0 {
                    return Ok(DetectionOutcome {
                        tables,
                        flavor: Some(flavor),
                    });
                }
            }
            Err(error) => last_error = Some(error),
        }
    }

    match last_error {
        Some(error) => Err(error),
        None => Ok(DetectionOutcome::default()),
    }
}

/// Production detector: shells out to the Camelot CLI, one invocation per
/// strategy, and reads back the CSV tables it drops into a scratch
/// directory.
pub struct CamelotDetector {
    program: String,
}

impl CamelotDetector {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn available(&self) -> bool {
        Command::new(&self.program).arg("--version").output().is_ok()
    }

    fn scratch_dir_for(&self, pdf_path: &Path) -> PathBuf {
        let stem = pdf_path
            .file_stem()
            .and_then(|value| value.to_str())
            .unwrap_or("pdf");
        let safe_stem = stem
            .chars()
            .map(|character| {
                if character.is_ascii_alphanumeric() {
                    character
                } else {
                    '_'
                }
            })
            .collect::<String>();
        let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();

        std::env::temp_dir().join(format!(
            "psxrates_detect_{}_{}_{}",
            safe_stem,
            std::process::id(),
            stamp
        ))
    }
}

impl TableDetector for CamelotDetector {
    fn detect(&self, pdf_path: &Path, pages: &str, flavor: Flavor) -> Result<Vec<RawTable>> {
        let scratch = self.scratch_dir_for(pdf_path);
        fs::create_dir_all(&scratch)
            .with_context(|| format!("failed to create scratch directory: {}", scratch.display()))?;

        let result = run_camelot(&self.program, pdf_path, pages, flavor, &scratch);
        let _ = fs::remove_dir_all(&scratch);
        result
    }
}

fn run_camelot(
    program: &str,
    pdf_path: &Path,
    pages: &str,
    flavor: Flavor,
    scratch: &Path,
) -> Result<Vec<RawTable>> {
    // Camelot writes one CSV per detected table next to this base name.
    let output_base = scratch.join("tables.csv");

    let output = Command::new(program)
        .arg("--quiet")
        .arg("--pages")
        .arg(pages)
        .arg("--format")
        .arg("csv")
        .arg("--output")
        .arg(&output_base)
        .arg(flavor.as_str())
        .arg(pdf_path)
        .output()
        .with_context(|| format!("failed to execute {} for {}", program, pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "{} {} returned non-zero exit status for {}: {}",
            program,
            flavor.as_str(),
            pdf_path.display(),
            stderr.trim()
        );
    }

    let mut produced = Vec::new();
    for entry in fs::read_dir(scratch)
        .with_context(|| format!("failed to read scratch directory: {}", scratch.display()))?
    {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", scratch.display()))?;
        let path = entry.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            produced.push(path);
        }
    }
    produced.sort();

    let mut tables = Vec::with_capacity(produced.len());
    for path in produced {
        tables.push(read_raw_table(&path)?);
    }

    Ok(tables)
}

fn read_raw_table(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open detected table: {}", path.display()))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("failed to parse detected table: {}", path.display()))?;
        // Embedded newlines get stripped from cells, matching the engine's
        // strip_text behavior.
        rows.push(
            record
                .iter()
                .map(|cell| cell.replace('\n', ""))
                .collect::<Vec<String>>(),
        );
    }

    Ok(rows)
}
