use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use regex::Regex;
use tracing::{info, warn};

use crate::cli::{ConvertArgs, Flavor};
use crate::commands::inventory;
use crate::model::{
    ConvertCounts, ConvertPaths, ConvertRunManifest, LogEntry, LogLevel, ToolVersions,
};
use crate::util::{ensure_directory, now_utc_string, utc_compact_string, write_json_pretty};

use super::columns::HeaderRules;
use super::detect::{CamelotDetector, TableDetector, detect_with_fallback};
use super::filename_date::date_from_filename;
use super::output::write_table_csv;
use super::table::{MasterTable, build_document_table};

pub const MASTER_FILENAME: &str = "psx_closing_rates_master.csv";

const MANIFEST_VERSION: u32 = 1;

pub fn run(args: ConvertArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    if args.flavors.is_empty() {
        bail!("no detection flavors to try; pass at least one --flavor");
    }
    validate_pages(&args.pages)?;

    let detector = CamelotDetector::new(args.camelot_path.clone());
    if !detector.available() {
        bail!(
            "table-detection engine '{}' is not runnable; install camelot or pass --camelot-path",
            args.camelot_path
        );
    }

    ensure_directory(&args.out_dir)?;
    let manifest_dir = args.out_dir.join("manifests");
    let run_manifest_path = args.run_manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!("convert_run_{}.json", utc_compact_string(started_ts)))
    });

    info!(
        input_dir = %args.input_dir.display(),
        out_dir = %args.out_dir.display(),
        pages = %args.pages,
        run_id = %run_id,
        "starting conversion"
    );

    let rules = HeaderRules::default();
    let outcome = process_pdfs(
        &detector,
        &args.input_dir,
        &args.out_dir,
        &args.pages,
        &args.flavors,
        &rules,
    )?;

    for entry in &outcome.log {
        match entry.level {
            LogLevel::Ok | LogLevel::Master => {
                info!(level = entry.level.as_str(), "{}", entry.message)
            }
            LogLevel::Warn | LogLevel::MasterWarn => {
                warn!(level = entry.level.as_str(), "{}", entry.message)
            }
        }
    }

    let manifest = ConvertRunManifest {
        manifest_version: MANIFEST_VERSION,
        run_id: run_id.clone(),
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_convert_command(&args),
        pages: args.pages.clone(),
        flavors: args
            .flavors
            .iter()
            .map(|flavor| flavor.as_str().to_string())
            .collect(),
        tool_versions: collect_tool_versions(&args.camelot_path),
        paths: ConvertPaths {
            input_dir: args.input_dir.display().to_string(),
            out_dir: args.out_dir.display().to_string(),
            manifest_dir: manifest_dir.display().to_string(),
            run_manifest_path: run_manifest_path.display().to_string(),
            master_path: outcome
                .master_path
                .as_ref()
                .map(|path| path.display().to_string()),
        },
        counts: outcome.counts.clone(),
        log: outcome.log.clone(),
    };
    write_json_pretty(&run_manifest_path, &manifest)?;

    info!(path = %run_manifest_path.display(), "wrote convert run manifest");
    info!(
        pdfs = outcome.counts.pdf_count,
        processed = outcome.counts.processed_pdf_count,
        skipped = outcome.counts.skipped_pdf_count,
        master_rows = outcome.counts.master_row_count,
        "conversion completed"
    );

    Ok(())
}

/// Everything the front-end needs back from one batch: the ordered run log,
/// headline counts and the master CSV location when one was written.
#[derive(Debug)]
pub struct ConvertOutcome {
    pub log: Vec<LogEntry>,
    pub counts: ConvertCounts,
    pub master_path: Option<PathBuf>,
}

/// Drives the per-document pipeline over every PDF in `input_dir` in
/// filename-sorted order, then assembles the master table from qualifying
/// rows in document order. Per-document failures are logged as `warn` and
/// skipped; only an unreadable input directory or a failed artifact write is
/// fatal.
pub fn process_pdfs(
    detector: &dyn TableDetector,
    input_dir: &Path,
    out_dir: &Path,
    pages: &str,
    flavors: &[Flavor],
    rules: &HeaderRules,
) -> Result<ConvertOutcome> {
    ensure_directory(out_dir)?;

    let mut log = Vec::new();
    let mut counts = ConvertCounts::default();

    let mut pdf_files = inventory::discover_pdfs(input_dir)?;
    pdf_files.sort();
    counts.pdf_count = pdf_files.len();

    if pdf_files.is_empty() {
        log.push(LogEntry::new(
            LogLevel::Warn,
            format!("No PDFs found in {}", input_dir.display()),
        ));
        return Ok(ConvertOutcome {
            log,
            counts,
            master_path: None,
        });
    }

    let mut master = MasterTable::default();

    for filename in pdf_files {
        let pdf_path = input_dir.join(&filename);
        let date = date_from_filename(&filename);

        let detection = match detect_with_fallback(detector, &pdf_path, pages, flavors) {
            Ok(detection) => detection,
            Err(error) => {
                log.push(LogEntry::new(
                    LogLevel::Warn,
                    format!("{filename}: error reading ({error:#})"),
                ));
                counts.skipped_pdf_count += 1;
                continue;
            }
        };

        if detection.tables.is_empty() {
            log.push(LogEntry::new(
                LogLevel::Warn,
                format!("No tables found in {filename}"),
            ));
            counts.skipped_pdf_count += 1;
            continue;
        }

        let Some(table) = build_document_table(detection.tables, date, rules) else {
            log.push(LogEntry::new(
                LogLevel::Warn,
                format!("No data rows left in {filename} after cleaning"),
            ));
            counts.skipped_pdf_count += 1;
            continue;
        };

        let out_csv = out_dir.join(Path::new(&filename).with_extension("csv"));
        write_table_csv(&out_csv, &table.output_columns(), &table.output_rows())?;

        let qualifying = table.qualifying_rows();
        counts.document_row_count += table.row_count();
        counts.qualifying_row_count += qualifying.len();
        if !qualifying.is_empty() {
            master.append(&table.output_columns(), qualifying);
        }

        let flavor_name = detection.flavor.map(Flavor::as_str).unwrap_or("none");
        log.push(LogEntry::new(
            LogLevel::Ok,
            format!(
                "{filename}  | rows: {:>5} | flavor: {flavor_name} | saved: {}",
                table.row_count(),
                out_csv.display()
            ),
        ));
        counts.processed_pdf_count += 1;
    }

    let master_path = if master.is_empty() {
        log.push(LogEntry::new(
            LogLevel::MasterWarn,
            "No rows extracted; try changing the flavor order or page ranges.",
        ));
        None
    } else {
        let path = out_dir.join(MASTER_FILENAME);
        write_table_csv(&path, &master.columns, &master.rows)?;
        counts.master_row_count = master.row_count();
        log.push(LogEntry::new(
            LogLevel::Master,
            format!(
                "Combined rows: {} | saved: {}",
                master.row_count(),
                path.display()
            ),
        ));
        Some(path)
    };

    Ok(ConvertOutcome {
        log,
        counts,
        master_path,
    })
}

/// Accepts "all", a single page, a comma-separated list or hyphenated
/// ranges. The value itself passes through to the detection engine verbatim.
pub(crate) fn validate_pages(pages: &str) -> Result<()> {
    let pattern = Regex::new(r"^(?i)(all|\d+(?:-\d+)?(?:\s*,\s*\d+(?:-\d+)?)*)$")
        .context("failed to compile page specifier pattern")?;

    if !pattern.is_match(pages.trim()) {
        bail!("invalid page specifier '{pages}'; expected \"all\", \"1\", \"1,3,7\" or \"1-3\"");
    }

    Ok(())
}

fn collect_tool_versions(camelot_path: &str) -> ToolVersions {
    ToolVersions {
        rustc: command_version_optional("rustc", &["--version"]),
        cargo: command_version_optional("cargo", &["--version"]),
        camelot: command_version_optional(camelot_path, &["--version"]),
    }
}

fn command_version_optional(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let source = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };

    source
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
}

fn render_convert_command(args: &ConvertArgs) -> String {
    let mut command = vec![
        "psxrates".to_string(),
        "convert".to_string(),
        "--input-dir".to_string(),
        args.input_dir.display().to_string(),
        "--out-dir".to_string(),
        args.out_dir.display().to_string(),
        "--pages".to_string(),
        args.pages.clone(),
    ];

    for flavor in &args.flavors {
        command.push("--flavor".to_string());
        command.push(flavor.as_str().to_string());
    }
    if args.camelot_path != "camelot" {
        command.push("--camelot-path".to_string());
        command.push(args.camelot_path.clone());
    }
    if let Some(path) = &args.run_manifest_path {
        command.push("--run-manifest-path".to_string());
        command.push(path.display().to_string());
    }

    command.join(" ")
}
