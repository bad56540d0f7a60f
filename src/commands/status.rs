use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::{ConvertRunManifest, PdfInventoryManifest};

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.out_dir.join("manifests");
    let inventory_path = manifest_dir.join("pdf_inventory.json");

    info!(out_dir = %args.out_dir.display(), "status requested");

    if inventory_path.exists() {
        let raw = fs::read(&inventory_path)
            .with_context(|| format!("failed to read {}", inventory_path.display()))?;
        let inventory: PdfInventoryManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", inventory_path.display()))?;

        info!(
            generated_at = %inventory.generated_at,
            pdf_count = inventory.pdf_count,
            "loaded inventory manifest"
        );
    } else {
        warn!(path = %inventory_path.display(), "inventory manifest missing");
    }

    match latest_run_manifest(&manifest_dir)? {
        Some(path) => {
            let raw =
                fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
            let manifest: ConvertRunManifest = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;

            info!(
                run_id = %manifest.run_id,
                status = %manifest.status,
                started_at = %manifest.started_at,
                updated_at = %manifest.updated_at,
                pdfs = manifest.counts.pdf_count,
                processed = manifest.counts.processed_pdf_count,
                skipped = manifest.counts.skipped_pdf_count,
                master_rows = manifest.counts.master_row_count,
                master_path = %manifest.paths.master_path.unwrap_or_default(),
                "loaded convert run manifest"
            );
        }
        None => {
            warn!(path = %manifest_dir.display(), "no convert run manifest found");
        }
    }

    Ok(())
}

/// Run manifests embed a compact UTC timestamp, so the lexicographic maximum
/// is the most recent run.
fn latest_run_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with("convert_run_") && name.ends_with(".json") {
            candidates.push(entry.path());
        }
    }

    candidates.sort();
    Ok(candidates.pop())
}
