use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::InventoryArgs;
use crate::commands::convert::date_from_filename;
use crate::model::{PdfEntry, PdfInventoryManifest};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.input_dir)?;

    if args.dry_run {
        info!(
            pdf_count = manifest.pdf_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| args.out_dir.join("manifests").join("pdf_inventory.json"));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(pdf_count = manifest.pdf_count, "inventory completed");

    Ok(())
}

pub fn build_manifest(input_dir: &Path) -> Result<PdfInventoryManifest> {
    let mut filenames = discover_pdfs(input_dir)?;
    filenames.sort();

    if filenames.is_empty() {
        bail!("no PDFs found in {}", input_dir.display());
    }

    let mut pdfs = Vec::with_capacity(filenames.len());
    for filename in filenames {
        let path = input_dir.join(&filename);
        let date = date_from_filename(&filename);
        let sha256 = sha256_file(&path)?;

        pdfs.push(PdfEntry {
            filename,
            date,
            sha256,
        });
    }

    Ok(PdfInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: input_dir.display().to_string(),
        pdf_count: pdfs.len(),
        pdfs,
    })
}

/// Filenames of the regular `.pdf` files (extension matched
/// case-insensitively) directly inside `input_dir`. Order is unspecified;
/// callers sort.
pub fn discover_pdfs(input_dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read {}", input_dir.display()))?;

    let mut pdfs = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", input_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !is_pdf {
            continue;
        }

        // Non-UTF-8 filenames cannot be carried through the manifests or
        // logs; skip them.
        if let Some(filename) = entry.file_name().to_str() {
            pdfs.push(filename.to_string());
        }
    }

    Ok(pdfs)
}
