use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfEntry {
    pub filename: String,
    /// Sheet date resolved from the filename; absent when the stem is not a
    /// plain `YYYY-MM-DD` token.
    pub date: Option<NaiveDate>,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub pdf_count: usize,
    pub pdfs: Vec<PdfEntry>,
}

/// Severity tag on a run-log entry. Observational only; nothing in the
/// pipeline branches on it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    Ok,
    Warn,
    Master,
    MasterWarn,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Master => "master",
            Self::MasterWarn => "master-warn",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolVersions {
    pub rustc: Option<String>,
    pub cargo: Option<String>,
    pub camelot: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertPaths {
    pub input_dir: String,
    pub out_dir: String,
    pub manifest_dir: String,
    pub run_manifest_path: String,
    pub master_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertCounts {
    pub pdf_count: usize,
    pub processed_pdf_count: usize,
    pub skipped_pdf_count: usize,
    pub document_row_count: usize,
    pub qualifying_row_count: usize,
    pub master_row_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub pages: String,
    pub flavors: Vec<String>,
    pub tool_versions: ToolVersions,
    pub paths: ConvertPaths,
    pub counts: ConvertCounts,
    pub log: Vec<LogEntry>,
}
