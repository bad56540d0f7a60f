use std::path::Path;

use chrono::NaiveDate;

/// Resolves the sheet date from a filename shaped like `2024-01-02.pdf`.
/// Any other stem means the document simply carries no date; callers omit
/// the `Date` column rather than treating this as an error.
pub fn date_from_filename(filename: &str) -> Option<NaiveDate> {
    let stem = Path::new(filename).file_stem()?.to_str()?;
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}
