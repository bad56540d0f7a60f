use chrono::NaiveDate;

use super::columns::HeaderRules;

/// One detection attempt's output for one document: rows of text cells with
/// no column semantics yet.
pub type RawTable = Vec<Vec<String>>;

/// Rows need at least this many non-null cells (the date cell included) to
/// qualify for the master table. Excludes stray single-cell footer rows
/// while tolerating sparse but real data rows.
pub const MIN_QUALIFYING_CELLS: usize = 3;

/// A cleaned per-document table. `rows` is rectangular over `columns`;
/// blank cells are `None`. The resolved date stays typed and is rendered
/// only when the table is serialized.
#[derive(Debug, Clone)]
pub struct DocumentTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
    pub date: Option<NaiveDate>,
}

/// Merges the detected raw tables for one document, nulls blank cells,
/// prunes all-null rows and columns, promotes a recognizable header row and
/// normalizes the column names. Returns `None` when nothing survives
/// pruning, which callers log and skip.
pub fn build_document_table(
    raw_tables: Vec<RawTable>,
    date: Option<NaiveDate>,
    rules: &HeaderRules,
) -> Option<DocumentTable> {
    let width = raw_tables
        .iter()
        .flat_map(|table| table.iter())
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    if width == 0 {
        return None;
    }

    // Row order is preserved across tables; short rows pad out to the widest
    // detected column count.
    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for table in raw_tables {
        for row in table {
            let mut cells: Vec<Option<String>> = row.into_iter().map(blank_to_null).collect();
            cells.resize(width, None);
            rows.push(cells);
        }
    }

    // Row prune runs before column prune so logged row counts stay stable.
    rows.retain(|row| row.iter().any(Option::is_some));
    if rows.is_empty() {
        return None;
    }

    let keep: Vec<bool> = (0..width)
        .map(|index| rows.iter().any(|row| row[index].is_some()))
        .collect();
    let mut rows: Vec<Vec<Option<String>>> = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&keep)
                .filter_map(|(cell, &kept)| kept.then_some(cell))
                .collect()
        })
        .collect();
    let kept_width = keep.iter().filter(|&&kept| kept).count();

    let mut columns: Vec<String> = (0..kept_width).map(|index| index.to_string()).collect();
    if rules.row_looks_like_header(&rows[0]) {
        let header = rows.remove(0);
        columns = header
            .into_iter()
            .map(|cell| cell.map(|value| value.trim().to_string()).unwrap_or_default())
            .collect();
    }

    let columns = columns
        .iter()
        .map(|label| rules.normalize_label(label))
        .collect();

    Some(DocumentTable { columns, rows, date })
}

fn blank_to_null(cell: String) -> Option<String> {
    if cell.trim().is_empty() { None } else { Some(cell) }
}

pub fn non_null_cells(row: &[Option<String>]) -> usize {
    row.iter().flatten().count()
}

impl DocumentTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column labels as persisted, with `Date` leading when resolved.
    pub fn output_columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        if self.date.is_some() {
            columns.push("Date".to_string());
        }
        columns.extend(self.columns.iter().cloned());
        columns
    }

    /// Rows as persisted, with the date replicated into the leading cell.
    pub fn output_rows(&self) -> Vec<Vec<Option<String>>> {
        let date_cell = self.date.map(|date| date.format("%Y-%m-%d").to_string());
        self.rows
            .iter()
            .map(|row| {
                let mut cells = Vec::with_capacity(row.len() + 1);
                if let Some(value) = &date_cell {
                    cells.push(Some(value.clone()));
                }
                cells.extend(row.iter().cloned());
                cells
            })
            .collect()
    }

    /// Rows eligible for the master table. Qualification gates master
    /// inclusion only; the per-document CSV always keeps every row.
    pub fn qualifying_rows(&self) -> Vec<Vec<Option<String>>> {
        self.output_rows()
            .into_iter()
            .filter(|row| non_null_cells(row) >= MIN_QUALIFYING_CELLS)
            .collect()
    }
}

/// Corpus-wide accumulation of qualifying rows, in document-processing
/// order. Columns are unioned by name in first-appearance order so
/// heterogeneous documents still line up; cells without a matching column
/// stay null.
#[derive(Debug, Default)]
pub struct MasterTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl MasterTable {
    pub fn append(&mut self, columns: &[String], rows: Vec<Vec<Option<String>>>) {
        // Duplicate labels within one document map to distinct master
        // columns, left to right.
        let mut indices: Vec<usize> = Vec::with_capacity(columns.len());
        for name in columns {
            let found = self
                .columns
                .iter()
                .enumerate()
                .find(|(index, existing)| *existing == name && !indices.contains(index))
                .map(|(index, _)| index);
            let index = match found {
                Some(index) => index,
                None => {
                    self.columns.push(name.clone());
                    for row in &mut self.rows {
                        row.push(None);
                    }
                    self.columns.len() - 1
                }
            };
            indices.push(index);
        }

        for row in rows {
            let mut mapped = vec![None; self.columns.len()];
            for (cell, &index) in row.into_iter().zip(&indices) {
                mapped[index] = cell;
            }
            self.rows.push(mapped);
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
