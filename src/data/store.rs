use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::EvalError;

/// Which of a fold's three disjoint splits to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitKind {
    Training,
    Validation,
    Test,
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitKind::Training => write!(f, "training"),
            SplitKind::Validation => write!(f, "validation"),
            SplitKind::Test => write!(f, "test"),
        }
    }
}

/// Per-fold dataset store.
///
/// Splits live as CSV files under one directory, addressed as
/// `{fold}_{kind}.csv` (e.g. `0_training.csv`, `2_test.csv`).
///
/// File format:
/// - UTF-8, comma-separated, one record per row
/// - optional header row (auto-detected: a first row containing any
///   non-numeric, non-empty cell is skipped)
/// - every data row must have the same number of columns
pub struct FoldStore {
    root: PathBuf,
}

impl FoldStore {
    pub fn new(root: impl Into<PathBuf>) -> FoldStore {
        FoldStore { root: root.into() }
    }

    /// Path of one split file, without touching the filesystem.
    pub fn split_path(&self, fold: usize, kind: SplitKind) -> PathBuf {
        self.root.join(format!("{}_{}.csv", fold, kind))
    }

    /// Loads one split as raw numeric records (label column still attached).
    ///
    /// A missing or unreadable file is fatal and reported with the fold
    /// index; there is no fallback.
    pub fn load(&self, fold: usize, kind: SplitKind) -> Result<Vec<Vec<f64>>, EvalError> {
        let path = self.split_path(fold, kind);
        let text = std::fs::read_to_string(&path)
            .map_err(|source| EvalError::SplitLoad { fold, kind, source })?;
        parse_records(&text).map_err(|message| EvalError::SplitParse { fold, kind, message })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Parses CSV text into uniform-width numeric records.
fn parse_records(text: &str) -> Result<Vec<Vec<f64>>, String> {
    let mut lines = text.lines().peekable();

    // Auto-detect header: skip first line if any cell is non-numeric.
    if let Some(first) = lines.peek() {
        if is_header(first) {
            lines.next();
        }
    }

    let mut records: Vec<Vec<f64>> = Vec::new();

    for (row_idx, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record = line
            .split(',')
            .map(|cell| {
                cell.trim()
                    .parse::<f64>()
                    .map_err(|_| format!("row {}: '{}' is not a valid number", row_idx + 1, cell))
            })
            .collect::<Result<Vec<f64>, String>>()?;

        records.push(record);
    }

    if records.is_empty() {
        return Err("split contains no data rows".into());
    }

    // Verify all rows have the same width.
    let width = records[0].len();
    for (i, record) in records.iter().enumerate() {
        if record.len() != width {
            return Err(format!(
                "row {}: column count {} does not match first row's {}",
                i + 1,
                record.len(),
                width
            ));
        }
    }

    Ok(records)
}

/// Returns `true` if the row looks like a header (any cell non-numeric).
fn is_header(line: &str) -> bool {
    line.split(',').any(|cell| {
        let t = cell.trim();
        !t.is_empty() && t.parse::<f64>().is_err()
    })
}
