//! Reporting sink for cross-validation artifacts.
//!
//! Everything a run produces lands under one root:
//!
//! ```text
//! {root}/{model}/logs/{run_id}/{run_id}_{fold}/scores_{run_id}.txt
//! {root}/{model}/logs/{run_id}/{run_id}_{fold}/cm_{run_id}.png
//! {root}/{model}/logs/{run_id}/{run_id}_{fold}/cm_n_{run_id}.png
//! {root}/{model}/logs/{run_id}/curves_{run_id}.json
//! {root}/{model}/models/{run_id}/{run_id}_{fold}.json
//! ```

use image::{Rgb, RgbImage};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::EvalError;
use crate::metrics;

/// Pixel edge of one confusion-matrix cell.
const CELL: u32 = 32;

/// Output locations for one `(model, run_id)` pair.
pub struct RunPaths {
    root: PathBuf,
    model: String,
    run_id: String,
}

impl RunPaths {
    pub fn new(root: impl Into<PathBuf>, model: impl Into<String>, run_id: impl Into<String>) -> RunPaths {
        RunPaths {
            root: root.into(),
            model: model.into(),
            run_id: run_id.into(),
        }
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(&self.model).join("logs").join(&self.run_id)
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join(&self.model).join("models").join(&self.run_id)
    }

    /// Per-fold artifact directory `{run_id}_{fold}` under the logs tree.
    pub fn fold_dir(&self, fold: usize) -> PathBuf {
        self.logs_dir().join(format!("{}_{}", self.run_id, fold))
    }

    /// Creates the run's output directories. Called once, before fold 0
    /// starts training.
    pub fn bootstrap(&self) -> Result<(), EvalError> {
        std::fs::create_dir_all(self.logs_dir())?;
        std::fs::create_dir_all(self.models_dir())?;
        Ok(())
    }
}

/// Writes the per-class score report for one fold.
///
/// Fixed layout: labels, precision, labels, recall, labels, F1.
pub fn write_scores(
    paths: &RunPaths,
    fold: usize,
    y_true: &[i64],
    y_pred: &[i64],
) -> Result<(), EvalError> {
    let (classes, precision, recall, f1) = metrics::precision_recall_f1(y_true, y_pred)?;

    let dir = paths.fold_dir(fold);
    std::fs::create_dir_all(&dir)?;
    let mut file = std::fs::File::create(dir.join(format!("scores_{}.txt", paths.run_id)))?;

    writeln!(file, "Labels:\n{:?}", classes)?;
    writeln!(file, "Precision scores:\n{:?}", precision)?;
    writeln!(file, "Labels:\n{:?}", classes)?;
    writeln!(file, "Recall scores:\n{:?}", recall)?;
    writeln!(file, "Labels:\n{:?}", classes)?;
    writeln!(file, "F1 scores:\n{:?}", f1)?;
    Ok(())
}

/// Renders one fold's confusion matrix to a PNG.
///
/// `normalize` selects the row-normalized variant (`cm_n_*.png`) over the raw
/// count variant (`cm_*.png`). Cells are shaded by value relative to the
/// matrix maximum, darker meaning larger.
pub fn save_confusion_matrix(
    paths: &RunPaths,
    fold: usize,
    y_true: &[i64],
    y_pred: &[i64],
    normalize: bool,
) -> Result<(), EvalError> {
    let (_classes, counts) = metrics::confusion_matrix(y_true, y_pred)?;

    let values: Vec<Vec<f64>> = if normalize {
        metrics::normalize_rows(&counts)
    } else {
        counts
            .iter()
            .map(|row| row.iter().map(|&v| v as f64).collect())
            .collect()
    };

    let dir = paths.fold_dir(fold);
    std::fs::create_dir_all(&dir)?;
    let file_name = if normalize {
        format!("cm_n_{}.png", paths.run_id)
    } else {
        format!("cm_{}.png", paths.run_id)
    };

    render_heatmap(&values, &dir.join(file_name))
}

/// Per-fold curve bundle serialized next to the per-fold directories.
#[derive(Serialize)]
struct CurvesArtifact<'a> {
    accuracies_train: &'a [Vec<f64>],
    accuracies_val: &'a [Vec<f64>],
    losses: &'a [Vec<f64>],
}

/// Writes all folds' accuracy/loss curves as one JSON artifact, the textual
/// stand-in for the original all-folds training plot.
pub fn write_curves(
    paths: &RunPaths,
    accuracies_train: &[Vec<f64>],
    accuracies_val: &[Vec<f64>],
    losses: &[Vec<f64>],
) -> Result<(), EvalError> {
    let dir = paths.logs_dir();
    std::fs::create_dir_all(&dir)?;
    let file = std::fs::File::create(dir.join(format!("curves_{}.json", paths.run_id)))?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(
        writer,
        &CurvesArtifact { accuracies_train, accuracies_val, losses },
    )?;
    Ok(())
}

/// Paints a k×k value grid as shaded cells and saves it as PNG.
fn render_heatmap(values: &[Vec<f64>], path: &Path) -> Result<(), EvalError> {
    let k = values.len().max(1) as u32;
    let max = values
        .iter()
        .flatten()
        .cloned()
        .fold(0.0f64, f64::max)
        .max(f64::MIN_POSITIVE);

    let mut img = RgbImage::new(k * CELL, k * CELL);
    for (i, row) in values.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            let intensity = (value / max).clamp(0.0, 1.0);
            // White for zero, saturated blue for the maximum.
            let fade = (255.0 * (1.0 - intensity)) as u8;
            let color = Rgb([fade, fade, 255]);
            for dy in 0..CELL {
                for dx in 0..CELL {
                    img.put_pixel(j as u32 * CELL + dx, i as u32 * CELL + dy, color);
                }
            }
        }
    }

    img.save(path)?;
    Ok(())
}
