use thiserror::Error;

use crate::data::store::SplitKind;

/// Errors surfaced by the cross-validation pipeline.
///
/// All of these are fatal: a failed fold aborts the whole run, there is no
/// skip-and-continue and no partial resume (results gathered before the
/// failure are discarded with the run).
#[derive(Debug, Error)]
pub enum EvalError {
    /// A dataset record is too narrow to hold features plus a label column.
    #[error("record {index} has {cols} column(s); need at least 2 (features + label)")]
    Shape { index: usize, cols: usize },

    /// Ground-truth and prediction vectors differ in length.
    #[error("length mismatch: {expected} ground-truth labels vs {actual} predictions")]
    LengthMismatch { expected: usize, actual: usize },

    /// A fold produced a curve of a different length than fold 0, so the
    /// elementwise mean across folds is undefined.
    #[error("fold {fold} produced a curve of length {actual}, expected {expected}")]
    CurveLengthMismatch {
        fold: usize,
        expected: usize,
        actual: usize,
    },

    /// A fold's split file could not be read.
    #[error("fold {fold}: failed to load {kind} split")]
    SplitLoad {
        fold: usize,
        kind: SplitKind,
        #[source]
        source: std::io::Error,
    },

    /// A fold's split file was read but did not parse as numeric records.
    #[error("fold {fold}: {kind} split: {message}")]
    SplitParse {
        fold: usize,
        kind: SplitKind,
        message: String,
    },

    /// Report or checkpoint writing failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A JSON artifact (checkpoint, curves) could not be serialized.
    #[error("failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Confusion-matrix image could not be encoded.
    #[error("failed to write confusion-matrix image: {0}")]
    Image(#[from] image::ImageError),
}
