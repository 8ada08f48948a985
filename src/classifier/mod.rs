pub mod linear;

use std::path::PathBuf;

use crate::error::EvalError;
use crate::loss::{LossKind, RegularizerKind};
use crate::math::matrix::Matrix;

pub use linear::LinearClassifier;

/// Hyperparameters and side-effect switches for one training run.
///
/// # Fields
/// - `learning_rate`       — SGD step size
/// - `n_batches`           — mini-batches per epoch; the batch size is derived
///                           from the training-set size
/// - `epochs`              — upper bound on full passes over the data
/// - `loss`                — which loss function to train with
/// - `regularizer`         — weight penalty kind
/// - `regularizer_penalty` — penalty strength (ignored for `None`)
/// - `stop`                — early-stop threshold: training ends once the
///                           epoch-over-epoch absolute loss delta falls below
///                           this; `0.0` disables early stopping
/// - `save`                — whether to checkpoint the trained model
/// - `file_path`           — checkpoint directory root (used iff `save`)
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub learning_rate: f64,
    pub n_batches: usize,
    pub epochs: usize,
    pub loss: LossKind,
    pub regularizer: RegularizerKind,
    pub regularizer_penalty: f64,
    pub stop: f64,
    pub save: bool,
    pub file_path: PathBuf,
}

/// The fixed contract between the cross-validation orchestrator and a
/// trainable classifier.
///
/// One instance is constructed per fold, trained, read out and discarded;
/// implementations own their post-training curves and hand them out by
/// reference so the orchestrator can copy them before disposal.
pub trait Classifier {
    /// Trains on `(x_train, y_train)`, tracking per-epoch accuracy on both
    /// the training set and `(x_val, y_val)`.
    fn train(
        &mut self,
        x_train: &Matrix,
        y_train: &[i64],
        x_val: &Matrix,
        y_val: &[i64],
        opts: &TrainOptions,
    ) -> Result<(), EvalError>;

    /// Predicted label value for every row of `x`.
    fn predict(&self, x: &Matrix) -> Vec<i64>;

    /// Fraction of rows of `x` whose prediction matches `y`.
    fn evaluate_model(&self, x: &Matrix, y: &[i64]) -> f64;

    /// Per-epoch training accuracy recorded by the last `train` call.
    fn accuracies_train(&self) -> &[f64];

    /// Per-epoch validation accuracy recorded by the last `train` call.
    fn accuracies_val(&self) -> &[f64];

    /// Per-epoch mean training loss recorded by the last `train` call.
    fn losses(&self) -> &[f64];
}
