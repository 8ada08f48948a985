use rand::seq::SliceRandom;
use serde::{Serialize, Deserialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::classifier::{Classifier, TrainOptions};
use crate::error::EvalError;
use crate::loss::LossKind;
use crate::math::matrix::Matrix;

/// Multinomial linear classifier trained with mini-batch SGD.
///
/// One weight column per class value observed in the training labels; the
/// predicted label is the class whose score is largest. With
/// `LossKind::CrossEntropy` the scores go through a Softmax head, with
/// `LossKind::Mse` they are used directly.
///
/// After `train` the per-epoch curves (`accuracies_train`, `accuracies_val`,
/// `losses`) are readable until the instance is dropped; the orchestrator
/// copies them out before disposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearClassifier {
    /// Per-fold instance name, e.g. `{run_id}_{fold}`.
    pub name: String,
    /// Run identifier shared by all folds of one configuration.
    pub base_name: String,
    weights: Matrix,
    biases: Matrix,
    /// Sorted distinct label values seen during training; column `j` of the
    /// weight matrix scores `classes[j]`.
    classes: Vec<i64>,
    pub accuracies_train: Vec<f64>,
    pub accuracies_val: Vec<f64>,
    pub losses: Vec<f64>,
}

impl LinearClassifier {
    pub fn new(name: impl Into<String>, base_name: impl Into<String>) -> LinearClassifier {
        LinearClassifier {
            name: name.into(),
            base_name: base_name.into(),
            weights: Matrix::default(),
            biases: Matrix::default(),
            classes: Vec::new(),
            accuracies_train: Vec::new(),
            accuracies_val: Vec::new(),
            losses: Vec::new(),
        }
    }

    /// Class scores for one feature row: `z = x·W + b`.
    fn scores(&self, row: &[f64]) -> Vec<f64> {
        let z = Matrix::from_data(vec![row.to_vec()]) * self.weights.clone()
            + self.biases.clone();
        z.data[0].clone()
    }

    /// Applies the output head for the configured loss.
    fn head(loss: LossKind, z: Vec<f64>) -> Vec<f64> {
        match loss {
            LossKind::Mse => z,
            LossKind::CrossEntropy => softmax(z),
        }
    }

    /// Serializes the trained model to a pretty-printed JSON file.
    pub fn save_json(&self, path: &Path) -> Result<(), EvalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a model from a JSON file previously written by `save_json`.
    pub fn load_json(path: &Path) -> Result<LinearClassifier, EvalError> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Classifier for LinearClassifier {
    fn train(
        &mut self,
        x_train: &Matrix,
        y_train: &[i64],
        x_val: &Matrix,
        y_val: &[i64],
        opts: &TrainOptions,
    ) -> Result<(), EvalError> {
        let n = x_train.rows;
        let n_features = x_train.cols;

        self.classes = y_train.iter().copied().collect::<BTreeSet<i64>>().into_iter().collect();
        let k = self.classes.len();
        self.weights = Matrix::xavier(n_features, k);
        self.biases = Matrix::zeros(1, k);
        self.accuracies_train.clear();
        self.accuracies_val.clear();
        self.losses.clear();

        let column_of: std::collections::HashMap<i64, usize> =
            self.classes.iter().enumerate().map(|(j, &c)| (c, j)).collect();
        let batch_size = (n + opts.n_batches.max(1) - 1) / opts.n_batches.max(1);
        let batch_size = batch_size.max(1);

        let mut indices: Vec<usize> = (0..n).collect();

        for _epoch in 1..=opts.epochs {
            // Shuffle sample order each epoch.
            indices.shuffle(&mut rand::thread_rng());

            let mut total_loss = 0.0;

            for batch in indices.chunks(batch_size) {
                let mut w_grad = Matrix::zeros(n_features, k);
                let mut b_grad = Matrix::zeros(1, k);

                for &idx in batch {
                    let row = x_train.row(idx);
                    let predicted = Self::head(opts.loss, self.scores(row));

                    let mut expected = vec![0.0; k];
                    if let Some(&col) = column_of.get(&y_train[idx]) {
                        expected[col] = 1.0;
                    }

                    total_loss += opts.loss.loss(&predicted, &expected);

                    // Outer product xᵀ·δ accumulates the weight gradient.
                    let delta =
                        Matrix::from_data(vec![opts.loss.derivative(&predicted, &expected)]);
                    let input = Matrix::from_data(vec![row.to_vec()]);
                    w_grad = w_grad + input.transpose() * delta.clone();
                    b_grad = b_grad + delta;
                }

                // Average over the mini-batch and apply one SGD step, with
                // the regularizer folded into the weight gradient.
                let inv_batch = 1.0 / batch.len() as f64;
                let penalty_grad = self
                    .weights
                    .map(|w| opts.regularizer.gradient(w, opts.regularizer_penalty));
                let w_step = (w_grad.map(|g| g * inv_batch) + penalty_grad)
                    .map(|g| g * opts.learning_rate);
                self.weights = self.weights.clone() - w_step;
                self.biases = self.biases.clone()
                    - b_grad.map(|g| g * inv_batch * opts.learning_rate);
            }

            // Epoch loss: mean data loss plus the weight penalty.
            let penalty: f64 = self
                .weights
                .data
                .iter()
                .flatten()
                .map(|&w| opts.regularizer.penalty(w, opts.regularizer_penalty))
                .sum();
            let epoch_loss = total_loss / n as f64 + penalty;

            let train_accuracy = self.evaluate_model(x_train, y_train);
            let val_accuracy = self.evaluate_model(x_val, y_val);
            self.losses.push(epoch_loss);
            self.accuracies_train.push(train_accuracy);
            self.accuracies_val.push(val_accuracy);

            // Early stop once the loss settles.
            if opts.stop > 0.0 && self.losses.len() >= 2 {
                let prev = self.losses[self.losses.len() - 2];
                if (prev - epoch_loss).abs() < opts.stop {
                    break;
                }
            }
        }

        if opts.save {
            let path = opts
                .file_path
                .join(&self.base_name)
                .join(format!("{}.json", self.name));
            self.save_json(&path)?;
        }

        Ok(())
    }

    fn predict(&self, x: &Matrix) -> Vec<i64> {
        (0..x.rows)
            .map(|i| {
                let z = self.scores(x.row(i));
                self.classes.get(argmax(&z)).copied().unwrap_or(0)
            })
            .collect()
    }

    fn evaluate_model(&self, x: &Matrix, y: &[i64]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        let correct = self
            .predict(x)
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| p == t)
            .count();
        correct as f64 / y.len() as f64
    }

    fn accuracies_train(&self) -> &[f64] {
        &self.accuracies_train
    }

    fn accuracies_val(&self) -> &[f64] {
        &self.accuracies_val
    }

    fn losses(&self) -> &[f64] {
        &self.losses
    }
}

/// Numerically stable softmax (max-shifted before exponentiation).
fn softmax(z: Vec<f64>) -> Vec<f64> {
    let max = z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = z.iter().map(|&v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the maximum element in a slice.
fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loss::RegularizerKind;
    use std::path::PathBuf;

    fn options(epochs: usize, stop: f64) -> TrainOptions {
        TrainOptions {
            learning_rate: 0.5,
            n_batches: 2,
            epochs,
            loss: LossKind::CrossEntropy,
            regularizer: RegularizerKind::None,
            regularizer_penalty: 0.0,
            stop,
            save: false,
            file_path: PathBuf::new(),
        }
    }

    /// 1-D, linearly separable: class 3 clusters at -1, class 7 at +1.
    /// Non-contiguous label values on purpose.
    fn separable() -> (Matrix, Vec<i64>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..10 {
            let jitter = i as f64 * 0.02;
            rows.push(vec![-1.0 - jitter]);
            labels.push(3);
            rows.push(vec![1.0 + jitter]);
            labels.push(7);
        }
        (Matrix::from_data(rows), labels)
    }

    #[test]
    fn learns_a_separable_problem() {
        let (x, y) = separable();
        let mut clf = LinearClassifier::new("t_0", "t");
        clf.train(&x, &y, &x, &y, &options(200, 0.0)).unwrap();

        assert!(clf.evaluate_model(&x, &y) > 0.9);
        // Predictions are class values, not column indices.
        let predictions = clf.predict(&x);
        assert!(predictions.iter().all(|p| *p == 3 || *p == 7));
    }

    #[test]
    fn curves_cover_every_epoch() {
        let (x, y) = separable();
        let mut clf = LinearClassifier::new("t_0", "t");
        clf.train(&x, &y, &x, &y, &options(15, 0.0)).unwrap();

        assert_eq!(clf.losses().len(), 15);
        assert_eq!(clf.accuracies_train().len(), 15);
        assert_eq!(clf.accuracies_val().len(), 15);
    }

    #[test]
    fn loose_stop_threshold_ends_training_early() {
        let (x, y) = separable();
        let mut clf = LinearClassifier::new("t_0", "t");
        clf.train(&x, &y, &x, &y, &options(500, 1e9)).unwrap();

        // Any consecutive loss delta is below the threshold, so training
        // stops at the second epoch.
        assert_eq!(clf.losses().len(), 2);
    }

    #[test]
    fn checkpoint_round_trips_through_json() {
        let (x, y) = separable();
        let mut clf = LinearClassifier::new("t_0", "t");
        clf.train(&x, &y, &x, &y, &options(20, 0.0)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t_0.json");
        clf.save_json(&path).unwrap();

        let restored = LinearClassifier::load_json(&path).unwrap();
        assert_eq!(restored.predict(&x), clf.predict(&x));
        assert_eq!(restored.name, "t_0");
    }
}
