//! n-fold cross-validation orchestrator.
//!
//! Folds run strictly one at a time: each fold constructs a fresh classifier
//! instance, trains it, copies the curves out and drops it before the next
//! fold starts, so at most one classifier is ever live.

pub mod run_config;

use std::path::PathBuf;

use crate::classifier::Classifier;
use crate::data::split::split_records;
use crate::data::store::{FoldStore, SplitKind};
use crate::error::EvalError;
use crate::metrics;
use crate::report::{self, RunPaths};

pub use run_config::RunConfig;

/// What each fold is evaluated against.
///
/// - `Validate` — train on the fold's training split, evaluate on its
///   validation split, report per fold.
/// - `Test` — train on training + validation concatenated (order preserved),
///   evaluate on the held-out test split, report only in aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Validate,
    Test,
}

/// Aggregated result of a full cross-validation run.
#[derive(Debug, Clone)]
pub struct CvOutcome {
    /// Arithmetic mean of the per-fold evaluation accuracies.
    pub final_accuracy: f64,
    /// Elementwise mean across folds of the training-accuracy curves.
    pub mean_accuracy_train: Vec<f64>,
    /// Elementwise mean across folds of the validation-accuracy curves.
    pub mean_accuracy_val: Vec<f64>,
    /// Elementwise mean across folds of the loss curves.
    pub mean_loss: Vec<f64>,
}

/// Cross-validation runner, generic over how classifier instances are built.
///
/// `build` receives `(instance_name, run_id)` and returns a fresh, untrained
/// classifier; it is invoked exactly once per fold.
pub struct NFold<C, F>
where
    C: Classifier,
    F: Fn(&str, &str) -> C,
{
    store: FoldStore,
    out_root: PathBuf,
    model_name: String,
    build: F,
}

impl<C, F> NFold<C, F>
where
    C: Classifier,
    F: Fn(&str, &str) -> C,
{
    pub fn new(
        store: FoldStore,
        out_root: impl Into<PathBuf>,
        model_name: impl Into<String>,
        build: F,
    ) -> NFold<C, F> {
        NFold {
            store,
            out_root: out_root.into(),
            model_name: model_name.into(),
            build,
        }
    }

    /// Runs `n_folds`-fold cross-validation for `config`.
    ///
    /// `save` controls per-fold model checkpointing. Any fold failure aborts
    /// the whole run; results gathered so far are discarded.
    pub fn run(
        &self,
        config: &RunConfig,
        n_folds: usize,
        save: bool,
        mode: Mode,
    ) -> Result<CvOutcome, EvalError> {
        let run_id = config.run_id();
        let paths = RunPaths::new(&self.out_root, &self.model_name, &run_id);

        let mut accuracies: Vec<f64> = Vec::new();
        let mut accuracies_train: Vec<Vec<f64>> = Vec::new();
        let mut accuracies_val: Vec<Vec<f64>> = Vec::new();
        let mut losses: Vec<Vec<f64>> = Vec::new();
        let mut y_pred_folds: Vec<Vec<i64>> = Vec::new();
        let mut y_actual_folds: Vec<Vec<i64>> = Vec::new();

        println!("### Beginning n-fold cross validation with parameters: ###");
        println!("## Classifier name: {} ##", run_id);
        println!("## Learning rate: {} ##", config.learning_rate);
        println!("## Epochs: {} ##", config.epochs);
        println!("## Regularizer: {} ##", config.regularizer);
        println!("## Regularizer penalty: {} ##", config.regularization_penalty);

        paths.bootstrap()?;
        // The classifier appends `{base_name}/{name}.json` itself, so it gets
        // the models root rather than the per-run directory.
        let opts =
            config.train_options(save, self.out_root.join(&self.model_name).join("models"));

        for fold in 0..n_folds {
            println!("## Fold: {} ##", fold);

            // Each fold trains completely separately on its own splits.
            let mut train_records = self.store.load(fold, SplitKind::Training)?;
            let validation_records = self.store.load(fold, SplitKind::Validation)?;

            let eval_records = match mode {
                Mode::Validate => validation_records,
                Mode::Test => {
                    // Final test: the model gets training + validation data
                    // and is judged on the held-out test split.
                    train_records.extend(validation_records);
                    self.store.load(fold, SplitKind::Test)?
                }
            };

            let (x_train, y_train) = split_records(&train_records)?;
            let (x_eval, y_eval) = split_records(&eval_records)?;

            // One classifier per fold; nothing leaks across folds.
            let mut clf = (self.build)(&format!("{}_{}", run_id, fold), &run_id);
            clf.train(&x_train, &y_train, &x_eval, &y_eval, &opts)?;

            // Copy the curves out before the instance is dropped.
            accuracies_train.push(clf.accuracies_train().to_vec());
            accuracies_val.push(clf.accuracies_val().to_vec());
            losses.push(clf.losses().to_vec());

            let accuracy = clf.evaluate_model(&x_eval, &y_eval);
            let y_pred = clf.predict(&x_eval);
            drop(clf);

            if mode == Mode::Validate {
                report::save_confusion_matrix(&paths, fold, &y_eval, &y_pred, true)?;
                report::save_confusion_matrix(&paths, fold, &y_eval, &y_pred, false)?;
                report::write_scores(&paths, fold, &y_eval, &y_pred)?;
            }

            println!("## Validation Accuracy: {} ##", accuracy);

            accuracies.push(accuracy);
            y_actual_folds.push(y_eval);
            y_pred_folds.push(y_pred);
        }

        report::write_curves(&paths, &accuracies_train, &accuracies_val, &losses)?;

        match mode {
            Mode::Validate => println!("### Finished n-fold cross validation ###"),
            Mode::Test => {
                println!("### Finished final test ###");

                // One aggregate report over all folds, in fold order.
                let y_actual = concat_folds(&y_actual_folds);
                let y_pred = concat_folds(&y_pred_folds);
                report::save_confusion_matrix(&paths, n_folds, &y_actual, &y_pred, true)?;
                report::save_confusion_matrix(&paths, n_folds, &y_actual, &y_pred, false)?;
                report::write_scores(&paths, n_folds, &y_actual, &y_pred)?;

                let mad = metrics::mean_absolute_deviation(&y_actual, &y_pred)?;
                println!("## MAD: {} ##", mad);
            }
        }

        let final_accuracy = if accuracies.is_empty() {
            0.0
        } else {
            accuracies.iter().sum::<f64>() / accuracies.len() as f64
        };
        println!("##### Average Accuracy: {} #####", final_accuracy);

        Ok(CvOutcome {
            final_accuracy,
            mean_accuracy_train: mean_curves(&accuracies_train)?,
            mean_accuracy_val: mean_curves(&accuracies_val)?,
            mean_loss: mean_curves(&losses)?,
        })
    }
}

/// Flattens per-fold label vectors into one sequence, in fold order.
fn concat_folds(folds: &[Vec<i64>]) -> Vec<i64> {
    folds.iter().flatten().copied().collect()
}

/// Elementwise mean across folds.
///
/// Early stopping can end folds at different epoch counts; averaging ragged
/// curves is undefined, so every fold is checked against fold 0 and a
/// mismatch aborts instead of silently truncating or padding.
fn mean_curves(folds: &[Vec<f64>]) -> Result<Vec<f64>, EvalError> {
    let Some(first) = folds.first() else {
        return Ok(Vec::new());
    };

    for (fold, curve) in folds.iter().enumerate().skip(1) {
        if curve.len() != first.len() {
            return Err(EvalError::CurveLengthMismatch {
                fold,
                expected: first.len(),
                actual: curve.len(),
            });
        }
    }

    let mut mean = vec![0.0; first.len()];
    for curve in folds {
        for (acc, &v) in mean.iter_mut().zip(curve.iter()) {
            *acc += v;
        }
    }
    for acc in &mut mean {
        *acc /= folds.len() as f64;
    }
    Ok(mean)
}
