use serde::{Serialize, Deserialize};
use std::path::Path;

use crate::classifier::TrainOptions;
use crate::error::EvalError;
use crate::loss::{LossKind, RegularizerKind};

/// Immutable hyperparameter bundle for one cross-validation run.
///
/// The string-joined form of the fields ([`RunConfig::run_id`]) is the
/// canonical identifier every artifact path is keyed by; two configs that
/// differ in any field produce different identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub learning_rate: f64,
    pub loss: LossKind,
    /// Early-stop threshold on the epoch-over-epoch loss delta; 0 disables.
    pub stop: f64,
    pub regularizer: RegularizerKind,
    pub regularization_penalty: f64,
    pub epochs: usize,
    pub n_batches: usize,
}

impl RunConfig {
    /// Canonical run identifier: the seven hyperparameters joined with `_`.
    ///
    /// Floats are printed with Rust's shortest round-trip formatting and the
    /// enums with their snake_case names, so the identifier is deterministic
    /// for a given configuration.
    pub fn run_id(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}_{}_{}",
            self.learning_rate,
            self.loss,
            self.stop,
            self.regularizer,
            self.regularization_penalty,
            self.epochs,
            self.n_batches
        )
    }

    /// Expands the config into the per-fold training argument bundle.
    pub fn train_options(&self, save: bool, file_path: impl Into<std::path::PathBuf>) -> TrainOptions {
        TrainOptions {
            learning_rate: self.learning_rate,
            n_batches: self.n_batches,
            epochs: self.epochs,
            loss: self.loss,
            regularizer: self.regularizer,
            regularizer_penalty: self.regularization_penalty,
            stop: self.stop,
            save,
            file_path: file_path.into(),
        }
    }

    /// Deserializes a `RunConfig` from a JSON file.
    pub fn load_json(path: &Path) -> Result<RunConfig, EvalError> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RunConfig {
        RunConfig {
            learning_rate: 0.01,
            loss: LossKind::CrossEntropy,
            stop: 0.0,
            regularizer: RegularizerKind::L2,
            regularization_penalty: 0.001,
            epochs: 50,
            n_batches: 4,
        }
    }

    #[test]
    fn run_id_joins_all_fields_in_order() {
        assert_eq!(config().run_id(), "0.01_cross_entropy_0_l2_0.001_50_4");
    }

    #[test]
    fn run_id_is_deterministic() {
        assert_eq!(config().run_id(), config().run_id());
    }

    #[test]
    fn differing_configs_get_differing_ids() {
        let mut other = config();
        other.n_batches = 8;
        assert_ne!(config().run_id(), other.run_id());
    }

    #[test]
    fn train_options_carry_the_hyperparameters() {
        let opts = config().train_options(true, "out/models");
        assert_eq!(opts.learning_rate, 0.01);
        assert_eq!(opts.epochs, 50);
        assert_eq!(opts.regularizer, RegularizerKind::L2);
        assert!(opts.save);
    }
}
