use serde::{Serialize, Deserialize};
use std::fmt;

/// Small epsilon added inside log() to prevent log(0) = -inf.
const EPS: f64 = 1e-12;

/// Selects which loss function the classifier trains with.
///
/// - `Mse`          — mean-squared error against the one-hot target; the
///                    linear scores are used directly (identity head).
/// - `CrossEntropy` — categorical cross-entropy over a Softmax head. The
///   gradient is the combined Softmax+CE gradient (predicted - expected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    Mse,
    CrossEntropy,
}

impl LossKind {
    /// Scalar loss for one sample.
    ///
    /// `predicted` — class scores after the head (probabilities for
    /// `CrossEntropy`, raw scores for `Mse`), shape [n_classes]
    /// `expected`  — one-hot target distribution, shape [n_classes]
    pub fn loss(self, predicted: &[f64], expected: &[f64]) -> f64 {
        match self {
            LossKind::Mse => {
                let n = predicted.len() as f64;
                predicted.iter().zip(expected.iter())
                    .map(|(p, e)| (p - e).powi(2))
                    .sum::<f64>() / n
            }
            LossKind::CrossEntropy => {
                predicted.iter().zip(expected.iter())
                    .map(|(p, e)| -e * (p + EPS).ln())
                    .sum()
            }
        }
    }

    /// Per-score gradient for one sample.
    ///
    /// For `CrossEntropy` this is the combined Softmax + cross-entropy
    /// gradient w.r.t. the pre-softmax scores, which simplifies to
    /// `predicted - expected`; the softmax derivative must not be applied
    /// again on top.
    pub fn derivative(self, predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        match self {
            LossKind::Mse => {
                let n = predicted.len() as f64;
                predicted.iter().zip(expected.iter())
                    .map(|(p, e)| 2.0 * (p - e) / n)
                    .collect()
            }
            LossKind::CrossEntropy => {
                predicted.iter().zip(expected.iter())
                    .map(|(p, e)| p - e)
                    .collect()
            }
        }
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossKind::Mse => write!(f, "mse"),
            LossKind::CrossEntropy => write!(f, "cross_entropy"),
        }
    }
}

/// Weight-penalty term added to the gradient during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegularizerKind {
    None,
    L1,
    L2,
}

impl RegularizerKind {
    /// Penalty contribution to the loss for one weight value.
    pub fn penalty(self, weight: f64, strength: f64) -> f64 {
        match self {
            RegularizerKind::None => 0.0,
            RegularizerKind::L1 => strength * weight.abs(),
            RegularizerKind::L2 => strength * weight * weight,
        }
    }

    /// Gradient contribution for one weight value.
    pub fn gradient(self, weight: f64, strength: f64) -> f64 {
        match self {
            RegularizerKind::None => 0.0,
            // Subgradient: ±strength, 0 exactly at zero.
            RegularizerKind::L1 => {
                if weight > 0.0 {
                    strength
                } else if weight < 0.0 {
                    -strength
                } else {
                    0.0
                }
            }
            RegularizerKind::L2 => 2.0 * strength * weight,
        }
    }
}

impl fmt::Display for RegularizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegularizerKind::None => write!(f, "none"),
            RegularizerKind::L1 => write!(f, "l1"),
            RegularizerKind::L2 => write!(f, "l2"),
        }
    }
}
