pub mod math;
pub mod error;
pub mod data;
pub mod loss;
pub mod classifier;
pub mod metrics;
pub mod report;
pub mod cv;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use error::EvalError;
pub use data::split::split_records;
pub use data::store::{FoldStore, SplitKind};
pub use loss::{LossKind, RegularizerKind};
pub use classifier::{Classifier, TrainOptions, LinearClassifier};
pub use cv::{CvOutcome, Mode, NFold, RunConfig};
