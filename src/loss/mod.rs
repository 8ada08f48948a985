pub mod kind;

pub use kind::{LossKind, RegularizerKind};
