pub mod split;
pub mod store;

pub use split::split_records;
pub use store::{FoldStore, SplitKind};
