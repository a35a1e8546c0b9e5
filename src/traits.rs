//! Trait definitions

mod data_set;
mod scalar_tree;

pub use data_set::DataSet;
pub use scalar_tree::ScalarTree;
