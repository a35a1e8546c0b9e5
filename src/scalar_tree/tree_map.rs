//! A cache of scalar trees, one per dataset

use crate::traits::{DataSet, ScalarTree};
use std::collections::HashMap;
use std::sync::Arc;

/// One scalar tree per dataset
///
/// Used when the same filter contours several datasets (such as the blocks of a composite dataset), so
/// that each dataset keeps its own tree across executions. Datasets are identified by the address of
/// their shared allocation; every tree holds a reference to its dataset, so the address cannot be
/// reused while the entry exists. The map owns the trees it holds.
#[derive(Debug, Default)]
pub struct ScalarTreeMap {
    trees: HashMap<usize, Box<dyn ScalarTree>>,
}

fn key(data_set: &Arc<dyn DataSet>) -> usize {
    Arc::as_ptr(data_set) as *const () as usize
}

impl ScalarTreeMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// The tree of a dataset, created with `create` and attached to the dataset if there is none yet
    pub fn get_or_insert_with<F>(
        &mut self,
        data_set: &Arc<dyn DataSet>,
        create: F,
    ) -> &mut Box<dyn ScalarTree>
    where
        F: FnOnce() -> Box<dyn ScalarTree>,
    {
        self.trees.entry(key(data_set)).or_insert_with(|| {
            let mut tree = create();
            tree.set_data_set(data_set.clone());
            tree
        })
    }

    /// The tree of a dataset
    pub fn get(&self, data_set: &Arc<dyn DataSet>) -> Option<&dyn ScalarTree> {
        self.trees.get(&key(data_set)).map(|t| &**t)
    }

    /// Remove the tree of a dataset
    pub fn remove(&mut self, data_set: &Arc<dyn DataSet>) -> Option<Box<dyn ScalarTree>> {
        self.trees.remove(&key(data_set))
    }

    /// Remove all trees
    pub fn clear(&mut self) {
        self.trees.clear();
    }

    /// The number of trees
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Is the map empty?
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
