//! Scalar trees

use crate::grid::DataArray;
use crate::scalar_tree::TreeInput;
use crate::traits::DataSet;
use crate::types::Result;
use std::fmt::Debug;
use std::sync::Arc;

pub trait ScalarTree: Debug + Send + Sync {
    //! An index of the cells of a dataset by the range of their scalars
    //!
    //! Given an iso-value, a scalar tree returns candidate cells that may contain the iso-surface.
    //! Every cell whose scalar range contains the value is a candidate; other cells may be too.
    //!
    //! Candidates can be visited one at a time with [ScalarTree::init_traversal] and
    //! [ScalarTree::next_cell], or in batches for parallel processing with
    //! [ScalarTree::number_of_cell_batches] and [ScalarTree::cell_batch]. A tree holds the state of one
    //! query at a time.

    /// The dataset and scalars the tree is built over
    fn input(&self) -> &TreeInput;

    /// Mutable access to the dataset and scalars the tree is built over
    fn input_mut(&mut self) -> &mut TreeInput;

    /// Build the tree if the dataset or scalars have been modified since the last build
    fn build_tree(&mut self) -> Result<()>;

    /// Release the tree structure; the next query rebuilds it
    fn initialize(&mut self);

    /// Start a serial traversal of the candidates for `value`
    fn init_traversal(&mut self, value: f64);

    /// The next candidate cell of the traversal
    ///
    /// The ids of the cell's points and their scalar values are written into `point_ids` and
    /// `cell_scalars`. Returns `None` once all candidates have been visited.
    fn next_cell(&mut self, point_ids: &mut Vec<usize>, cell_scalars: &mut Vec<f64>)
        -> Option<usize>;

    /// Gather the candidates for `value` into batches, returning the number of batches
    fn number_of_cell_batches(&mut self, value: f64) -> usize;

    /// The cells of a batch gathered by the last call to [ScalarTree::number_of_cell_batches]
    fn cell_batch(&self, batch: usize) -> &[usize];

    /// A new, empty tree with the same settings
    fn new_instance(&self) -> Box<dyn ScalarTree>;

    /// Set the dataset
    fn set_data_set(&mut self, data_set: Arc<dyn DataSet>) {
        if self.input_mut().set_data_set(data_set) {
            self.initialize();
        }
    }

    /// Set the scalars explicitly, instead of taking them from the dataset's point data
    fn set_scalars(&mut self, scalars: Arc<DataArray>) {
        if self.input_mut().set_scalars(scalars) {
            self.initialize();
        }
    }

    /// Take the named point data array as scalars (the active scalars if `None`)
    fn set_scalars_name(&mut self, name: Option<&str>) {
        if self.input_mut().set_scalars_name(name) {
            self.initialize();
        }
    }

    /// The time of the last build (0 if the tree has not been built)
    fn build_time(&self) -> u64 {
        self.input().build_time()
    }
}
