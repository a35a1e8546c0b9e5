//! Simple scalar tree

use crate::scalar_tree::{batch, cell_ranges, fill_cell, number_of_batches, TreeInput};
use crate::traits::ScalarTree;
use crate::types::Result;
use log::{debug, error};
use rayon::prelude::*;
use std::ops::Range;

/// A scalar tree over contiguous runs of cells
///
/// The leaves of the tree cover consecutive runs of `branching_factor` cells, and each node stores the
/// scalar range of the cells below it. The tree is stored in a flat array with the children of node
/// `k` at `k * b + 1 ..= k * b + b`. Building needs a single pass over the cells, but as cells are
/// grouped by id rather than by scalar value the tree prunes less than [SpanSpace](super::SpanSpace).
#[derive(Debug, Clone)]
pub struct SimpleScalarTree {
    input: TreeInput,
    branching_factor: usize,
    max_level: usize,
    batch_size: usize,

    level: usize,
    leaf_offset: usize,
    cells_per_leaf: usize,
    number_of_cells: usize,
    tree: Vec<[f64; 2]>,

    value: f64,
    stack: Vec<usize>,
    current: Range<usize>,
    candidates: Vec<usize>,
    number_of_batches: usize,
}

impl Default for SimpleScalarTree {
    fn default() -> Self {
        Self {
            input: TreeInput::default(),
            branching_factor: 3,
            max_level: 20,
            batch_size: 100,
            level: 0,
            leaf_offset: 0,
            cells_per_leaf: 0,
            number_of_cells: 0,
            tree: vec![],
            value: 0.0,
            stack: vec![],
            current: 0..0,
            candidates: vec![],
            number_of_batches: 0,
        }
    }
}

impl SimpleScalarTree {
    /// Create a tree with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of children of each node (at least 2)
    pub fn set_branching_factor(&mut self, branching_factor: usize) {
        self.branching_factor = branching_factor.max(2);
        self.input.reset_build();
    }

    /// Get the number of children of each node
    pub fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    /// Set the maximum depth of the tree
    pub fn set_max_level(&mut self, max_level: usize) {
        self.max_level = max_level;
        self.input.reset_build();
    }

    /// Get the maximum depth of the tree
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Set the number of cells per batch (at least 100)
    pub fn set_batch_size(&mut self, batch_size: usize) {
        self.batch_size = batch_size.max(100);
    }

    /// Get the number of cells per batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The depth of the tree built by the last build
    pub fn level(&self) -> usize {
        self.level
    }

    /// The number of cells covered by each leaf in the last build
    pub fn cells_per_leaf(&self) -> usize {
        self.cells_per_leaf
    }

    fn build(&mut self) -> Result<()> {
        let (ds, scalars) = self.input.validate()?;
        let ncells = ds.number_of_cells();
        let b = self.branching_factor;

        let leaves_needed = (ncells - 1) / b + 1;
        let mut level = 0;
        let mut capacity = 1;
        while capacity < leaves_needed && level < self.max_level {
            capacity *= b;
            level += 1;
        }
        let cells_per_leaf = if capacity >= leaves_needed {
            b
        } else {
            (ncells - 1) / capacity + 1
        };
        let number_of_leaves = (ncells - 1) / cells_per_leaf + 1;
        let leaf_offset = (capacity - 1) / (b - 1);

        let ranges = cell_ranges(&*ds, scalars);
        let mut tree = vec![[f64::INFINITY, f64::NEG_INFINITY]; leaf_offset + number_of_leaves];
        tree[leaf_offset..]
            .par_iter_mut()
            .enumerate()
            .for_each(|(leaf, node)| {
                let start = leaf * cells_per_leaf;
                let end = usize::min(start + cells_per_leaf, ncells);
                *node = union(&ranges[start..end]);
            });
        for node in (0..leaf_offset).rev() {
            let children = node * b + 1..usize::min(node * b + b + 1, tree.len());
            if !children.is_empty() {
                tree[node] = union(&tree[children]);
            }
        }
        debug!(
            "Built simple scalar tree over {ncells} cells: {level} levels, {number_of_leaves} leaves of {cells_per_leaf} cells"
        );

        self.level = level;
        self.leaf_offset = leaf_offset;
        self.cells_per_leaf = cells_per_leaf;
        self.number_of_cells = ncells;
        self.tree = tree;
        Ok(())
    }

    fn contains(&self, node: usize) -> bool {
        let [lo, hi] = self.tree[node];
        lo <= self.value && self.value <= hi
    }

    /// The cells of the next leaf of the traversal whose range contains the value
    fn next_leaf(&mut self) -> Option<Range<usize>> {
        let b = self.branching_factor;
        while let Some(node) = self.stack.pop() {
            if !self.contains(node) {
                continue;
            }
            if node >= self.leaf_offset {
                let start = (node - self.leaf_offset) * self.cells_per_leaf;
                return Some(start..usize::min(start + self.cells_per_leaf, self.number_of_cells));
            }
            for child in (node * b + 1..node * b + b + 1).rev() {
                if child < self.tree.len() {
                    self.stack.push(child);
                }
            }
        }
        None
    }

    fn start_query(&mut self, value: f64) -> bool {
        self.stack.clear();
        self.current = 0..0;
        self.candidates.clear();
        self.number_of_batches = 0;
        if let Err(e) = self.build_tree() {
            error!("{e}");
            return false;
        }
        self.value = value;
        if !self.tree.is_empty() {
            self.stack.push(0);
        }
        true
    }
}

fn union(ranges: &[[f64; 2]]) -> [f64; 2] {
    ranges
        .iter()
        .fold([f64::INFINITY, f64::NEG_INFINITY], |[lo, hi], [a, b]| {
            [lo.min(*a), hi.max(*b)]
        })
}

impl ScalarTree for SimpleScalarTree {
    fn input(&self) -> &TreeInput {
        &self.input
    }

    fn input_mut(&mut self) -> &mut TreeInput {
        &mut self.input
    }

    fn build_tree(&mut self) -> Result<()> {
        if !self.input.needs_rebuild() {
            return Ok(());
        }
        self.initialize();
        self.build()?;
        self.input.mark_built();
        Ok(())
    }

    fn initialize(&mut self) {
        self.level = 0;
        self.leaf_offset = 0;
        self.cells_per_leaf = 0;
        self.number_of_cells = 0;
        self.tree = vec![];
        self.stack.clear();
        self.current = 0..0;
        self.candidates.clear();
        self.number_of_batches = 0;
        self.input.reset_build();
    }

    fn init_traversal(&mut self, value: f64) {
        self.start_query(value);
    }

    fn next_cell(
        &mut self,
        point_ids: &mut Vec<usize>,
        cell_scalars: &mut Vec<f64>,
    ) -> Option<usize> {
        loop {
            if let Some(cell) = self.current.next() {
                let ds = self.input.data_set()?;
                let scalars = self.input.scalars()?;
                fill_cell(&**ds, scalars, cell, point_ids, cell_scalars);
                return Some(cell);
            }
            self.current = self.next_leaf()?;
        }
    }

    fn number_of_cell_batches(&mut self, value: f64) -> usize {
        if !self.start_query(value) {
            return 0;
        }
        let mut candidates = std::mem::take(&mut self.candidates);
        while let Some(cells) = self.next_leaf() {
            candidates.extend(cells);
        }
        self.candidates = candidates;
        self.number_of_batches = number_of_batches(self.candidates.len(), self.batch_size);
        self.number_of_batches
    }

    fn cell_batch(&self, index: usize) -> &[usize] {
        if index >= self.number_of_batches {
            return &[];
        }
        batch(&self.candidates, self.batch_size, index)
    }

    fn new_instance(&self) -> Box<dyn ScalarTree> {
        Box::new(Self {
            branching_factor: self.branching_factor,
            max_level: self.max_level,
            batch_size: self.batch_size,
            ..Self::default()
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::{CellType, DataArray, UnstructuredGrid, UnstructuredGridBuilder};
    use std::sync::Arc;

    fn line_grid(scalars: Vec<f64>) -> Arc<UnstructuredGrid> {
        let mut b = UnstructuredGridBuilder::<f64>::new();
        for i in 0..scalars.len() {
            b.add_point(i, [i as f64, 0.0, 0.0]);
        }
        for i in 0..scalars.len() - 1 {
            b.add_cell(i, (CellType::Line, vec![i, i + 1]));
        }
        b.add_point_scalars(DataArray::from_scalars("s", scalars));
        Arc::new(b.create_grid().unwrap())
    }

    #[test]
    fn test_defaults() {
        let mut tree = SimpleScalarTree::new();
        assert_eq!(tree.branching_factor(), 3);
        assert_eq!(tree.max_level(), 20);
        tree.set_branching_factor(1);
        assert_eq!(tree.branching_factor(), 2);
    }

    #[test]
    fn test_structure() {
        // 100 cells in leaves of 3: 34 leaves, so 4 levels (81 leaf slots)
        let mut tree = SimpleScalarTree::new();
        tree.set_data_set(line_grid((0..101).map(|i| i as f64).collect()));
        tree.build_tree().unwrap();
        assert_eq!(tree.level(), 4);
        assert_eq!(tree.cells_per_leaf(), 3);
        assert_eq!(tree.leaf_offset, 1 + 3 + 9 + 27);
        assert_eq!(tree.tree.len(), 40 + 34);
        assert_eq!(tree.tree[0], [0.0, 100.0]);
        assert_eq!(tree.tree[40], [0.0, 3.0]);
        assert_eq!(tree.tree[40 + 33], [99.0, 100.0]);
    }

    #[test]
    fn test_max_level() {
        let mut tree = SimpleScalarTree::new();
        tree.set_branching_factor(2);
        tree.set_max_level(1);
        tree.set_data_set(line_grid((0..101).map(|i| i as f64).collect()));
        tree.build_tree().unwrap();
        assert_eq!(tree.level(), 1);
        assert_eq!(tree.cells_per_leaf(), 50);

        tree.init_traversal(75.5);
        let (mut ids, mut scalars) = (vec![], vec![]);
        let mut found = vec![];
        while let Some(cell) = tree.next_cell(&mut ids, &mut scalars) {
            found.push(cell);
        }
        assert_eq!(found, (50..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_traversal_and_batches() {
        let scalars = (0..1001).map(|i| ((i as f64) * 0.37).sin()).collect::<Vec<_>>();
        let mut tree = SimpleScalarTree::new();
        tree.set_data_set(line_grid(scalars.clone()));
        for value in [-0.99, -0.3, 0.0, 0.5, 0.999] {
            tree.init_traversal(value);
            let (mut ids, mut cell_scalars) = (vec![], vec![]);
            let mut serial = vec![];
            while let Some(cell) = tree.next_cell(&mut ids, &mut cell_scalars) {
                serial.push(cell);
            }
            for cell in 0..1000 {
                let lo = scalars[cell].min(scalars[cell + 1]);
                let hi = scalars[cell].max(scalars[cell + 1]);
                if lo <= value && value <= hi {
                    assert!(serial.contains(&cell));
                }
            }
            let n = tree.number_of_cell_batches(value);
            let batched = (0..n).flat_map(|b| tree.cell_batch(b).to_vec()).collect::<Vec<_>>();
            assert_eq!(serial, batched);
        }
        assert_eq!(tree.number_of_cell_batches(2.0), 0);
    }
}
