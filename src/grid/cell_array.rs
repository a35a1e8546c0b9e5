//! Cell connectivity storage

/// Cells stored as an offsets array and a connectivity array
///
/// The points of cell `i` are `connectivity[offsets[i]..offsets[i + 1]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellArray {
    offsets: Vec<usize>,
    connectivity: Vec<usize>,
}

impl Default for CellArray {
    fn default() -> Self {
        Self::new()
    }
}

impl CellArray {
    /// Create an empty cell array
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            connectivity: vec![],
        }
    }

    /// Create an empty cell array with room for `num_cells` cells of `cell_size` points
    pub fn new_with_capacity(num_cells: usize, cell_size: usize) -> Self {
        let mut offsets = Vec::with_capacity(num_cells + 1);
        offsets.push(0);
        Self {
            offsets,
            connectivity: Vec::with_capacity(num_cells * cell_size),
        }
    }

    /// Create a cell array from its raw parts
    ///
    /// Returns `None` if the offsets are not a non-decreasing sequence starting at 0 and ending at the
    /// length of the connectivity.
    pub fn from_raw(offsets: Vec<usize>, connectivity: Vec<usize>) -> Option<Self> {
        if offsets.first() != Some(&0)
            || offsets.last() != Some(&connectivity.len())
            || offsets.windows(2).any(|w| w[0] > w[1])
        {
            return None;
        }
        Some(Self {
            offsets,
            connectivity,
        })
    }

    /// The number of cells
    pub fn number_of_cells(&self) -> usize {
        self.offsets.len() - 1
    }

    /// The total number of point references
    pub fn connectivity_size(&self) -> usize {
        self.connectivity.len()
    }

    /// Is the array empty?
    pub fn is_empty(&self) -> bool {
        self.number_of_cells() == 0
    }

    /// The points of a cell
    pub fn cell(&self, index: usize) -> &[usize] {
        &self.connectivity[self.offsets[index]..self.offsets[index + 1]]
    }

    /// The number of points of a cell
    pub fn cell_size(&self, index: usize) -> usize {
        self.offsets[index + 1] - self.offsets[index]
    }

    /// Append a cell
    pub fn push_cell(&mut self, points: &[usize]) {
        self.connectivity.extend_from_slice(points);
        self.offsets.push(self.connectivity.len());
    }

    /// Iterate over the cells
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.offsets
            .windows(2)
            .map(move |w| &self.connectivity[w[0]..w[1]])
    }

    /// The offsets array
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// The connectivity array
    pub fn connectivity(&self) -> &[usize] {
        &self.connectivity
    }

    /// Grow to exactly `num_cells` cells and `connectivity_size` point references.
    ///
    /// New entries are zero: the caller must fill them through [CellArray::raw_parts_mut].
    pub(crate) fn resize_exact(&mut self, num_cells: usize, connectivity_size: usize) {
        self.offsets.resize(num_cells + 1, 0);
        self.connectivity.resize(connectivity_size, 0);
    }

    /// Mutable access to the offsets and connectivity
    pub(crate) fn raw_parts_mut(&mut self) -> (&mut [usize], &mut [usize]) {
        (&mut self.offsets, &mut self.connectivity)
    }

    /// Release unused capacity
    pub fn squeeze(&mut self) {
        self.offsets.shrink_to_fit();
        self.connectivity.shrink_to_fit();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_push_and_iterate() {
        let mut cells = CellArray::new();
        assert!(cells.is_empty());
        cells.push_cell(&[0, 1, 2]);
        cells.push_cell(&[2, 3]);
        assert_eq!(cells.number_of_cells(), 2);
        assert_eq!(cells.cell(1), &[2, 3]);
        assert_eq!(cells.cell_size(0), 3);
        assert_eq!(cells.offsets(), &[0, 3, 5]);
        let collected = cells.iter().map(|c| c.to_vec()).collect::<Vec<_>>();
        assert_eq!(collected, vec![vec![0, 1, 2], vec![2, 3]]);
    }

    #[test]
    fn test_from_raw() {
        assert!(CellArray::from_raw(vec![0, 2, 4], vec![0, 1, 1, 2]).is_some());
        assert!(CellArray::from_raw(vec![0, 3, 2], vec![0, 1]).is_none());
        assert!(CellArray::from_raw(vec![1, 2], vec![0, 1]).is_none());
        assert!(CellArray::from_raw(vec![], vec![]).is_none());
    }
}
