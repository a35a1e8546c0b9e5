//! Datasets that can be contoured

use crate::grid::{CellArray, CellType, PointData, Points};
use std::collections::BTreeSet;
use std::fmt::Debug;

pub trait DataSet: Debug + Send + Sync {
    //! A set of cells defined over points, with data attached to the points

    /// The number of points
    fn number_of_points(&self) -> usize;

    /// The number of cells
    fn number_of_cells(&self) -> usize;

    /// The type of a cell
    fn cell_type(&self, cell: usize) -> CellType;

    /// Write the point ids of a cell into `ids`, replacing its contents
    fn cell_points(&self, cell: usize, ids: &mut Vec<usize>);

    /// Direct access to the cell connectivity, if the dataset stores it as a [CellArray]
    ///
    /// Algorithms use this to skip the copy made by [DataSet::cell_points].
    fn cells(&self) -> Option<&CellArray> {
        None
    }

    /// The point coordinates
    fn points(&self) -> &Points;

    /// The arrays attached to the points
    fn point_data(&self) -> &PointData;

    /// The last modification time of the geometry and topology
    fn mtime(&self) -> u64;

    /// The distinct cell types used by the dataset
    fn distinct_cell_types(&self) -> BTreeSet<CellType> {
        (0..self.number_of_cells())
            .map(|c| self.cell_type(c))
            .collect()
    }
}
