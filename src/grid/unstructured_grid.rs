//! Unstructured grid

use crate::grid::{CellArray, CellType, Coordinate, DataArray, PointData, Points};
use crate::timestamp::TimeStamp;
use crate::traits::DataSet;
use crate::types::{Error, Result};
use log::warn;
use std::collections::{BTreeSet, HashMap};

/// A grid of cells of arbitrary types
#[derive(Debug, Clone)]
pub struct UnstructuredGrid {
    points: Points,
    cells: CellArray,
    types: Vec<CellType>,
    point_data: PointData,
    mtime: TimeStamp,
}

impl UnstructuredGrid {
    /// Create a grid
    ///
    /// Fails if the number of cell types differs from the number of cells, if a cell references a
    /// missing point, or if a cell has the wrong number of points for its type.
    pub fn new(points: Points, cells: CellArray, types: Vec<CellType>) -> Result<Self> {
        if types.len() != cells.number_of_cells() {
            return Err(Error::InvalidCell {
                cell: usize::min(types.len(), cells.number_of_cells()),
                reason: format!(
                    "{} cell types given for {} cells",
                    types.len(),
                    cells.number_of_cells()
                ),
            });
        }
        let npts = points.number_of_points();
        for (cell, (ids, cell_type)) in cells.iter().zip(&types).enumerate() {
            if let Some(n) = cell_type.number_of_points() {
                if n != ids.len() {
                    return Err(Error::InvalidCell {
                        cell,
                        reason: format!(
                            "a {cell_type:?} needs {n} points but {} were given",
                            ids.len()
                        ),
                    });
                }
            }
            if let Some(id) = ids.iter().find(|id| **id >= npts) {
                return Err(Error::InvalidCell {
                    cell,
                    reason: format!("point {id} does not exist"),
                });
            }
        }
        Ok(Self {
            points,
            cells,
            types,
            point_data: PointData::new(),
            mtime: TimeStamp::new(),
        })
    }

    /// The cell types
    pub fn cell_types(&self) -> &[CellType] {
        &self.types
    }

    /// Mutable access to the point data
    pub fn point_data_mut(&mut self) -> &mut PointData {
        &mut self.point_data
    }

    /// Replace the point coordinates. The number of points must not change.
    pub fn set_points(&mut self, points: Points) -> Result<()> {
        if points.number_of_points() != self.points.number_of_points() {
            return Err(Error::InvalidCell {
                cell: 0,
                reason: format!(
                    "grid has {} points but {} were given",
                    self.points.number_of_points(),
                    points.number_of_points()
                ),
            });
        }
        self.points = points;
        self.modified();
        Ok(())
    }

    /// Mark the geometry or topology as modified
    pub fn modified(&self) {
        self.mtime.modified();
    }
}

impl DataSet for UnstructuredGrid {
    fn number_of_points(&self) -> usize {
        self.points.number_of_points()
    }
    fn number_of_cells(&self) -> usize {
        self.types.len()
    }
    fn cell_type(&self, cell: usize) -> CellType {
        self.types[cell]
    }
    fn cell_points(&self, cell: usize, ids: &mut Vec<usize>) {
        ids.clear();
        ids.extend_from_slice(self.cells.cell(cell));
    }
    fn cells(&self) -> Option<&CellArray> {
        Some(&self.cells)
    }
    fn points(&self) -> &Points {
        &self.points
    }
    fn point_data(&self) -> &PointData {
        &self.point_data
    }
    fn mtime(&self) -> u64 {
        self.mtime.get()
    }
    fn distinct_cell_types(&self) -> BTreeSet<CellType> {
        self.types.iter().copied().collect()
    }
}

/// A builder for unstructured grids
///
/// Points and cells are added with user chosen ids; points are stored in the order they are added and
/// cell connectivity is translated from point ids to point indices when the grid is created.
pub struct UnstructuredGridBuilder<T: Coordinate> {
    points: Vec<T>,
    point_indices_to_ids: Vec<usize>,
    point_ids_to_indices: HashMap<usize, usize>,
    cells: Vec<(CellType, Vec<usize>)>,
    cell_ids: Vec<usize>,
    point_arrays: Vec<(DataArray, bool)>,
}

impl<T: Coordinate> UnstructuredGridBuilder<T> {
    /// Create a new grid builder
    pub fn new() -> Self {
        Self::new_with_capacity(0, 0)
    }

    /// Create a new grid builder with capacity for a given number of points and cells
    pub fn new_with_capacity(npoints: usize, ncells: usize) -> Self {
        Self {
            points: Vec::with_capacity(3 * npoints),
            point_indices_to_ids: Vec::with_capacity(npoints),
            point_ids_to_indices: HashMap::with_capacity(npoints),
            cells: Vec::with_capacity(ncells),
            cell_ids: Vec::with_capacity(ncells),
            point_arrays: vec![],
        }
    }

    /// Add a point to the grid
    pub fn add_point(&mut self, id: usize, data: [T; 3]) {
        if self.point_ids_to_indices.contains_key(&id) {
            warn!("Point with id {id} added twice; keeping the first");
            return;
        }
        self.point_ids_to_indices
            .insert(id, self.point_indices_to_ids.len());
        self.point_indices_to_ids.push(id);
        self.points.extend_from_slice(&data);
    }

    /// Add a cell to the grid
    pub fn add_cell(&mut self, id: usize, cell_data: (CellType, Vec<usize>)) {
        self.cell_ids.push(id);
        self.cells.push(cell_data);
    }

    /// Attach an array to the points, with one tuple per point in the order the points were added
    pub fn add_point_array(&mut self, array: DataArray) {
        self.point_arrays.push((array, false));
    }

    /// Attach an array to the points and make it the active scalars
    pub fn add_point_scalars(&mut self, array: DataArray) {
        self.point_arrays.push((array, true));
    }

    /// The ids of the cells, in the order they were added
    pub fn cell_ids(&self) -> &[usize] {
        &self.cell_ids
    }

    /// Create the grid
    pub fn create_grid(self) -> Result<UnstructuredGrid> {
        let npts = self.point_indices_to_ids.len();
        let nconn = self.cells.iter().map(|(_, v)| v.len()).sum::<usize>();
        let mut offsets = Vec::with_capacity(self.cells.len() + 1);
        let mut connectivity = Vec::with_capacity(nconn);
        let mut types = Vec::with_capacity(self.cells.len());
        offsets.push(0);
        for (cell, (cell_type, ids)) in self.cells.into_iter().enumerate() {
            for id in ids {
                let index =
                    self.point_ids_to_indices
                        .get(&id)
                        .ok_or_else(|| Error::InvalidCell {
                            cell: self.cell_ids[cell],
                            reason: format!("point {id} does not exist"),
                        })?;
                connectivity.push(*index);
            }
            offsets.push(connectivity.len());
            types.push(cell_type);
        }
        let cells = CellArray::from_raw(offsets, connectivity).ok_or(Error::NoCells)?;
        let mut grid = UnstructuredGrid::new(T::wrap(self.points), cells, types)?;
        for (array, active) in self.point_arrays {
            if array.number_of_tuples() != npts {
                warn!(
                    "Point array {} has {} tuples for {} points; skipped",
                    array.name(),
                    array.number_of_tuples(),
                    npts
                );
                continue;
            }
            if active {
                grid.point_data.set_scalars(array);
            } else {
                grid.point_data.add_array(array);
            }
        }
        Ok(grid)
    }
}

impl<T: Coordinate> Default for UnstructuredGridBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn two_tets() -> UnstructuredGridBuilder<f64> {
        let mut b = UnstructuredGridBuilder::<f64>::new();
        b.add_point(10, [0.0, 0.0, 0.0]);
        b.add_point(11, [1.0, 0.0, 0.0]);
        b.add_point(12, [0.0, 1.0, 0.0]);
        b.add_point(13, [0.0, 0.0, 1.0]);
        b.add_point(14, [1.0, 1.0, 1.0]);
        b.add_cell(0, (CellType::Tetra, vec![10, 11, 12, 13]));
        b.add_cell(1, (CellType::Tetra, vec![11, 12, 13, 14]));
        b
    }

    #[test]
    fn test_builder() {
        let mut b = two_tets();
        b.add_point_scalars(DataArray::from_scalars("s", vec![0.0f64, 1.0, 2.0, 3.0, 4.0]));
        let grid = b.create_grid().unwrap();
        assert_eq!(grid.number_of_points(), 5);
        assert_eq!(grid.number_of_cells(), 2);
        let mut ids = vec![];
        grid.cell_points(1, &mut ids);
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(grid.point_data().scalars().map(|s| s.name()), Some("s"));
        assert_eq!(grid.points().point(4), [1.0, 1.0, 1.0]);
        assert_eq!(
            grid.distinct_cell_types().into_iter().collect::<Vec<_>>(),
            vec![CellType::Tetra]
        );
    }

    #[test]
    fn test_missing_point() {
        let mut b = two_tets();
        b.add_cell(2, (CellType::Triangle, vec![10, 11, 99]));
        assert!(matches!(
            b.create_grid(),
            Err(Error::InvalidCell { cell: 2, .. })
        ));
    }

    #[test]
    fn test_wrong_size() {
        let mut b = two_tets();
        b.add_cell(2, (CellType::Hexahedron, vec![10, 11, 12]));
        assert!(b.create_grid().is_err());
    }

    #[test]
    fn test_modified() {
        let grid = two_tets().create_grid().unwrap();
        let t = grid.mtime();
        grid.modified();
        assert!(grid.mtime() > t);
    }
}
