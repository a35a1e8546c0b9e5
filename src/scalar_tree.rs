//! Scalar trees
//!
//! Scalar trees index the cells of a dataset by the range of their point scalars so that contouring
//! only visits cells that can contain the iso-surface.

mod simple_scalar_tree;
mod span_space;
mod tree_map;

pub use simple_scalar_tree::SimpleScalarTree;
pub use span_space::{SpanRectangle, SpanSpace};
pub use tree_map::ScalarTreeMap;

use crate::grid::{with_array_data, ArrayData, ArrayValue, DataArray};
use crate::timestamp::TimeStamp;
use crate::traits::DataSet;
use crate::types::{Error, Result};
use rayon::prelude::*;
use std::sync::Arc;

/// The dataset and scalars a scalar tree is built over, with the time of the last build
#[derive(Debug, Clone, Default)]
pub struct TreeInput {
    data_set: Option<Arc<dyn DataSet>>,
    scalars: Option<Arc<DataArray>>,
    scalars_name: Option<String>,
    mtime: TimeStamp,
    build_time: TimeStamp,
}

impl TreeInput {
    /// The dataset
    pub fn data_set(&self) -> Option<&Arc<dyn DataSet>> {
        self.data_set.as_ref()
    }

    /// Set the dataset. Returns true if it changed.
    pub fn set_data_set(&mut self, data_set: Arc<dyn DataSet>) -> bool {
        if let Some(current) = &self.data_set {
            if Arc::ptr_eq(current, &data_set) {
                return false;
            }
        }
        self.data_set = Some(data_set);
        self.mtime.modified();
        true
    }

    /// Set explicit scalars. Returns true if they changed.
    pub fn set_scalars(&mut self, scalars: Arc<DataArray>) -> bool {
        if let Some(current) = &self.scalars {
            if Arc::ptr_eq(current, &scalars) {
                return false;
            }
        }
        self.scalars = Some(scalars);
        self.mtime.modified();
        true
    }

    /// Take the scalars from the named point data array. Returns true if the name changed.
    pub fn set_scalars_name(&mut self, name: Option<&str>) -> bool {
        if self.scalars_name.as_deref() == name {
            return false;
        }
        self.scalars_name = name.map(str::to_string);
        self.mtime.modified();
        true
    }

    /// The scalars: the explicit scalars if set, otherwise the named or active point scalars of the
    /// dataset
    pub fn scalars(&self) -> Option<&DataArray> {
        if let Some(s) = &self.scalars {
            return Some(s);
        }
        let point_data = self.data_set.as_ref()?.point_data();
        match &self.scalars_name {
            Some(name) => point_data.array(name),
            None => point_data.scalars(),
        }
    }

    /// The time of the last build (0 if never built)
    pub fn build_time(&self) -> u64 {
        self.build_time.get()
    }

    /// Has the input changed since the last build?
    pub fn needs_rebuild(&self) -> bool {
        let built = self.build_time.get();
        if built == 0 {
            return true;
        }
        let ds_time = self.data_set.as_ref().map_or(0, |d| d.mtime());
        let scalars_time = self.scalars().map_or(0, |s| s.mtime());
        built < self.mtime.get() || built < ds_time || built < scalars_time
    }

    /// Record a successful build
    pub(crate) fn mark_built(&self) {
        self.build_time.modified();
    }

    /// Forget the last build
    pub(crate) fn reset_build(&self) {
        self.build_time.reset();
    }

    /// Check the input and return the dataset and scalars to build from
    pub(crate) fn validate(&self) -> Result<(Arc<dyn DataSet>, &DataArray)> {
        let ds = self.data_set.clone().ok_or(Error::NoDataSet)?;
        if ds.number_of_cells() == 0 {
            return Err(Error::NoCells);
        }
        let scalars = self.scalars().ok_or(Error::NoScalars)?;
        if scalars.number_of_tuples() < ds.number_of_points() {
            return Err(Error::ScalarCount {
                expected: ds.number_of_points(),
                found: scalars.number_of_tuples(),
            });
        }
        Ok((ds, scalars))
    }
}

/// The (min, max) scalar range of every cell
///
/// Uses the first component of the scalars. Cells without points get an empty range (`min > max`).
pub(crate) fn cell_ranges(ds: &dyn DataSet, scalars: &DataArray) -> Vec<[f64; 2]> {
    fn ranges<T: ArrayValue>(ds: &dyn DataSet, s: &[T], ncomp: usize) -> Vec<[f64; 2]> {
        let range = |ids: &[usize]| {
            ids.iter()
                .fold([f64::INFINITY, f64::NEG_INFINITY], |[lo, hi], id| {
                    let x = s[id * ncomp].as_f64();
                    [lo.min(x), hi.max(x)]
                })
        };
        let ncells = ds.number_of_cells();
        match ds.cells() {
            Some(cells) => (0..ncells)
                .into_par_iter()
                .map(|c| range(cells.cell(c)))
                .collect(),
            None => (0..ncells)
                .into_par_iter()
                .map_init(Vec::new, |ids, c| {
                    ds.cell_points(c, ids);
                    range(ids.as_slice())
                })
                .collect(),
        }
    }
    let ncomp = scalars.components();
    with_array_data!(scalars.data(), v => ranges(ds, v, ncomp))
}

/// Fetch the point ids and point scalars of a cell
pub(crate) fn fill_cell(
    ds: &dyn DataSet,
    scalars: &DataArray,
    cell: usize,
    point_ids: &mut Vec<usize>,
    cell_scalars: &mut Vec<f64>,
) {
    ds.cell_points(cell, point_ids);
    cell_scalars.clear();
    cell_scalars.extend(point_ids.iter().map(|id| scalars.component(*id, 0)));
}

/// Split `candidates` into batches of `batch_size` cells
pub(crate) fn number_of_batches(candidates: usize, batch_size: usize) -> usize {
    if candidates == 0 {
        0
    } else {
        (candidates - 1) / batch_size + 1
    }
}

/// The cells of one batch
pub(crate) fn batch(candidates: &[usize], batch_size: usize, index: usize) -> &[usize] {
    let start = usize::min(index * batch_size, candidates.len());
    let end = usize::min(start + batch_size, candidates.len());
    &candidates[start..end]
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::{CellType, UnstructuredGridBuilder};

    #[test]
    fn test_batches() {
        assert_eq!(number_of_batches(0, 100), 0);
        assert_eq!(number_of_batches(1, 100), 1);
        assert_eq!(number_of_batches(100, 100), 1);
        assert_eq!(number_of_batches(101, 100), 2);
        let cells = (0..250).collect::<Vec<_>>();
        assert_eq!(batch(&cells, 100, 2).len(), 50);
        assert_eq!(batch(&cells, 100, 1)[0], 100);
        assert!(batch(&cells, 100, 3).is_empty());
    }

    #[test]
    fn test_cell_ranges() {
        let mut b = UnstructuredGridBuilder::<f32>::new();
        for i in 0..4 {
            b.add_point(i, [i as f32, 0.0, 0.0]);
        }
        b.add_cell(0, (CellType::Line, vec![0, 1]));
        b.add_cell(1, (CellType::Triangle, vec![1, 2, 3]));
        b.add_point_scalars(DataArray::from_scalars("s", vec![3i32, -1, 7, 2]));
        let grid = b.create_grid().unwrap();
        let ranges = cell_ranges(&grid, grid.point_data().scalars().unwrap());
        assert_eq!(ranges, vec![[-1.0, 3.0], [-1.0, 7.0]]);
    }

    #[test]
    fn test_needs_rebuild() {
        let mut b = UnstructuredGridBuilder::<f64>::new();
        b.add_point(0, [0.0, 0.0, 0.0]);
        b.add_cell(0, (CellType::Vertex, vec![0]));
        b.add_point_scalars(DataArray::from_scalars("s", vec![1.0f64]));
        let grid = Arc::new(b.create_grid().unwrap());
        let mut input = TreeInput::default();
        assert!(input.set_data_set(grid.clone()));
        assert!(!input.set_data_set(grid.clone()));
        assert!(input.needs_rebuild());
        input.mark_built();
        assert!(!input.needs_rebuild());
        grid.modified();
        assert!(input.needs_rebuild());
        input.mark_built();
        assert!(input.set_scalars_name(Some("s")));
        assert!(input.needs_rebuild());
        assert!(input.scalars().is_some());
    }
}
