//! Per-cell iso-surface extraction shared by the fast and merging paths

use crate::element::case_table::case_table;
use crate::grid::{ArrayValue, CellArray, CellType, Coordinate};
use crate::traits::{DataSet, ScalarTree};
use std::ops::Range;

/// Cells processed per work item when no scalar tree is used
const CELL_GRAIN: usize = 1024;

/// The cells to visit for one iso-value
#[derive(Clone, Copy)]
pub(crate) enum CellSource<'a> {
    /// Every cell of the dataset
    All(usize),
    /// The batches gathered by a scalar tree
    Batches(&'a dyn ScalarTree, usize),
}

impl<'a> CellSource<'a> {
    /// The number of work items
    pub fn len(&self) -> usize {
        match self {
            CellSource::All(n) => *n,
            CellSource::Batches(_, n) => *n,
        }
    }

    /// The number of work items handed to a worker at a time
    pub fn grain(&self) -> usize {
        match self {
            CellSource::All(_) => CELL_GRAIN,
            CellSource::Batches(_, _) => 1,
        }
    }

    /// Call `f` on every cell of a range of work items
    pub fn for_each_cell(&self, items: Range<usize>, mut f: impl FnMut(usize)) {
        match self {
            CellSource::All(_) => items.for_each(f),
            CellSource::Batches(tree, _) => {
                for b in items {
                    for cell in tree.cell_batch(b) {
                        f(*cell);
                    }
                }
            }
        }
    }
}

/// A worker's view of the cells of a dataset
pub(crate) struct CellCursor<'a> {
    data_set: &'a dyn DataSet,
    cells: Option<&'a CellArray>,
    scratch: Vec<usize>,
}

impl<'a> CellCursor<'a> {
    pub fn new(data_set: &'a dyn DataSet) -> Self {
        Self {
            data_set,
            cells: data_set.cells(),
            scratch: Vec::with_capacity(8),
        }
    }

    /// The type and point ids of a cell
    pub fn cell(&mut self, cell: usize) -> (CellType, &[usize]) {
        let cell_type = self.data_set.cell_type(cell);
        match self.cells {
            Some(cells) => (cell_type, cells.cell(cell)),
            None => {
                self.data_set.cell_points(cell, &mut self.scratch);
                (cell_type, &self.scratch)
            }
        }
    }
}

/// The parameter along the edge from a point with scalar `s0` to a point with scalar `s1` where the
/// scalar equals `value`. Edges with equal scalars give 0.
#[inline]
pub fn edge_parameter(s0: f64, s1: f64, value: f64) -> f64 {
    let delta = s1 - s0;
    if delta == 0.0 {
        0.0
    } else {
        (value - s0) / delta
    }
}

/// Interpolate between points `p0` and `p1` of a flat coordinate array
#[inline]
pub fn interpolate<P: Coordinate>(points: &[P], p0: usize, p1: usize, t: f64) -> [f64; 3] {
    let x0 = &points[3 * p0..3 * p0 + 3];
    let x1 = &points[3 * p1..3 * p1 + 3];
    let mut x = [0.0; 3];
    for i in 0..3 {
        let a = x0[i].as_f64();
        x[i] = a + t * (x1[i].as_f64() - a);
    }
    x
}

/// Visit the triangles of the iso-surface inside a linear 3D cell
///
/// `emit(v0, v1, t)` is called three times per triangle, once for each corner, with the point ids of
/// the crossed edge and the parameter of the crossing along it. Cells of other types are skipped.
#[inline]
pub(crate) fn contour_cell<S: ArrayValue>(
    cell_type: CellType,
    ids: &[usize],
    scalars: &[S],
    value: f64,
    mut emit: impl FnMut(usize, usize, f64),
) {
    let Some(table) = case_table(cell_type) else {
        return;
    };
    if Some(ids.len()) != cell_type.number_of_points() {
        return;
    }
    let mask = ids
        .iter()
        .enumerate()
        .filter(|(_, id)| scalars[**id].as_f64() >= value)
        .fold(0, |m, (i, _)| m | (1 << i));
    let edges = table.edges();
    for triangle in &table.case(mask).triangles {
        for e in triangle {
            let [a, b] = edges[*e];
            let (v0, v1) = (ids[a], ids[b]);
            emit(
                v0,
                v1,
                edge_parameter(scalars[v0].as_f64(), scalars[v1].as_f64(), value),
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_edge_parameter() {
        assert_relative_eq!(edge_parameter(0.0, 1.0, 0.25), 0.25);
        assert_relative_eq!(edge_parameter(2.0, -2.0, 1.0), 0.25);
        assert_eq!(edge_parameter(3.0, 3.0, 3.0), 0.0);
    }

    #[test]
    fn test_degenerate_edge_gives_first_point() {
        let points = [0.1f32, 0.2, 0.3, 5.0, 6.0, 7.0];
        let t = edge_parameter(0.5, 0.5, 0.5);
        let x = interpolate(&points, 0, 1, t);
        assert_eq!(x, [0.1f32 as f64, 0.2f32 as f64, 0.3f32 as f64]);
        assert!(x.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_tetra() {
        let scalars = [0.0f64, 0.0, 0.0, 1.0];
        let mut corners = vec![];
        contour_cell(CellType::Tetra, &[0, 1, 2, 3], &scalars, 0.5, |v0, v1, t| {
            corners.push((v0, v1, t))
        });
        assert_eq!(corners.len(), 3);
        for (v0, v1, t) in corners {
            assert_eq!(v1, 3);
            assert!(v0 < 3);
            assert_relative_eq!(t, 0.5);
        }
    }

    #[test]
    fn test_skips_other_cells() {
        let scalars = [0.0f64, 1.0, 0.0];
        let mut count = 0;
        contour_cell(CellType::Triangle, &[0, 1, 2], &scalars, 0.5, |_, _, _| {
            count += 1
        });
        contour_cell(CellType::Tetra, &[0, 1, 2], &scalars, 0.5, |_, _, _| count += 1);
        assert_eq!(count, 0);
    }
}
