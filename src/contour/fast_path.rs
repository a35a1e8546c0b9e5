//! Iso-surface extraction without point merging
//!
//! Every triangle gets its own three points, written directly by the worker that produced them.

use crate::contour::extract::{contour_cell, interpolate, CellCursor, CellSource};
use crate::grid::{ArrayValue, CellArray, Coordinate};
use crate::threads::{
    copy_with_offsets, count_threads, current_thread, fold_ranges, for_each_chunk_mut,
};
use crate::traits::DataSet;

/// The inputs of one extraction
pub(crate) struct Extraction<'a, S, P> {
    pub data_set: &'a dyn DataSet,
    pub scalars: &'a [S],
    pub points: &'a [P],
    pub value: f64,
    pub sequential: bool,
}

struct LocalPoints<'a, P> {
    thread: Option<usize>,
    cursor: CellCursor<'a>,
    points: Vec<P>,
}

/// Generate the points of the triangles of one iso-value, one buffer per worker
///
/// Also returns the number of threads that did the work.
pub(crate) fn extract_points<S, IP, OP>(
    extraction: &Extraction<S, IP>,
    source: &CellSource,
) -> (Vec<Vec<OP>>, usize)
where
    S: ArrayValue,
    IP: Coordinate,
    OP: Coordinate,
{
    let Extraction {
        data_set,
        scalars,
        points,
        value,
        sequential,
    } = *extraction;
    let locals = fold_ranges(
        sequential,
        source.len(),
        source.grain(),
        || LocalPoints {
            thread: current_thread(),
            cursor: CellCursor::new(data_set),
            points: vec![],
        },
        |local, items| {
            let LocalPoints {
                cursor,
                points: out,
                ..
            } = local;
            source.for_each_cell(items, |cell| {
                let (cell_type, ids) = cursor.cell(cell);
                contour_cell(cell_type, ids, scalars, value, |v0, v1, t| {
                    out.extend(interpolate(points, v0, v1, t).map(OP::from_f64));
                });
            });
        },
    );
    let threads = count_threads(locals.iter().map(|l| l.thread));
    let points = locals.into_iter().map(|l| l.points).collect();
    (points, threads)
}

/// Append the worker buffers to the output points and add one triangle per three new points
///
/// Returns the number of points added.
pub(crate) fn append_triangles<OP: Coordinate>(
    sequential: bool,
    locals: &[Vec<OP>],
    out_points: &mut Vec<OP>,
    triangles: &mut CellArray,
) -> usize {
    let sources = locals.iter().map(|l| l.as_slice()).collect::<Vec<_>>();
    let added = sources.iter().map(|s| s.len()).sum::<usize>();
    let start = out_points.len();
    out_points.resize(start + added, OP::default());
    copy_with_offsets(sequential, &sources, &mut out_points[start..]);

    let first_point = start / 3;
    let first_triangle = triangles.number_of_cells();
    let new_triangles = added / 9;
    let total = first_triangle + new_triangles;
    triangles.resize_exact(total, 3 * total);
    let (offsets, connectivity) = triangles.raw_parts_mut();
    for_each_chunk_mut(
        sequential,
        &mut connectivity[3 * first_triangle..],
        3,
        |k, tri| {
            let base = first_point + 3 * k;
            tri.copy_from_slice(&[base, base + 1, base + 2]);
        },
    );
    for_each_chunk_mut(sequential, &mut offsets[first_triangle + 1..], 1, |k, o| {
        o[0] = 3 * (first_triangle + k + 1);
    });
    added / 3
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::{CellType, UnstructuredGridBuilder};

    #[test]
    fn test_append_triangles() {
        let mut points = vec![0.0f32; 9];
        let mut triangles = CellArray::new();
        triangles.push_cell(&[0, 1, 2]);
        let locals = vec![vec![1.0f32; 9], vec![], vec![2.0f32; 18]];
        assert_eq!(append_triangles(false, &locals, &mut points, &mut triangles), 9);
        assert_eq!(points.len(), 36);
        assert_eq!(points[9], 1.0);
        assert_eq!(points[18], 2.0);
        assert_eq!(triangles.number_of_cells(), 4);
        assert_eq!(triangles.cell(1), &[3, 4, 5]);
        assert_eq!(triangles.cell(3), &[9, 10, 11]);
        assert_eq!(triangles.offsets(), &[0, 3, 6, 9, 12]);
    }

    #[test]
    fn test_extract_points() {
        let mut b = UnstructuredGridBuilder::<f64>::new();
        b.add_point(0, [0.0, 0.0, 0.0]);
        b.add_point(1, [1.0, 0.0, 0.0]);
        b.add_point(2, [0.0, 1.0, 0.0]);
        b.add_point(3, [0.0, 0.0, 1.0]);
        b.add_cell(0, (CellType::Tetra, vec![0, 1, 2, 3]));
        let grid = b.create_grid().unwrap();
        let scalars = [0i32, 0, 0, 2];
        let points = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let extraction = Extraction {
            data_set: &grid,
            scalars: &scalars,
            points: &points,
            value: 1.0,
            sequential: true,
        };
        let (locals, threads) = extract_points::<i32, f64, f32>(&extraction, &CellSource::All(1));
        assert_eq!(locals.len(), 1);
        assert_eq!(threads, 1);
        let pts = &locals[0];
        assert_eq!(pts.len(), 9);
        for p in pts.chunks(3) {
            assert_eq!(p[2], 0.5);
        }
        assert_eq!(pts.iter().step_by(3).sum::<f32>(), 0.5);
        assert_eq!(pts.iter().skip(1).step_by(3).sum::<f32>(), 0.5);
    }
}
