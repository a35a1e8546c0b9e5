//! Iso-surface extraction with point merging
//!
//! Workers record, for each triangle corner, the edge it lies on. The edges are gathered into one
//! array and sorted, so that every group of identical edges becomes one output point.

use crate::contour::extract::{contour_cell, interpolate, CellCursor, CellSource};
use crate::contour::fast_path::Extraction;
use crate::grid::{ArrayValue, CellArray, Coordinate};
use crate::threads::{
    copy_with_offsets, count_threads, current_thread, fold_ranges, for_each_chunk_mut,
};
use itertools::Itertools;
use rayon::prelude::*;
use std::fmt::Debug;

/// An integer type used for point and edge ids while merging
///
/// Narrow ids halve the memory traffic of the sort for inputs that allow them.
pub trait EdgeId: Copy + Ord + Send + Sync + Debug + Default + 'static {
    /// Convert from an index
    fn from_usize(i: usize) -> Self;

    /// Convert to an index
    fn index(self) -> usize;
}

impl EdgeId for u32 {
    fn from_usize(i: usize) -> Self {
        i as u32
    }
    fn index(self) -> usize {
        self as usize
    }
}

impl EdgeId for u64 {
    fn from_usize(i: usize) -> Self {
        i as u64
    }
    fn index(self) -> usize {
        self as usize
    }
}

/// A triangle corner on the edge `v0`-`v1` (with `v0 < v1`) at parameter `t` from `v0`
///
/// `eid` is the position of the corner in the triangle connectivity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct EdgeTuple<I> {
    pub v0: I,
    pub v1: I,
    pub t: f64,
    pub eid: I,
}

impl<I: EdgeId> EdgeTuple<I> {
    fn new(v0: usize, v1: usize, t: f64) -> Self {
        if v0 > v1 {
            Self {
                v0: I::from_usize(v1),
                v1: I::from_usize(v0),
                t: 1.0 - t,
                eid: I::default(),
            }
        } else {
            Self {
                v0: I::from_usize(v0),
                v1: I::from_usize(v1),
                t,
                eid: I::default(),
            }
        }
    }
}

struct LocalEdges<'a, I> {
    thread: Option<usize>,
    cursor: CellCursor<'a>,
    edges: Vec<EdgeTuple<I>>,
}

/// Gather the triangle corners of one iso-value, in triangle order
///
/// Also returns the number of threads that did the work.
pub(crate) fn extract_edges<S, P, I>(
    extraction: &Extraction<S, P>,
    source: &CellSource,
) -> (Vec<EdgeTuple<I>>, usize)
where
    S: ArrayValue,
    P: Coordinate,
    I: EdgeId,
{
    let Extraction {
        data_set,
        scalars,
        value,
        sequential,
        ..
    } = *extraction;
    let locals = fold_ranges(
        sequential,
        source.len(),
        source.grain(),
        || LocalEdges {
            thread: current_thread(),
            cursor: CellCursor::new(data_set),
            edges: vec![],
        },
        |local, items| {
            let LocalEdges { cursor, edges, .. } = local;
            source.for_each_cell(items, |cell| {
                let (cell_type, ids) = cursor.cell(cell);
                contour_cell(cell_type, ids, scalars, value, |v0, v1, t| {
                    edges.push(EdgeTuple::new(v0, v1, t));
                });
            });
        },
    );
    let sources = locals
        .iter()
        .map(|l| l.edges.as_slice())
        .collect::<Vec<_>>();
    let total = sources.iter().map(|s| s.len()).sum();
    let mut edges = vec![EdgeTuple::default(); total];
    copy_with_offsets(sequential, &sources, &mut edges);
    if sequential {
        edges
            .iter_mut()
            .enumerate()
            .for_each(|(i, e)| e.eid = I::from_usize(i));
    } else {
        edges
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, e)| e.eid = I::from_usize(i));
    }
    (edges, count_threads(locals.iter().map(|l| l.thread)))
}

/// Sort the edges and find the groups of identical edges
///
/// Returns the offsets of the groups: group `p` is `edges[offsets[p]..offsets[p + 1]]`.
pub(crate) fn merge_edges<I: EdgeId>(sequential: bool, edges: &mut [EdgeTuple<I>]) -> Vec<usize> {
    if edges.is_empty() {
        return vec![0];
    }
    let key = |e: &EdgeTuple<I>| (e.v0, e.v1, e.eid);
    if sequential {
        edges.sort_unstable_by_key(key);
    } else {
        edges.par_sort_unstable_by_key(key);
    }
    let edges = &*edges;
    let boundary = |i: &usize| (edges[*i - 1].v0, edges[*i - 1].v1) != (edges[*i].v0, edges[*i].v1);
    let mut offsets = vec![0];
    if sequential {
        offsets.extend((1..edges.len()).filter(boundary));
    } else {
        offsets.par_extend((1..edges.len()).into_par_iter().filter(boundary));
    }
    offsets.push(edges.len());
    offsets
}

/// Append one point per group of merged edges and the triangles referring to them
///
/// Returns the number of points added.
pub(crate) fn append_merged<P, OP, I>(
    sequential: bool,
    points: &[P],
    edges: &[EdgeTuple<I>],
    offsets: &[usize],
    out_points: &mut Vec<OP>,
    triangles: &mut CellArray,
) -> usize
where
    P: Coordinate,
    OP: Coordinate,
    I: EdgeId,
{
    let new_points = offsets.len() - 1;
    let first_point = out_points.len() / 3;
    out_points.resize(3 * (first_point + new_points), OP::default());
    for_each_chunk_mut(sequential, &mut out_points[3 * first_point..], 3, |p, x| {
        let e = &edges[offsets[p]];
        let y = interpolate(points, e.v0.index(), e.v1.index(), e.t);
        for (xi, yi) in x.iter_mut().zip(y) {
            *xi = OP::from_f64(yi);
        }
    });

    let first_triangle = triangles.number_of_cells();
    let total = first_triangle + edges.len() / 3;
    triangles.resize_exact(total, 3 * total);
    let (tri_offsets, connectivity) = triangles.raw_parts_mut();
    let connectivity = &mut connectivity[3 * first_triangle..];
    for (p, (start, end)) in offsets.iter().tuple_windows().enumerate() {
        for e in &edges[*start..*end] {
            connectivity[e.eid.index()] = first_point + p;
        }
    }
    for_each_chunk_mut(
        sequential,
        &mut tri_offsets[first_triangle + 1..],
        1,
        |k, o| o[0] = 3 * (first_triangle + k + 1),
    );
    new_points
}
