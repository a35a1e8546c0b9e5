//! Interpolation of point attributes onto merged iso-surface points

use crate::contour::merged::{EdgeId, EdgeTuple};
use crate::grid::{with_array_data, ArrayData, ArrayValue, DataArray, PointData};
use crate::threads::for_each_chunk_mut;

/// The point arrays of the input, interpolated onto the output points of every iso-value
pub(crate) struct AttributeInterpolator<'a> {
    arrays: Vec<&'a DataArray>,
    values: Vec<Vec<f64>>,
}

impl<'a> AttributeInterpolator<'a> {
    /// Interpolate every array of `point_data` except the array named `exclude`
    pub fn new(point_data: &'a PointData, exclude: &str) -> Self {
        let arrays = point_data
            .arrays()
            .iter()
            .filter(|a| a.name() != exclude)
            .collect::<Vec<_>>();
        let values = vec![vec![]; arrays.len()];
        Self { arrays, values }
    }

    /// The number of interpolated arrays
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Append the values at the points of one group of merged edges per point
    pub fn append<I: EdgeId>(&mut self, sequential: bool, edges: &[EdgeTuple<I>], offsets: &[usize]) {
        let new_points = offsets.len() - 1;
        for (array, out) in self.arrays.iter().zip(self.values.iter_mut()) {
            let ncomp = array.components();
            let start = out.len();
            out.resize(start + ncomp * new_points, 0.0);
            let out = &mut out[start..];
            with_array_data!(array.data(), v => {
                interpolate_tuples(sequential, v, ncomp, edges, offsets, out)
            });
        }
    }

    /// The interpolated arrays, holding the same types as the input arrays
    pub fn finish(self) -> Vec<DataArray> {
        self.arrays
            .iter()
            .zip(self.values)
            .map(|(array, values)| {
                DataArray::new(
                    array.name(),
                    array.components(),
                    array.data().from_f64_like(&values),
                )
            })
            .collect()
    }
}

fn interpolate_tuples<T: ArrayValue, I: EdgeId>(
    sequential: bool,
    source: &[T],
    ncomp: usize,
    edges: &[EdgeTuple<I>],
    offsets: &[usize],
    out: &mut [f64],
) {
    for_each_chunk_mut(sequential, out, ncomp, |p, tuple| {
        let e = &edges[offsets[p]];
        let (i0, i1) = (e.v0.index() * ncomp, e.v1.index() * ncomp);
        for (c, x) in tuple.iter_mut().enumerate() {
            let a = source[i0 + c].as_f64();
            *x = a + e.t * (source[i1 + c].as_f64() - a);
        }
    });
}
