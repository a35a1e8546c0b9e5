//! Point normals of triangle meshes

use crate::grid::{CellArray, Coordinate, DataArray};
use crate::threads::for_each_chunk_mut;
use rayon::prelude::*;

/// The name of the normals array
pub const NORMALS_NAME: &str = "Normals";

fn triangle_normal<P: Coordinate>(points: &[P], t: &[usize]) -> [f64; 3] {
    let x = |i: usize| {
        [
            points[3 * t[i]].as_f64(),
            points[3 * t[i] + 1].as_f64(),
            points[3 * t[i] + 2].as_f64(),
        ]
    };
    let (a, b, c) = (x(0), x(1), x(2));
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    normalized([
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ])
}

fn normalized(n: [f64; 3]) -> [f64; 3] {
    let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if length > 0.0 {
        [n[0] / length, n[1] / length, n[2] / length]
    } else {
        n
    }
}

/// Compute point normals by averaging the unit normals of the triangles around each point
///
/// Points not used by any triangle, and points whose triangle normals cancel, get a zero normal.
pub fn point_normals<P: Coordinate>(
    sequential: bool,
    points: &[P],
    triangles: &CellArray,
) -> DataArray {
    let npoints = points.len() / 3;
    let ntriangles = triangles.number_of_cells();

    let mut triangle_normals = vec![[0.0; 3]; ntriangles];
    for_each_chunk_mut(sequential, &mut triangle_normals, 1, |t, n| {
        n[0] = triangle_normal(points, triangles.cell(t));
    });

    // Point to triangle links
    let mut offsets = vec![0; npoints + 1];
    for p in triangles.connectivity() {
        offsets[p + 1] += 1;
    }
    for i in 0..npoints {
        offsets[i + 1] += offsets[i];
    }
    let mut links = vec![0; offsets[npoints]];
    let mut next = offsets[..npoints].to_vec();
    for (t, triangle) in triangles.iter().enumerate() {
        for p in triangle {
            links[next[*p]] = t;
            next[*p] += 1;
        }
    }

    let mut normals = vec![0.0f32; 3 * npoints];
    let average = |p: usize, n: &mut [f32]| {
        let sum = links[offsets[p]..offsets[p + 1]]
            .iter()
            .fold([0.0; 3], |s, t| {
                let m = triangle_normals[*t];
                [s[0] + m[0], s[1] + m[1], s[2] + m[2]]
            });
        for (ni, si) in n.iter_mut().zip(normalized(sum)) {
            *ni = si as f32;
        }
    };
    if sequential {
        normals
            .chunks_mut(3)
            .enumerate()
            .for_each(|(p, n)| average(p, n));
    } else {
        normals
            .par_chunks_mut(3)
            .enumerate()
            .for_each(|(p, n)| average(p, n));
    }
    DataArray::from_vec(NORMALS_NAME, 3, normals)
}
