//! Grids shared by the integration tests
#![allow(dead_code)]

use isocontour::grid::{CellType, DataArray, PolyData, UnstructuredGridBuilder};
use isocontour::traits::DataSet;
use std::sync::Arc;

fn point_id(n: usize, i: usize, j: usize, k: usize) -> usize {
    i + (n + 1) * (j + (n + 1) * k)
}

fn add_points(b: &mut UnstructuredGridBuilder<f64>, n: usize) -> Vec<[f64; 3]> {
    let h = 1.0 / n as f64;
    let mut points = vec![];
    for k in 0..=n {
        for j in 0..=n {
            for i in 0..=n {
                let x = [i as f64 * h, j as f64 * h, k as f64 * h];
                b.add_point(point_id(n, i, j, k), x);
                points.push(x);
            }
        }
    }
    points
}

/// The corners of hexahedron (i, j, k), in hexahedron order
fn hex(n: usize, i: usize, j: usize, k: usize) -> [usize; 8] {
    [
        point_id(n, i, j, k),
        point_id(n, i + 1, j, k),
        point_id(n, i + 1, j + 1, k),
        point_id(n, i, j + 1, k),
        point_id(n, i, j, k + 1),
        point_id(n, i + 1, j, k + 1),
        point_id(n, i + 1, j + 1, k + 1),
        point_id(n, i, j + 1, k + 1),
    ]
}

/// A grid of `n * n * n` hexahedra on the unit cube with scalars `f` named "s"
pub fn hex_grid(n: usize, f: impl Fn([f64; 3]) -> f64) -> Arc<dyn DataSet> {
    let mut b = UnstructuredGridBuilder::<f64>::new();
    let points = add_points(&mut b, n);
    let mut id = 0;
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                b.add_cell(id, (CellType::Hexahedron, hex(n, i, j, k).to_vec()));
                id += 1;
            }
        }
    }
    b.add_point_scalars(DataArray::from_scalars(
        "s",
        points.iter().map(|x| f(*x)).collect::<Vec<_>>(),
    ));
    Arc::new(b.create_grid().unwrap())
}

/// The unit cube split into `n * n * n` cubes of six positively oriented tetrahedra each
pub fn tet_grid(n: usize, f: impl Fn([f64; 3]) -> f64) -> Arc<dyn DataSet> {
    let mut b = UnstructuredGridBuilder::<f64>::new();
    let points = add_points(&mut b, n);
    let mut id = 0;
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                let c = hex(n, i, j, k);
                // Paths from corner 0 to corner 6 along the axes
                for [p, q] in [[1, 2], [2, 3], [3, 7], [7, 4], [4, 5], [5, 1]] {
                    b.add_cell(id, (CellType::Tetra, vec![c[0], c[p], c[q], c[6]]));
                    id += 1;
                }
            }
        }
    }
    b.add_point_scalars(DataArray::from_scalars(
        "s",
        points.iter().map(|x| f(*x)).collect::<Vec<_>>(),
    ));
    Arc::new(b.create_grid().unwrap())
}

/// The distance from the centre of the unit cube
pub fn sphere(x: [f64; 3]) -> f64 {
    ((x[0] - 0.5).powi(2) + (x[1] - 0.5).powi(2) + (x[2] - 0.5).powi(2)).sqrt()
}

/// The triangles of a mesh as sorted lists of coordinate bits, for comparing meshes whose points
/// and triangles are ordered differently
pub fn triangle_set(mesh: &PolyData) -> Vec<[[u64; 3]; 3]> {
    let mut triangles = mesh
        .polys()
        .iter()
        .map(|t| {
            let mut corners = [0, 1, 2].map(|i| mesh.points().point(t[i]).map(|c| (c + 0.0).to_bits()));
            corners.sort();
            corners
        })
        .collect::<Vec<_>>();
    triangles.sort();
    triangles
}
