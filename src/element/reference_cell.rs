//! Reference cell topology
//!
//! Faces are listed counter-clockwise when viewed from outside the cell, so every edge is traversed
//! once in each direction by the faces that share it.

use crate::grid::CellType;

/// The vertices of the reference cell
pub fn vertices(cell: CellType) -> Vec<[f64; 3]> {
    match cell {
        CellType::Vertex => vec![[0.0, 0.0, 0.0]],
        CellType::Line => vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
        CellType::Triangle => vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        CellType::Pixel => vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
        ],
        CellType::Quad => vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ],
        CellType::Tetra => vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ],
        CellType::Voxel => vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
        ],
        CellType::Hexahedron => vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ],
        CellType::Wedge => vec![
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
            [1.0, 0.0, 1.0],
        ],
        CellType::Pyramid => vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.5, 0.5, 1.0],
        ],
        CellType::Empty | CellType::PolyVertex | CellType::PolyLine | CellType::Polygon => vec![],
    }
}

/// The edges of the reference cell
pub fn edges(cell: CellType) -> &'static [[usize; 2]] {
    match cell {
        CellType::Line => &[[0, 1]],
        CellType::Triangle => &[[0, 1], [1, 2], [2, 0]],
        CellType::Pixel => &[[0, 1], [1, 3], [2, 3], [0, 2]],
        CellType::Quad => &[[0, 1], [1, 2], [2, 3], [3, 0]],
        CellType::Tetra => &[[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]],
        CellType::Voxel => &[
            [0, 1],
            [1, 3],
            [2, 3],
            [0, 2],
            [4, 5],
            [5, 7],
            [6, 7],
            [4, 6],
            [0, 4],
            [1, 5],
            [2, 6],
            [3, 7],
        ],
        CellType::Hexahedron => &[
            [0, 1],
            [1, 2],
            [3, 2],
            [0, 3],
            [4, 5],
            [5, 6],
            [7, 6],
            [4, 7],
            [0, 4],
            [1, 5],
            [3, 7],
            [2, 6],
        ],
        CellType::Wedge => &[
            [0, 1],
            [1, 2],
            [2, 0],
            [3, 4],
            [4, 5],
            [5, 3],
            [0, 3],
            [1, 4],
            [2, 5],
        ],
        CellType::Pyramid => &[
            [0, 1],
            [1, 2],
            [2, 3],
            [3, 0],
            [0, 4],
            [1, 4],
            [2, 4],
            [3, 4],
        ],
        CellType::Empty
        | CellType::Vertex
        | CellType::PolyVertex
        | CellType::PolyLine
        | CellType::Polygon => &[],
    }
}

/// The faces of a 3D reference cell, oriented outwards
pub fn faces(cell: CellType) -> &'static [&'static [usize]] {
    match cell {
        CellType::Tetra => &[&[0, 1, 3], &[1, 2, 3], &[2, 0, 3], &[0, 2, 1]],
        CellType::Voxel => &[
            &[0, 2, 3, 1],
            &[4, 5, 7, 6],
            &[0, 1, 5, 4],
            &[1, 3, 7, 5],
            &[3, 2, 6, 7],
            &[2, 0, 4, 6],
        ],
        CellType::Hexahedron => &[
            &[0, 3, 2, 1],
            &[4, 5, 6, 7],
            &[0, 1, 5, 4],
            &[1, 2, 6, 5],
            &[2, 3, 7, 6],
            &[3, 0, 4, 7],
        ],
        CellType::Wedge => &[
            &[0, 1, 2],
            &[3, 5, 4],
            &[0, 3, 4, 1],
            &[1, 4, 5, 2],
            &[2, 5, 3, 0],
        ],
        CellType::Pyramid => &[
            &[0, 3, 2, 1],
            &[0, 1, 4],
            &[1, 2, 4],
            &[2, 3, 4],
            &[3, 0, 4],
        ],
        _ => &[],
    }
}

/// The vertices of a 2D cell in order around its boundary
pub fn boundary_loop(cell: CellType) -> Option<&'static [usize]> {
    match cell {
        CellType::Triangle => Some(&[0, 1, 2]),
        CellType::Quad => Some(&[0, 1, 2, 3]),
        CellType::Pixel => Some(&[0, 1, 3, 2]),
        _ => None,
    }
}

/// The index of the edge joining two vertices, in either direction
pub fn edge_index(cell: CellType, v0: usize, v1: usize) -> Option<usize> {
    edges(cell)
        .iter()
        .position(|e| (e[0] == v0 && e[1] == v1) || (e[0] == v1 && e[1] == v0))
}

#[cfg(test)]
mod test {
    use super::*;
    use paste::paste;
    use std::collections::HashMap;

    fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    macro_rules! test_cell {

        ($($cell:ident),+) => {

        $(
            paste! {

                #[test]
                fn [<test_ $cell:lower>]() {
                    let cell = CellType::[<$cell>];
                    let v = vertices(cell);
                    let e = edges(cell);
                    let f = faces(cell);
                    assert_eq!(Some(v.len()), cell.number_of_points());

                    // Euler characteristic of a polyhedron
                    assert_eq!(v.len() + f.len(), e.len() + 2);

                    // Every edge is used once in each direction
                    let mut directed = HashMap::new();
                    for face in f {
                        for (i, a) in face.iter().enumerate() {
                            let b = face[(i + 1) % face.len()];
                            *directed.entry((*a, b)).or_insert(0) += 1;
                        }
                    }
                    assert_eq!(directed.len(), 2 * e.len());
                    for [a, b] in e {
                        assert_eq!(directed.get(&(*a, *b)), Some(&1));
                        assert_eq!(directed.get(&(*b, *a)), Some(&1));
                    }

                    // Faces point away from the centroid
                    let n = v.len() as f64;
                    let centroid = v.iter().fold([0.0; 3], |c, p| {
                        [c[0] + p[0] / n, c[1] + p[1] / n, c[2] + p[2] / n]
                    });
                    for face in f {
                        let normal = cross(sub(v[face[1]], v[face[0]]), sub(v[face[2]], v[face[0]]));
                        let out = sub(v[face[0]], centroid);
                        let dot = normal[0] * out[0] + normal[1] * out[1] + normal[2] * out[2];
                        assert!(dot > 0.0);
                    }
                }
            }
        )*
        };
    }

    test_cell!(Tetra, Voxel, Hexahedron, Wedge, Pyramid);

    #[test]
    fn test_boundary_loops() {
        for cell in [CellType::Triangle, CellType::Quad, CellType::Pixel] {
            let lp = boundary_loop(cell).unwrap();
            for (i, a) in lp.iter().enumerate() {
                let b = lp[(i + 1) % lp.len()];
                assert!(edge_index(cell, *a, b).is_some());
            }
        }
        assert!(boundary_loop(CellType::Tetra).is_none());
    }

    #[test]
    fn test_edge_index() {
        assert_eq!(edge_index(CellType::Tetra, 3, 1), Some(4));
        assert_eq!(edge_index(CellType::Hexahedron, 2, 3), Some(2));
        assert_eq!(edge_index(CellType::Tetra, 0, 0), None);
    }
}
