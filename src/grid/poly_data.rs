//! Polygonal output meshes

use crate::grid::{CellArray, PointData, Points};

/// A mesh of vertices, lines and polygons
///
/// Cells are ordered verts first, then lines, then polygons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolyData {
    points: Points,
    verts: CellArray,
    lines: CellArray,
    polys: CellArray,
    point_data: PointData,
}

impl PolyData {
    /// Create an empty mesh whose points will be stored like `points`
    pub fn new(points: Points) -> Self {
        Self {
            points,
            ..Default::default()
        }
    }

    /// Create a mesh from its parts
    pub fn from_parts(points: Points, verts: CellArray, lines: CellArray, polys: CellArray) -> Self {
        Self {
            points,
            verts,
            lines,
            polys,
            point_data: PointData::new(),
        }
    }

    /// The points
    pub fn points(&self) -> &Points {
        &self.points
    }

    /// Mutable access to the points
    pub fn points_mut(&mut self) -> &mut Points {
        &mut self.points
    }

    /// The number of points
    pub fn number_of_points(&self) -> usize {
        self.points.number_of_points()
    }

    /// The total number of cells
    pub fn number_of_cells(&self) -> usize {
        self.verts.number_of_cells() + self.lines.number_of_cells() + self.polys.number_of_cells()
    }

    /// Vertex cells
    pub fn verts(&self) -> &CellArray {
        &self.verts
    }

    /// Line cells
    pub fn lines(&self) -> &CellArray {
        &self.lines
    }

    /// Polygon cells
    pub fn polys(&self) -> &CellArray {
        &self.polys
    }

    /// Mutable access to the polygon cells
    pub fn polys_mut(&mut self) -> &mut CellArray {
        &mut self.polys
    }

    /// The arrays attached to the points
    pub fn point_data(&self) -> &PointData {
        &self.point_data
    }

    /// Mutable access to the point data
    pub fn point_data_mut(&mut self) -> &mut PointData {
        &mut self.point_data
    }

    /// Does the mesh have no points and no cells?
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.number_of_cells() == 0
    }

    /// Release unused capacity
    pub fn squeeze(&mut self) {
        self.points.squeeze();
        self.verts.squeeze();
        self.lines.squeeze();
        self.polys.squeeze();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_counts() {
        let mut polys = CellArray::new();
        polys.push_cell(&[0, 1, 2]);
        let mut verts = CellArray::new();
        verts.push_cell(&[0]);
        let pd = PolyData::from_parts(
            Points::from_f64_points(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            verts,
            CellArray::new(),
            polys,
        );
        assert_eq!(pd.number_of_points(), 3);
        assert_eq!(pd.number_of_cells(), 2);
        assert!(!pd.is_empty());
        assert!(PolyData::default().is_empty());
    }
}
