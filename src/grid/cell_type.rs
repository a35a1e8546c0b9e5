//! Cell types

/// The type of a cell in a dataset
///
/// The discriminants follow the numbering used by VTK files so that cell type arrays can be passed
/// through unchanged.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CellType {
    /// A cell without points
    Empty = 0,
    /// A single point
    Vertex = 1,
    /// A set of points
    PolyVertex = 2,
    /// A line segment
    Line = 3,
    /// A chain of line segments
    PolyLine = 4,
    /// A triangle
    Triangle = 5,
    /// A planar polygon with any number of vertices
    Polygon = 7,
    /// An axis aligned quadrilateral, with vertices numbered in lexicographic order
    Pixel = 8,
    /// A quadrilateral, with vertices numbered around the boundary
    Quad = 9,
    /// A tetrahedron
    Tetra = 10,
    /// An axis aligned hexahedron, with vertices numbered in lexicographic order
    Voxel = 11,
    /// A hexahedron
    Hexahedron = 12,
    /// A triangular prism
    Wedge = 13,
    /// A square-based pyramid
    Pyramid = 14,
}

impl CellType {
    /// Create a cell type from a u8
    pub fn from(i: u8) -> Option<CellType> {
        match i {
            0 => Some(CellType::Empty),
            1 => Some(CellType::Vertex),
            2 => Some(CellType::PolyVertex),
            3 => Some(CellType::Line),
            4 => Some(CellType::PolyLine),
            5 => Some(CellType::Triangle),
            7 => Some(CellType::Polygon),
            8 => Some(CellType::Pixel),
            9 => Some(CellType::Quad),
            10 => Some(CellType::Tetra),
            11 => Some(CellType::Voxel),
            12 => Some(CellType::Hexahedron),
            13 => Some(CellType::Wedge),
            14 => Some(CellType::Pyramid),
            _ => None,
        }
    }

    /// The topological dimension of the cell
    pub fn dim(self) -> usize {
        match self {
            CellType::Empty => 0,
            CellType::Vertex => 0,
            CellType::PolyVertex => 0,
            CellType::Line => 1,
            CellType::PolyLine => 1,
            CellType::Triangle => 2,
            CellType::Polygon => 2,
            CellType::Pixel => 2,
            CellType::Quad => 2,
            CellType::Tetra => 3,
            CellType::Voxel => 3,
            CellType::Hexahedron => 3,
            CellType::Wedge => 3,
            CellType::Pyramid => 3,
        }
    }

    /// Is this one of the linear 3D cells?
    pub fn is_linear_3d(self) -> bool {
        matches!(
            self,
            CellType::Tetra
                | CellType::Voxel
                | CellType::Hexahedron
                | CellType::Wedge
                | CellType::Pyramid
        )
    }

    /// The number of points of the cell, or `None` if the cell can have any number of points
    pub fn number_of_points(self) -> Option<usize> {
        match self {
            CellType::Empty => Some(0),
            CellType::Vertex => Some(1),
            CellType::Line => Some(2),
            CellType::Triangle => Some(3),
            CellType::Pixel | CellType::Quad | CellType::Tetra => Some(4),
            CellType::Pyramid => Some(5),
            CellType::Wedge => Some(6),
            CellType::Voxel | CellType::Hexahedron => Some(8),
            CellType::PolyVertex | CellType::PolyLine | CellType::Polygon => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cell_type_from_u8() {
        for i in 0..20 {
            if let Some(c) = CellType::from(i) {
                assert_eq!(c as u8, i);
            }
        }
        assert_eq!(CellType::from(6), None);
        assert_eq!(CellType::from(42), None);
    }

    #[test]
    fn test_linear_3d() {
        let linear = (0..20)
            .filter_map(CellType::from)
            .filter(|c| c.is_linear_3d())
            .count();
        assert_eq!(linear, 5);
        for c in (0..20).filter_map(CellType::from) {
            if c.is_linear_3d() {
                assert_eq!(c.dim(), 3);
            }
        }
    }
}
