//! Iso-surface extraction
//!
//! [Contour3DLinearGrid] extracts triangle meshes from grids of linear 3D cells in parallel.
//! [ContourGrid] handles cells of every dimension one at a time, merging points as it goes.

mod attributes;
mod extract;
mod fast_path;
mod grid_contour;
mod linear_grid;
mod merged;
mod normals;
mod point_locator;
mod polygon_builder;
mod values;

pub use extract::{edge_parameter, interpolate};
pub use grid_contour::ContourGrid;
pub use linear_grid::{Contour3DLinearGrid, LARGE_ID_THRESHOLD};
pub use normals::{point_normals, NORMALS_NAME};
pub use point_locator::MergePoints;
pub use polygon_builder::PolygonBuilder;
pub use values::ContourValues;
