//! Grid creation and storage

mod cell_array;
mod cell_type;
mod data_array;
mod point_data;
mod points;
mod poly_data;
mod unstructured_grid;

pub use cell_array::CellArray;
pub use cell_type::CellType;
pub(crate) use data_array::with_array_data;
pub use data_array::{ArrayData, ArrayValue, DataArray};
pub use point_data::PointData;
pub use points::{Coordinate, Points};
pub use poly_data::PolyData;
pub use unstructured_grid::{UnstructuredGrid, UnstructuredGridBuilder};
