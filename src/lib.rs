//! Isocontour
//!
//! Scalar tree accelerated isosurface extraction for unstructured grids of linear cells.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

#[macro_use]
extern crate lazy_static;

pub mod contour;
pub mod element;
pub mod grid;
pub mod scalar_tree;
pub mod threads;
pub mod timestamp;
pub mod traits;
pub mod types;
