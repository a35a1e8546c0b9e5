//! Reference cells and iso-surface case tables

pub mod case_table;
pub mod reference_cell;
