//! Types shared across the crate

use crate::grid::CellType;

/// The numeric type held by a data array
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ScalarType {
    /// Unsigned 8-bit integer
    UInt8,
    /// Signed 32-bit integer
    Int32,
    /// Unsigned 32-bit integer
    UInt32,
    /// Signed 64-bit integer
    Int64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
}

impl ScalarType {
    /// Can iso-surfaces be extracted from scalars of this type?
    pub fn is_contourable(self) -> bool {
        matches!(
            self,
            ScalarType::Int32 | ScalarType::UInt32 | ScalarType::Float32 | ScalarType::Float64
        )
    }
}

/// Precision of the points written by a contouring filter
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub enum Precision {
    /// Use the precision of the input points
    #[default]
    Default,
    /// 32-bit floats
    Single,
    /// 64-bit floats
    Double,
}

/// Errors detected while building scalar trees or contouring
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// No dataset was given
    #[error("No data set")]
    NoDataSet,
    /// The dataset has no cells
    #[error("No data")]
    NoCells,
    /// No scalar array could be found
    #[error("No scalar data")]
    NoScalars,
    /// The scalar range is empty or inverted
    #[error("Bad scalar range: [{min}, {max}]")]
    BadScalarRange {
        /// Lower bound of the range
        min: f64,
        /// Upper bound of the range
        max: f64,
    },
    /// The scalars have more than one component
    #[error("Scalars must have a single component, found {0}")]
    ScalarComponents(usize),
    /// The scalars do not cover every point
    #[error("Expected {expected} scalar values, found {found}")]
    ScalarCount {
        /// The number of points
        expected: usize,
        /// The number of scalar tuples
        found: usize,
    },
    /// The scalars are held in a type that cannot be contoured
    #[error("Unsupported scalar type: {0:?}")]
    UnsupportedScalarType(ScalarType),
    /// The cell type cannot be processed by this algorithm
    #[error("Unsupported cell type: {0:?}")]
    UnsupportedCellType(CellType),
    /// A cell references missing points or has the wrong number of points
    #[error("Invalid cell {cell}: {reason}")]
    InvalidCell {
        /// The id of the cell
        cell: usize,
        /// What is wrong with it
        reason: String,
    },
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
