//! Point coordinates

use crate::types::Precision;
use std::fmt::Debug;

/// Point coordinates, stored as contiguous xyz triples
#[derive(Debug, Clone, PartialEq)]
pub enum Points {
    /// Single precision coordinates
    Float32(Vec<f32>),
    /// Double precision coordinates
    Float64(Vec<f64>),
}

/// A floating point type used for coordinates
pub trait Coordinate: num::Float + Send + Sync + Debug + Default + 'static {
    /// Wrap a vector of coordinates
    fn wrap(values: Vec<Self>) -> Points;

    /// The coordinates, if the points hold this type
    fn slice(points: &Points) -> Option<&[Self]>;

    /// Convert from a double
    fn from_f64(x: f64) -> Self;

    /// Convert to a double
    fn as_f64(self) -> f64;
}

impl Coordinate for f32 {
    fn wrap(values: Vec<Self>) -> Points {
        Points::Float32(values)
    }
    fn slice(points: &Points) -> Option<&[Self]> {
        match points {
            Points::Float32(v) => Some(v),
            Points::Float64(_) => None,
        }
    }
    fn from_f64(x: f64) -> Self {
        x as f32
    }
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Coordinate for f64 {
    fn wrap(values: Vec<Self>) -> Points {
        Points::Float64(values)
    }
    fn slice(points: &Points) -> Option<&[Self]> {
        match points {
            Points::Float32(_) => None,
            Points::Float64(v) => Some(v),
        }
    }
    fn from_f64(x: f64) -> Self {
        x
    }
    fn as_f64(self) -> f64 {
        self
    }
}

impl Default for Points {
    fn default() -> Self {
        Points::Float32(vec![])
    }
}

impl Points {
    /// Empty points of the precision chosen by `precision` for input points `input`
    pub fn new_for_output(precision: Precision, input: &Points) -> Self {
        match (precision, input) {
            (Precision::Single, _) | (Precision::Default, Points::Float32(_)) => {
                Points::Float32(vec![])
            }
            (Precision::Double, _) | (Precision::Default, Points::Float64(_)) => {
                Points::Float64(vec![])
            }
        }
    }

    /// Create points from double precision triples
    pub fn from_f64_points(points: &[[f64; 3]]) -> Self {
        Points::Float64(points.iter().flatten().copied().collect())
    }

    /// The number of points
    pub fn number_of_points(&self) -> usize {
        match self {
            Points::Float32(v) => v.len() / 3,
            Points::Float64(v) => v.len() / 3,
        }
    }

    /// Are there no points?
    pub fn is_empty(&self) -> bool {
        self.number_of_points() == 0
    }

    /// Are the points stored in single precision?
    pub fn is_single(&self) -> bool {
        matches!(self, Points::Float32(_))
    }

    /// The coordinates of a point
    pub fn point(&self, index: usize) -> [f64; 3] {
        match self {
            Points::Float32(v) => [
                v[3 * index] as f64,
                v[3 * index + 1] as f64,
                v[3 * index + 2] as f64,
            ],
            Points::Float64(v) => [v[3 * index], v[3 * index + 1], v[3 * index + 2]],
        }
    }

    /// Append a point, converting to the stored precision
    pub fn push(&mut self, x: [f64; 3]) {
        match self {
            Points::Float32(v) => v.extend(x.iter().map(|c| *c as f32)),
            Points::Float64(v) => v.extend_from_slice(&x),
        }
    }

    /// Release unused capacity
    pub fn squeeze(&mut self) {
        match self {
            Points::Float32(v) => v.shrink_to_fit(),
            Points::Float64(v) => v.shrink_to_fit(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_output_precision() {
        let single = Points::Float32(vec![0.0; 3]);
        let double = Points::Float64(vec![0.0; 3]);
        assert!(Points::new_for_output(Precision::Default, &single).is_single());
        assert!(!Points::new_for_output(Precision::Default, &double).is_single());
        assert!(Points::new_for_output(Precision::Single, &double).is_single());
        assert!(!Points::new_for_output(Precision::Double, &single).is_single());
    }

    #[test]
    fn test_push() {
        let mut p = Points::Float32(vec![]);
        p.push([1.0, 2.0, 3.0]);
        p.push([0.5, 0.25, 0.125]);
        assert_eq!(p.number_of_points(), 2);
        assert_eq!(p.point(1), [0.5, 0.25, 0.125]);
        assert_eq!(f32::slice(&p).map(|s| s.len()), Some(6));
        assert!(f64::slice(&p).is_none());
    }
}
