//! Exact point merging

use crate::grid::Points;
use std::collections::HashMap;

/// A point set that stores each distinct point once
///
/// Points are compared exactly, after rounding to the precision of the storage. Negative and positive
/// zero are the same coordinate.
#[derive(Debug, Clone, Default)]
pub struct MergePoints {
    points: Points,
    ids: HashMap<[u64; 3], usize>,
}

impl MergePoints {
    /// Create a locator storing points like `points`; existing points are kept but not merged with
    pub fn new(points: Points) -> Self {
        Self {
            points,
            ids: HashMap::new(),
        }
    }

    fn key(&self, x: [f64; 3]) -> [u64; 3] {
        let single = self.points.is_single();
        x.map(|c| {
            let c = if single { c as f32 as f64 } else { c };
            (c + 0.0).to_bits()
        })
    }

    /// Insert a point unless it is already there
    ///
    /// Returns the id of the point and whether it was inserted.
    pub fn insert_unique_point(&mut self, x: [f64; 3]) -> (usize, bool) {
        let key = self.key(x);
        if let Some(id) = self.ids.get(&key) {
            return (*id, false);
        }
        let id = self.points.number_of_points();
        self.points.push(x);
        self.ids.insert(key, id);
        (id, true)
    }

    /// The id of a point, if it has been inserted
    pub fn is_inserted_point(&self, x: [f64; 3]) -> Option<usize> {
        self.ids.get(&self.key(x)).copied()
    }

    /// The number of points
    pub fn number_of_points(&self) -> usize {
        self.points.number_of_points()
    }

    /// The stored points
    pub fn points(&self) -> &Points {
        &self.points
    }

    /// Take the stored points
    pub fn into_points(self) -> Points {
        self.points
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_merge() {
        let mut locator = MergePoints::new(Points::Float64(vec![]));
        assert_eq!(locator.insert_unique_point([0.0, 1.0, 2.0]), (0, true));
        assert_eq!(locator.insert_unique_point([1.0, 1.0, 2.0]), (1, true));
        assert_eq!(locator.insert_unique_point([-0.0, 1.0, 2.0]), (0, false));
        assert_eq!(locator.is_inserted_point([1.0, 1.0, 2.0]), Some(1));
        assert_eq!(locator.is_inserted_point([1.0, 1.0, 2.5]), None);
        assert_eq!(locator.number_of_points(), 2);
        assert_eq!(locator.into_points(), Points::Float64(vec![0.0, 1.0, 2.0, 1.0, 1.0, 2.0]));
    }

    #[test]
    fn test_merge_in_single_precision() {
        let mut locator = MergePoints::new(Points::Float32(vec![]));
        locator.insert_unique_point([0.1, 0.2, 0.3]);
        let (id, inserted) = locator.insert_unique_point([0.1 + 1e-12, 0.2, 0.3]);
        assert_eq!(id, 0);
        assert!(!inserted);
        assert!(locator.points().is_single());
    }
}
