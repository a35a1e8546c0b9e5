//! Merging triangles into polygons

/// Merge the triangles produced inside one cell into polygons
///
/// Each triangle adds its three directed edges; an edge cancels against the same edge in the opposite
/// direction. The edges left over form the boundaries of the polygons.
#[derive(Debug, Clone, Default)]
pub struct PolygonBuilder {
    edges: Vec<[usize; 2]>,
}

impl PolygonBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triangle. Triangles with repeated points are ignored.
    pub fn insert_triangle(&mut self, triangle: [usize; 3]) {
        let [a, b, c] = triangle;
        if a == b || b == c || a == c {
            return;
        }
        for edge in [[a, b], [b, c], [c, a]] {
            match self.edges.iter().position(|e| *e == [edge[1], edge[0]]) {
                Some(i) => {
                    self.edges.swap_remove(i);
                }
                None => self.edges.push(edge),
            }
        }
    }

    /// Are there no edges?
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Remove all edges
    pub fn reset(&mut self) {
        self.edges.clear();
    }

    /// Chain the remaining edges into polygons and reset the builder
    pub fn polygons(&mut self) -> Vec<Vec<usize>> {
        let mut polygons = vec![];
        self.edges.reverse();
        while let Some([start, mut current]) = self.edges.pop() {
            let mut polygon = vec![start];
            while current != start {
                polygon.push(current);
                match self.edges.iter().rposition(|e| e[0] == current) {
                    Some(i) => current = self.edges.remove(i)[1],
                    None => break,
                }
            }
            if polygon.len() >= 3 {
                polygons.push(polygon);
            }
        }
        polygons
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fan_to_polygon() {
        let mut builder = PolygonBuilder::new();
        builder.insert_triangle([0, 1, 2]);
        builder.insert_triangle([0, 2, 3]);
        builder.insert_triangle([0, 3, 4]);
        assert_eq!(builder.polygons(), vec![vec![0, 1, 2, 3, 4]]);
        assert!(builder.is_empty());
    }

    #[test]
    fn test_separate_polygons() {
        let mut builder = PolygonBuilder::new();
        builder.insert_triangle([0, 1, 2]);
        builder.insert_triangle([5, 6, 7]);
        builder.insert_triangle([5, 7, 8]);
        builder.insert_triangle([3, 3, 4]);
        let polygons = builder.polygons();
        assert_eq!(polygons, vec![vec![0, 1, 2], vec![5, 6, 7, 8]]);
    }

    #[test]
    fn test_reset() {
        let mut builder = PolygonBuilder::new();
        builder.insert_triangle([0, 1, 2]);
        builder.reset();
        assert!(builder.polygons().is_empty());
    }
}
