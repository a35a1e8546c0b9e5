//! Iso-values

/// The list of iso-values a filter contours, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourValues {
    values: Vec<f64>,
}

impl ContourValues {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list from values
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }

    /// Set the value at `index`, growing the list with zeros if needed
    pub fn set_value(&mut self, index: usize, value: f64) {
        if index >= self.values.len() {
            self.values.resize(index + 1, 0.0);
        }
        self.values[index] = value;
    }

    /// The value at `index`
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// All values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The number of values
    pub fn number_of_contours(&self) -> usize {
        self.values.len()
    }

    /// Resize the list, padding with zeros
    pub fn set_number_of_contours(&mut self, number: usize) {
        self.values.resize(number, 0.0);
    }

    /// Replace the values by `number` equally spaced values from `range[0]` to `range[1]`
    ///
    /// A single value is placed at `range[0]`.
    pub fn generate_values(&mut self, number: usize, range: [f64; 2]) {
        self.values = match number {
            0 => vec![],
            1 => vec![range[0]],
            _ => {
                let step = (range[1] - range[0]) / (number - 1) as f64;
                (0..number).map(|i| range[0] + i as f64 * step).collect()
            }
        };
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_set_value() {
        let mut values = ContourValues::new();
        values.set_value(2, 1.5);
        assert_eq!(values.values(), &[0.0, 0.0, 1.5]);
        values.set_value(0, -1.0);
        assert_eq!(values.value(0), Some(-1.0));
        assert_eq!(values.value(3), None);
        values.set_number_of_contours(1);
        assert_eq!(values.number_of_contours(), 1);
    }

    #[test]
    fn test_generate_values() {
        let mut values = ContourValues::new();
        values.generate_values(5, [0.0, 1.0]);
        assert_eq!(values.number_of_contours(), 5);
        assert_relative_eq!(values.values()[1], 0.25);
        assert_relative_eq!(values.values()[4], 1.0);
        values.generate_values(1, [2.0, 3.0]);
        assert_eq!(values.values(), &[2.0]);
        values.generate_values(0, [2.0, 3.0]);
        assert_eq!(values.number_of_contours(), 0);
    }
}
