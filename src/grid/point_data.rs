//! Arrays attached to the points of a dataset

use crate::grid::DataArray;

/// A set of named point arrays with designated scalars and normals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointData {
    arrays: Vec<DataArray>,
    scalars: Option<usize>,
    normals: Option<usize>,
}

impl PointData {
    /// Create empty point data
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an array, replacing any array with the same name. Returns the index of the array.
    pub fn add_array(&mut self, array: DataArray) -> usize {
        if let Some(index) = self.index_of(array.name()) {
            self.arrays[index] = array;
            index
        } else {
            self.arrays.push(array);
            self.arrays.len() - 1
        }
    }

    /// Add an array and make it the active scalars
    pub fn set_scalars(&mut self, array: DataArray) {
        self.scalars = Some(self.add_array(array));
    }

    /// Add an array and make it the active normals
    pub fn set_normals(&mut self, array: DataArray) {
        self.normals = Some(self.add_array(array));
    }

    /// Make the named array the active scalars. Returns false if there is no such array.
    pub fn set_active_scalars(&mut self, name: &str) -> bool {
        match self.index_of(name) {
            Some(index) => {
                self.scalars = Some(index);
                true
            }
            None => false,
        }
    }

    /// The active scalars
    pub fn scalars(&self) -> Option<&DataArray> {
        self.scalars.map(|i| &self.arrays[i])
    }

    /// The active normals
    pub fn normals(&self) -> Option<&DataArray> {
        self.normals.map(|i| &self.arrays[i])
    }

    /// The index of the named array
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.arrays.iter().position(|a| a.name() == name)
    }

    /// Get an array by name
    pub fn array(&self, name: &str) -> Option<&DataArray> {
        self.index_of(name).map(|i| &self.arrays[i])
    }

    /// All arrays
    pub fn arrays(&self) -> &[DataArray] {
        &self.arrays
    }

    /// Mutable access to an array by name
    pub fn array_mut(&mut self, name: &str) -> Option<&mut DataArray> {
        self.index_of(name).map(move |i| &mut self.arrays[i])
    }

    /// Remove an array by name, returning it
    pub fn remove_array(&mut self, name: &str) -> Option<DataArray> {
        let index = self.index_of(name)?;
        let fix = |slot: &mut Option<usize>| {
            *slot = match *slot {
                Some(i) if i == index => None,
                Some(i) if i > index => Some(i - 1),
                other => other,
            }
        };
        fix(&mut self.scalars);
        fix(&mut self.normals);
        Some(self.arrays.remove(index))
    }

    /// The number of arrays
    pub fn number_of_arrays(&self) -> usize {
        self.arrays.len()
    }

    /// Are there no arrays?
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}
