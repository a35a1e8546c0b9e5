//! Typed data arrays

use crate::timestamp::TimeStamp;
use crate::types::ScalarType;
use rayon::prelude::*;
use std::fmt::Debug;

/// The values of a data array
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    /// Unsigned 8-bit integers
    UInt8(Vec<u8>),
    /// Signed 32-bit integers
    Int32(Vec<i32>),
    /// Unsigned 32-bit integers
    UInt32(Vec<u32>),
    /// Signed 64-bit integers
    Int64(Vec<i64>),
    /// 32-bit floats
    Float32(Vec<f32>),
    /// 64-bit floats
    Float64(Vec<f64>),
}

/// A type that can be stored in a data array
pub trait ArrayValue:
    Copy + Send + Sync + Default + PartialOrd + Debug + num::NumCast + num::ToPrimitive + 'static
{
    /// The matching scalar type
    const SCALAR_TYPE: ScalarType;

    /// Wrap a vector of values
    fn wrap(values: Vec<Self>) -> ArrayData;

    /// The values, if the data holds this type
    fn slice(data: &ArrayData) -> Option<&[Self]>;

    /// Convert to a double
    fn as_f64(self) -> f64;
}

macro_rules! impl_array_value {
    ($t:ty, $variant:ident) => {
        impl ArrayValue for $t {
            const SCALAR_TYPE: ScalarType = ScalarType::$variant;

            fn wrap(values: Vec<Self>) -> ArrayData {
                ArrayData::$variant(values)
            }

            fn slice(data: &ArrayData) -> Option<&[Self]> {
                match data {
                    ArrayData::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn as_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_array_value!(u8, UInt8);
impl_array_value!(i32, Int32);
impl_array_value!(u32, UInt32);
impl_array_value!(i64, Int64);
impl_array_value!(f32, Float32);
impl_array_value!(f64, Float64);

/// Apply `$body` to the typed vector inside an [ArrayData], bound to `$v`
macro_rules! with_array_data {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ArrayData::UInt8($v) => $body,
            ArrayData::Int32($v) => $body,
            ArrayData::UInt32($v) => $body,
            ArrayData::Int64($v) => $body,
            ArrayData::Float32($v) => $body,
            ArrayData::Float64($v) => $body,
        }
    };
}
pub(crate) use with_array_data;

impl ArrayData {
    /// The number of values
    pub fn len(&self) -> usize {
        with_array_data!(self, v => v.len())
    }

    /// Is the data empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The type of the values
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ArrayData::UInt8(_) => ScalarType::UInt8,
            ArrayData::Int32(_) => ScalarType::Int32,
            ArrayData::UInt32(_) => ScalarType::UInt32,
            ArrayData::Int64(_) => ScalarType::Int64,
            ArrayData::Float32(_) => ScalarType::Float32,
            ArrayData::Float64(_) => ScalarType::Float64,
        }
    }

    /// A zero filled vector of the given length holding the same type
    pub fn zeros_like(&self, len: usize) -> ArrayData {
        match self {
            ArrayData::UInt8(_) => ArrayData::UInt8(vec![0; len]),
            ArrayData::Int32(_) => ArrayData::Int32(vec![0; len]),
            ArrayData::UInt32(_) => ArrayData::UInt32(vec![0; len]),
            ArrayData::Int64(_) => ArrayData::Int64(vec![0; len]),
            ArrayData::Float32(_) => ArrayData::Float32(vec![0.0; len]),
            ArrayData::Float64(_) => ArrayData::Float64(vec![0.0; len]),
        }
    }

    /// Convert double values to the type held by this data, rounding to the nearest integer for
    /// integer types
    pub fn from_f64_like(&self, values: &[f64]) -> ArrayData {
        fn cast<T: ArrayValue>(values: &[f64]) -> Vec<T> {
            values
                .iter()
                .map(|v| num::cast(*v).unwrap_or_default())
                .collect()
        }
        fn round<T: ArrayValue>(values: &[f64]) -> Vec<T> {
            values
                .iter()
                .map(|v| num::cast(v.round()).unwrap_or_default())
                .collect()
        }
        match self {
            ArrayData::UInt8(_) => ArrayData::UInt8(round(values)),
            ArrayData::Int32(_) => ArrayData::Int32(round(values)),
            ArrayData::UInt32(_) => ArrayData::UInt32(round(values)),
            ArrayData::Int64(_) => ArrayData::Int64(round(values)),
            ArrayData::Float32(_) => ArrayData::Float32(cast(values)),
            ArrayData::Float64(_) => ArrayData::Float64(values.to_vec()),
        }
    }
}

/// A named array holding a fixed number of components per tuple
#[derive(Debug, Clone)]
pub struct DataArray {
    name: String,
    components: usize,
    data: ArrayData,
    mtime: TimeStamp,
}

impl PartialEq for DataArray {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.components == other.components && self.data == other.data
    }
}

impl DataArray {
    /// Create an array
    ///
    /// The length of `data` should be a multiple of `components`; a trailing partial tuple is ignored.
    pub fn new(name: &str, components: usize, data: ArrayData) -> Self {
        debug_assert!(components > 0);
        debug_assert_eq!(data.len() % components.max(1), 0);
        Self {
            name: name.to_string(),
            components: components.max(1),
            data,
            mtime: TimeStamp::new(),
        }
    }

    /// Create an array from a vector of values
    pub fn from_vec<T: ArrayValue>(name: &str, components: usize, values: Vec<T>) -> Self {
        Self::new(name, components, T::wrap(values))
    }

    /// Create a single component array
    pub fn from_scalars<T: ArrayValue>(name: &str, values: Vec<T>) -> Self {
        Self::from_vec(name, 1, values)
    }

    /// The name of the array
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the array
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
        self.modified();
    }

    /// The number of components in each tuple
    pub fn components(&self) -> usize {
        self.components
    }

    /// The number of tuples
    pub fn number_of_tuples(&self) -> usize {
        self.data.len() / self.components
    }

    /// The type of the values
    pub fn scalar_type(&self) -> ScalarType {
        self.data.scalar_type()
    }

    /// The values
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Mutable access to the values; marks the array as modified
    pub fn data_mut(&mut self) -> &mut ArrayData {
        self.modified();
        &mut self.data
    }

    /// The values as a typed slice, if the array holds `T`
    pub fn as_slice<T: ArrayValue>(&self) -> Option<&[T]> {
        T::slice(&self.data)
    }

    /// Mark the array as modified
    pub fn modified(&self) {
        self.mtime.modified();
    }

    /// The last modification time
    pub fn mtime(&self) -> u64 {
        self.mtime.get()
    }

    /// A component of a tuple, converted to a double
    pub fn component(&self, tuple: usize, component: usize) -> f64 {
        let index = tuple * self.components + component;
        with_array_data!(&self.data, v => v[index].as_f64())
    }

    /// The (min, max) range of one component, or `None` if the array is empty
    ///
    /// NaN values are ignored.
    pub fn range(&self, component: usize) -> Option<(f64, f64)> {
        if component >= self.components {
            return None;
        }
        let ncomp = self.components;
        let (min, max) = with_array_data!(&self.data, v => v
            .par_chunks(ncomp)
            .map(|t| t[component].as_f64())
            .filter(|x| !x.is_nan())
            .fold(
                || (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), x| (lo.min(x), hi.max(x)),
            )
            .reduce(
                || (f64::INFINITY, f64::NEG_INFINITY),
                |a, b| (a.0.min(b.0), a.1.max(b.1)),
            ));
        if min > max {
            None
        } else {
            Some((min, max))
        }
    }

    /// An array with the same name, type and components holding `num_tuples` zero tuples
    pub fn new_like(&self, num_tuples: usize) -> Self {
        Self::new(
            &self.name,
            self.components,
            self.data.zeros_like(num_tuples * self.components),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_typed_access() {
        let a = DataArray::from_scalars("s", vec![1i32, -4, 7]);
        assert_eq!(a.scalar_type(), ScalarType::Int32);
        assert_eq!(a.as_slice::<i32>(), Some(&[1, -4, 7][..]));
        assert_eq!(a.as_slice::<f32>(), None);
        assert_eq!(a.number_of_tuples(), 3);
        assert_eq!(a.component(1, 0), -4.0);
    }

    #[test]
    fn test_range() {
        let a = DataArray::from_vec("v", 2, vec![0.5f32, 10.0, -2.0, 3.0, 4.0, f32::NAN]);
        assert_eq!(a.range(0), Some((-2.0, 4.0)));
        assert_eq!(a.range(1), Some((3.0, 10.0)));
        assert_eq!(a.range(2), None);
        let empty = DataArray::from_scalars::<f64>("e", vec![]);
        assert_eq!(empty.range(0), None);
    }

    #[test]
    fn test_modified() {
        let mut a = DataArray::from_scalars("s", vec![1u32, 2]);
        let before = a.mtime();
        if let ArrayData::UInt32(v) = a.data_mut() {
            v[0] = 5;
        }
        assert!(a.mtime() > before);
        assert_eq!(a.component(0, 0), 5.0);
    }

    #[test]
    fn test_new_like() {
        let a = DataArray::from_vec("v", 3, vec![1u8, 2, 3, 4, 5, 6]);
        let b = a.new_like(4);
        assert_eq!(b.name(), "v");
        assert_eq!(b.components(), 3);
        assert_eq!(b.number_of_tuples(), 4);
        assert_eq!(b.scalar_type(), ScalarType::UInt8);
    }

    #[test]
    fn test_from_f64_like() {
        let a = ArrayData::Int32(vec![]);
        assert_eq!(
            a.from_f64_like(&[1.7, -2.2, 2.5, 0.4]),
            ArrayData::Int32(vec![2, -2, 3, 0])
        );
        let b = ArrayData::UInt8(vec![]);
        assert_eq!(b.from_f64_like(&[4.5, 254.6]), ArrayData::UInt8(vec![5, 255]));
        let c = ArrayData::Float32(vec![]);
        assert_eq!(c.from_f64_like(&[1.25]), ArrayData::Float32(vec![1.25]));
    }
}
