//! Fixed-rank native arrays.

use std::marker::PhantomData;

use tensile_core::{Result, Shape, TensorError};

use crate::element::{Element, View};

/// A dense row-major array of element type `T` with exactly `R` axes.
///
/// `R` is fixed at the type level, which is what makes `MatrixF` and
/// `Tensor3F` different types. The shape is always validated: `R` axes,
/// each of positive size, and `data.len() == shape.numel()`.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeArray<T, const R: usize> {
    shape: Shape,
    data: Vec<T>,
    _rank: PhantomData<[(); R]>,
}

pub type VectorI = NativeArray<i32, 1>;
pub type VectorF = NativeArray<f32, 1>;
pub type MatrixI = NativeArray<i32, 2>;
pub type MatrixF = NativeArray<f32, 2>;
pub type Tensor3I = NativeArray<i32, 3>;
pub type Tensor3F = NativeArray<f32, 3>;
pub type Tensor4I = NativeArray<i32, 4>;
pub type Tensor4F = NativeArray<f32, 4>;

impl<T: Element, const R: usize> NativeArray<T, R> {
    /// Build an array from a row-major buffer.
    pub fn new(dims: [usize; R], data: Vec<T>) -> Result<Self> {
        Self::from_parts(Shape::new(&dims)?, data)
    }

    /// Zero-filled array of the given shape.
    pub fn zeros(dims: [usize; R]) -> Result<Self> {
        let shape = Shape::new(&dims)?;
        let data = vec![T::zero(); shape.numel()];
        Self::from_parts(shape, data)
    }

    pub(crate) fn from_parts(shape: Shape, data: Vec<T>) -> Result<Self> {
        if shape.ndim() != R {
            return Err(TensorError::InvalidConstruction(format!(
                "shape {shape} has {} axes, expected {R}",
                shape.ndim()
            )));
        }
        if data.len() != shape.numel() {
            return Err(TensorError::InvalidConstruction(format!(
                "buffer of {} elements does not fill shape {shape}",
                data.len()
            )));
        }
        Ok(Self {
            shape,
            data,
            _rank: PhantomData,
        })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Raw bytes of the buffer, native endianness.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn view(&self) -> View<'_, T> {
        View {
            shape: &self.shape,
            data: &self.data,
        }
    }

    /// Element at full coordinates.
    pub fn get(&self, coords: [usize; R]) -> Result<T> {
        let offset = self.shape.offset_of(&coords)?;
        Ok(self.data[offset])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_get() {
        let m = MatrixF::new([2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.shape(), &[2, 3]);
        assert_eq!(m.numel(), 6);
        assert_eq!(m.get([1, 2]).unwrap(), 6.0);
        assert_eq!(m.get([0, 1]).unwrap(), 2.0);
        assert!(matches!(
            m.get([2, 0]),
            Err(TensorError::IndexOutOfBounds { axis: 0, index: 2, size: 2 })
        ));
    }

    #[test]
    fn test_zeros() {
        let t = Tensor4I::zeros([1, 2, 3, 4]).unwrap();
        assert_eq!(t.numel(), 24);
        assert!(t.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_buffer_must_fill_shape() {
        assert!(matches!(
            VectorI::new([3], vec![1, 2]),
            Err(TensorError::InvalidConstruction(_))
        ));
        assert!(matches!(
            MatrixI::zeros([0, 2]),
            Err(TensorError::InvalidConstruction(_))
        ));
    }

    #[test]
    fn test_rank_is_enforced() {
        let shape = Shape::new(&[2, 2]).unwrap();
        assert!(matches!(
            Tensor3F::from_parts(shape, vec![0.0; 4]),
            Err(TensorError::InvalidConstruction(_))
        ));
    }

    #[test]
    fn test_as_bytes() {
        let v = VectorI::new([2], vec![1, 2]).unwrap();
        assert_eq!(v.as_bytes().len(), 8);
    }
}
