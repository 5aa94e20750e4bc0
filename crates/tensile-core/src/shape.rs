use smallvec::SmallVec;
use std::fmt;

use crate::rank::Rank;
use crate::{Result, TensorError};

/// Axis sizes of a native array.
///
/// Stack-allocated for up to four dimensions, which is every shape this
/// library can hold: a `Shape` always has 1..=4 axes, each of positive size.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<usize>", into = "Vec<usize>")
)]
pub struct Shape {
    dims: SmallVec<[usize; 4]>,
}

impl Shape {
    /// Create a shape, validating rank and axis sizes.
    pub fn new(dims: &[usize]) -> Result<Self> {
        Rank::new(dims.len())?;
        if let Some(axis) = dims.iter().position(|&d| d == 0) {
            return Err(TensorError::InvalidConstruction(format!(
                "axis {axis} of shape {dims:?} has size 0"
            )));
        }
        if dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)).is_none() {
            return Err(TensorError::InvalidConstruction(format!(
                "element count of shape {dims:?} overflows usize"
            )));
        }
        Ok(Self {
            dims: SmallVec::from_slice(dims),
        })
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Number of dimensions as a [`Rank`].
    pub fn rank(&self) -> Rank {
        match self.dims.len() {
            1 => Rank::One,
            2 => Rank::Two,
            3 => Rank::Three,
            _ => Rank::Four,
        }
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Get dimension sizes as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Get size of a specific dimension.
    pub fn dim(&self, axis: usize) -> Option<usize> {
        self.dims.get(axis).copied()
    }

    /// Default strides for a contiguous row-major layout.
    pub fn contiguous_strides(&self) -> SmallVec<[usize; 4]> {
        let ndim = self.dims.len();
        let mut strides = SmallVec::from_elem(0usize, ndim);
        strides[ndim - 1] = 1;
        for i in (0..ndim - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Row-major offset of the block addressed by a coordinate prefix.
    ///
    /// `coords` may be shorter than the rank; the result is then the offset
    /// of the first element of the addressed sub-block.
    pub fn offset_of(&self, coords: &[usize]) -> Result<usize> {
        if coords.len() > self.ndim() {
            return Err(TensorError::IndexArityMismatch {
                rank: self.ndim(),
                got: coords.len(),
            });
        }
        let strides = self.contiguous_strides();
        let mut offset = 0;
        for (axis, (&index, &size)) in coords.iter().zip(self.dims.iter()).enumerate() {
            if index >= size {
                return Err(TensorError::IndexOutOfBounds { axis, index, size });
            }
            offset += index * strides[axis];
        }
        Ok(offset)
    }

    /// Shape with the axis order reversed.
    pub fn reversed(&self) -> Shape {
        let mut dims = self.dims.clone();
        dims.reverse();
        Shape { dims }
    }

    /// Shape with one axis removed, or `None` when that would leave no axes.
    pub fn without_axis(&self, axis: usize) -> Option<Shape> {
        if axis >= self.ndim() || self.ndim() == 1 {
            return None;
        }
        let mut dims = self.dims.clone();
        dims.remove(axis);
        Some(Shape { dims })
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({:?})", self.dims.as_slice())
    }
}

/// Tuple notation: `(2, 3)`, and `(6,)` for a single axis.
impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        if self.dims.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

impl TryFrom<&[usize]> for Shape {
    type Error = TensorError;

    fn try_from(dims: &[usize]) -> Result<Self> {
        Shape::new(dims)
    }
}

impl TryFrom<Vec<usize>> for Shape {
    type Error = TensorError;

    fn try_from(dims: Vec<usize>) -> Result<Self> {
        Shape::new(&dims)
    }
}

impl From<Shape> for Vec<usize> {
    fn from(shape: Shape) -> Vec<usize> {
        shape.dims.to_vec()
    }
}

impl PartialEq<[usize]> for Shape {
    fn eq(&self, other: &[usize]) -> bool {
        self.dims() == other
    }
}

impl<const N: usize> PartialEq<[usize; N]> for Shape {
    fn eq(&self, other: &[usize; N]) -> bool {
        self.dims() == other.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_shape() {
        let s = Shape::new(&[2, 3, 4]).unwrap();
        assert_eq!(s.ndim(), 3);
        assert_eq!(s.rank(), Rank::Three);
        assert_eq!(s.numel(), 24);
        assert_eq!(s.dim(0), Some(2));
        assert_eq!(s.dim(2), Some(4));
        assert_eq!(s.dim(3), None);
    }

    #[test]
    fn test_rejects_bad_rank() {
        assert_eq!(Shape::new(&[]), Err(TensorError::UnsupportedRank { rank: 0 }));
        assert_eq!(
            Shape::new(&[1, 1, 1, 1, 1]),
            Err(TensorError::UnsupportedRank { rank: 5 })
        );
    }

    #[test]
    fn test_rejects_zero_axis() {
        assert!(matches!(
            Shape::new(&[2, 0]),
            Err(TensorError::InvalidConstruction(_))
        ));
    }

    #[test]
    fn test_rejects_overflowing_numel() {
        assert!(matches!(
            Shape::new(&[1 << 40, 1 << 40]),
            Err(TensorError::InvalidConstruction(_))
        ));
        assert!(matches!(
            Shape::new(&[usize::MAX, 2]),
            Err(TensorError::InvalidConstruction(_))
        ));
        assert_eq!(Shape::new(&[usize::MAX]).unwrap().numel(), usize::MAX);
    }

    #[test]
    fn test_contiguous_strides() {
        let s = Shape::new(&[2, 3, 4]).unwrap();
        assert_eq!(s.contiguous_strides().as_slice(), &[12, 4, 1]);
    }

    #[test]
    fn test_offset_of() {
        let s = Shape::new(&[2, 3, 4]).unwrap();
        assert_eq!(s.offset_of(&[1, 2, 3]).unwrap(), 23);
        assert_eq!(s.offset_of(&[1]).unwrap(), 12);
        assert_eq!(
            s.offset_of(&[0, 3]),
            Err(TensorError::IndexOutOfBounds { axis: 1, index: 3, size: 3 })
        );
        assert_eq!(
            s.offset_of(&[0, 0, 0, 0]),
            Err(TensorError::IndexArityMismatch { rank: 3, got: 4 })
        );
    }

    #[test]
    fn test_reversed_and_without_axis() {
        let s = Shape::new(&[2, 3, 4]).unwrap();
        assert_eq!(s.reversed(), [4, 3, 2]);
        assert_eq!(s.without_axis(1).unwrap(), [2, 4]);
        assert!(Shape::new(&[5]).unwrap().without_axis(0).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::new(&[2, 2]).unwrap().to_string(), "(2, 2)");
        assert_eq!(Shape::new(&[6]).unwrap().to_string(), "(6,)");
    }
}
