//! The tensor facade.

use std::fmt;
use std::ops::{Add, Mul};

use ndarray::{ArrayViewD, IxDyn};
use smallvec::SmallVec;

use tensile_core::{ConcreteKind, ElementKind, Rank, Result, Scalar, Shape, TensorError};
use tensile_kernels::{Instance, NativeIndexed, Op};

use crate::dispatch::{self, Operand};
use crate::ingest::{self, Data, DenseArray};

/// A tensor of rank 1..=4 holding `Int32` or `Float32` elements.
///
/// Owns exactly one native [`Instance`]. Tensors are immutable: every
/// operation returns a new tensor backed by a new instance.
///
/// ```
/// use tensile::{Indexed, Scalar, Tensor};
///
/// let t = Tensor::from_data(vec![vec![1i32, 2], vec![3, 4]]).unwrap();
/// assert_eq!(t.shape(), &[2, 2]);
/// assert_eq!(t.to_string(), "Tensor((2, 2))");
///
/// let doubled = (&t * 2i32).unwrap();
/// assert_eq!(doubled.index([1, 1]).unwrap(), Indexed::Scalar(Scalar::Int32(8)));
/// ```
#[derive(Clone, PartialEq)]
pub struct Tensor {
    kind: ConcreteKind,
    instance: Instance,
}

/// Coordinates for [`Tensor::index`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Index {
    /// A bare integer, only valid on rank-1 tensors.
    Int(usize),
    /// A coordinate tuple.
    Coords(SmallVec<[usize; 4]>),
}

impl From<usize> for Index {
    fn from(i: usize) -> Self {
        Index::Int(i)
    }
}

impl<const N: usize> From<[usize; N]> for Index {
    fn from(coords: [usize; N]) -> Self {
        Index::Coords(SmallVec::from_slice(&coords))
    }
}

impl From<&[usize]> for Index {
    fn from(coords: &[usize]) -> Self {
        Index::Coords(SmallVec::from_slice(coords))
    }
}

impl From<Vec<usize>> for Index {
    fn from(coords: Vec<usize>) -> Self {
        Index::Coords(SmallVec::from_vec(coords))
    }
}

/// Result of indexing: one element, or a lower-rank tensor.
#[derive(Debug, Clone, PartialEq)]
pub enum Indexed {
    Scalar(Scalar),
    Tensor(Tensor),
}

impl Indexed {
    pub fn scalar(self) -> Option<Scalar> {
        match self {
            Indexed::Scalar(s) => Some(s),
            Indexed::Tensor(_) => None,
        }
    }

    pub fn tensor(self) -> Option<Tensor> {
        match self {
            Indexed::Tensor(t) => Some(t),
            Indexed::Scalar(_) => None,
        }
    }
}

/// Borrowed dense view over a tensor's buffer.
#[derive(Debug, Clone)]
pub enum ExportView<'a> {
    I32(ArrayViewD<'a, i32>),
    F32(ArrayViewD<'a, f32>),
}

impl<'a> ExportView<'a> {
    pub fn shape(&self) -> &[usize] {
        match self {
            ExportView::I32(v) => v.shape(),
            ExportView::F32(v) => v.shape(),
        }
    }

    pub fn as_i32(&self) -> Option<&ArrayViewD<'a, i32>> {
        match self {
            ExportView::I32(v) => Some(v),
            ExportView::F32(_) => None,
        }
    }

    pub fn as_f32(&self) -> Option<&ArrayViewD<'a, f32>> {
        match self {
            ExportView::F32(v) => Some(v),
            ExportView::I32(_) => None,
        }
    }
}

impl Tensor {
    /// Build a tensor from data or from an explicit shape.
    ///
    /// Exactly one is needed. A shape builds a zero-filled Float32 tensor
    /// and takes precedence over `data`.
    pub fn new(data: Option<Data>, shape: Option<&[usize]>) -> Result<Tensor> {
        let normalized = ingest::normalize(data, shape)?;
        Ok(Tensor {
            kind: normalized.kind,
            instance: normalized.buffer,
        })
    }

    /// Build a tensor from data: a native instance, a dense array, a nested
    /// literal or a bare scalar.
    pub fn from_data(data: impl Into<Data>) -> Result<Tensor> {
        Tensor::new(Some(data.into()), None)
    }

    /// Zero-filled Float32 tensor.
    pub fn zeros(shape: &[usize]) -> Result<Tensor> {
        Tensor::new(None, Some(shape))
    }

    /// Wrap a native instance.
    pub fn from_instance(instance: Instance) -> Tensor {
        Tensor {
            kind: instance.kind(),
            instance,
        }
    }

    pub fn shape(&self) -> &Shape {
        self.instance.shape()
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.instance.shape().ndim()
    }

    pub fn dtype(&self) -> ElementKind {
        self.kind.element
    }

    pub fn kind(&self) -> ConcreteKind {
        self.kind
    }

    pub fn numel(&self) -> usize {
        self.instance.numel()
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn into_instance(self) -> Instance {
        self.instance
    }

    /// Reverse the axis order. Vectors come back unchanged.
    pub fn transpose(&self) -> Result<Tensor> {
        dispatch::unary(Op::Transpose, &self.instance).map(Tensor::from_instance)
    }

    /// Reshape to `new_shape` (1..=4 axes).
    ///
    /// `-1` is only understood on axis 0, where it keeps the current
    /// first-axis size.
    pub fn reshape(&self, new_shape: &[i64]) -> Result<Tensor> {
        Rank::new(new_shape.len())?;
        let mut target: SmallVec<[i64; 4]> = SmallVec::from_slice(new_shape);
        if target[0] == -1 {
            target[0] = self.shape().dims()[0] as i64;
        }
        dispatch::reshape(&self.instance, &target).map(Tensor::from_instance)
    }

    /// Index with a bare integer (rank 1 only) or a coordinate tuple.
    ///
    /// Full coordinates give a [`Scalar`]; a prefix on a rank-3 or rank-4
    /// tensor gives the addressed sub-tensor.
    pub fn index(&self, index: impl Into<Index>) -> Result<Indexed> {
        let coords = match index.into() {
            Index::Int(i) if self.rank() == 1 => SmallVec::from_slice(&[i]),
            Index::Int(_) => {
                return Err(TensorError::IndexArityMismatch {
                    rank: self.rank(),
                    got: 1,
                })
            }
            Index::Coords(coords) => coords,
        };
        Ok(match self.instance.index(&coords)? {
            NativeIndexed::Scalar(s) => Indexed::Scalar(s),
            NativeIndexed::Block(block) => Indexed::Tensor(Tensor::from_instance(block)),
        })
    }

    pub fn add<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Tensor> {
        dispatch::binary(Op::Add, &self.instance, other.into().to_native())
            .map(Tensor::from_instance)
    }

    pub fn multiply<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Tensor> {
        dispatch::binary(Op::Multiply, &self.instance, other.into().to_native())
            .map(Tensor::from_instance)
    }

    /// Matrix product through the generic dot kernel.
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor> {
        dispatch::dot(&self.instance, &other.instance).map(Tensor::from_instance)
    }

    /// Borrow the buffer as an `ndarray` view with this tensor's shape.
    pub fn export_view(&self) -> Result<ExportView<'_>> {
        let dims = IxDyn(self.shape().dims());
        let view = match self.dtype() {
            ElementKind::Int32 => {
                ExportView::I32(view_of(dims, self.instance.as_i32_slice())?)
            }
            ElementKind::Float32 => {
                ExportView::F32(view_of(dims, self.instance.as_f32_slice())?)
            }
        };
        Ok(view)
    }

    /// Owned dense copy of the buffer.
    pub fn to_dense(&self) -> Result<DenseArray> {
        Ok(match self.export_view()? {
            ExportView::I32(v) => DenseArray::I32(v.to_owned()),
            ExportView::F32(v) => DenseArray::F32(v.to_owned()),
        })
    }
}

fn view_of<T>(dims: IxDyn, data: Option<&[T]>) -> Result<ArrayViewD<'_, T>> {
    let data = data.ok_or_else(|| {
        TensorError::InvalidConstruction("instance does not match its recorded kind".into())
    })?;
    ArrayViewD::from_shape(dims, data)
        .map_err(|e| TensorError::InvalidConstruction(e.to_string()))
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor({})", self.shape())
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tensor(shape={}, dtype={}, kind={})",
            self.shape(),
            self.dtype(),
            self.kind
        )
    }
}

// Operator sugar. Every operator returns `Result<Tensor>` since the operand
// combination may have no kernel.

impl<'b> Add<&'b Tensor> for &Tensor {
    type Output = Result<Tensor>;

    fn add(self, rhs: &'b Tensor) -> Result<Tensor> {
        Tensor::add(self, rhs)
    }
}

impl<'b> Mul<&'b Tensor> for &Tensor {
    type Output = Result<Tensor>;

    fn mul(self, rhs: &'b Tensor) -> Result<Tensor> {
        Tensor::multiply(self, rhs)
    }
}

macro_rules! scalar_ops {
    ($($t:ty),*) => {
        $(
            impl Add<$t> for &Tensor {
                type Output = Result<Tensor>;

                fn add(self, rhs: $t) -> Result<Tensor> {
                    Tensor::add(self, rhs)
                }
            }

            impl Mul<$t> for &Tensor {
                type Output = Result<Tensor>;

                fn mul(self, rhs: $t) -> Result<Tensor> {
                    Tensor::multiply(self, rhs)
                }
            }

            impl Add<&Tensor> for $t {
                type Output = Result<Tensor>;

                fn add(self, rhs: &Tensor) -> Result<Tensor> {
                    Tensor::add(rhs, self)
                }
            }

            impl Mul<&Tensor> for $t {
                type Output = Result<Tensor>;

                fn mul(self, rhs: &Tensor) -> Result<Tensor> {
                    Tensor::multiply(rhs, self)
                }
            }
        )*
    };
}

scalar_ops!(i32, i64, f32, f64, Scalar);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_debug() {
        let t = Tensor::zeros(&[2, 2]).unwrap();
        assert_eq!(t.to_string(), "Tensor((2, 2))");
        assert_eq!(
            format!("{t:?}"),
            "Tensor(shape=(2, 2), dtype=float32, kind=MatrixF)"
        );
        let v = Tensor::from_data(vec![1i32, 2, 3]).unwrap();
        assert_eq!(v.to_string(), "Tensor((3,))");
    }

    #[test]
    fn test_accessors() {
        let t = Tensor::zeros(&[2, 3, 4]).unwrap();
        assert_eq!(t.rank(), 3);
        assert_eq!(t.dtype(), ElementKind::Float32);
        assert_eq!(t.kind(), ConcreteKind::TENSOR3_F);
        assert_eq!(t.numel(), 24);
        assert_eq!(t.instance().kind(), ConcreteKind::TENSOR3_F);
        assert_eq!(t.into_instance().numel(), 24);
    }

    #[test]
    fn test_bare_int_index_rank1_only() {
        let v = Tensor::from_data(vec![5i32, 6, 7]).unwrap();
        assert_eq!(v.index(2).unwrap(), Indexed::Scalar(Scalar::Int32(7)));

        let m = Tensor::zeros(&[2, 2]).unwrap();
        assert_eq!(
            m.index(0),
            Err(TensorError::IndexArityMismatch { rank: 2, got: 1 })
        );
    }

    #[test]
    fn test_reshape_rank_limits() {
        let t = Tensor::zeros(&[4]).unwrap();
        assert_eq!(t.reshape(&[]), Err(TensorError::UnsupportedRank { rank: 0 }));
        assert_eq!(
            t.reshape(&[1, 1, 1, 2, 2]),
            Err(TensorError::UnsupportedRank { rank: 5 })
        );
    }

    #[test]
    fn test_scalar_on_the_left() {
        let t = Tensor::from_data(vec![1.0f32, 2.0]).unwrap();
        let a = (2.0f32 * &t).unwrap();
        let b = (&t * 2.0f32).unwrap();
        assert_eq!(a, b);
        let c = (1i32 + &t).unwrap();
        let view = c.export_view().unwrap();
        assert_eq!(view.as_f32().unwrap().as_slice().unwrap(), &[2.0, 3.0]);
    }

    #[test]
    fn test_tensor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Tensor>();
    }
}
