//! Element types a native array can hold.

use std::fmt;

use tensile_core::{ElementKind, Rank, Result, Scalar, Shape, TensorError};

use crate::array::NativeArray;
use crate::instance::Instance;

/// Borrowed shape and row-major buffer of one instance.
#[derive(Debug, Clone, Copy)]
pub struct View<'a, T> {
    pub shape: &'a Shape,
    pub data: &'a [T],
}

/// A native element type: `i32` or `f32`.
///
/// Ties the Rust type to its [`ElementKind`] and to the instance variants
/// holding it, so kernels can be written once over `T` and still produce
/// the right concrete kind.
pub trait Element:
    bytemuck::Pod + PartialOrd + fmt::Debug + Default + Send + Sync + 'static
{
    const KIND: ElementKind;

    fn zero() -> Self {
        Self::default()
    }

    /// Elementwise addition. Integer kinds wrap on overflow.
    fn add(self, rhs: Self) -> Self;

    /// Elementwise multiplication. Integer kinds wrap on overflow.
    fn mul(self, rhs: Self) -> Self;

    fn into_scalar(self) -> Scalar;

    /// Convert a scalar operand, or `None` if it would not be exact.
    fn from_scalar(scalar: Scalar) -> Option<Self>;

    /// Wrap a validated shape and buffer in the matching instance variant.
    fn build(shape: Shape, data: Vec<Self>) -> Result<Instance>;

    /// Borrow an instance holding this element type.
    fn view(instance: &Instance) -> Result<View<'_, Self>>;
}

impl Element for i32 {
    const KIND: ElementKind = ElementKind::Int32;

    fn add(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }

    fn mul(self, rhs: Self) -> Self {
        self.wrapping_mul(rhs)
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Int32(self)
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        scalar.as_i32()
    }

    fn build(shape: Shape, data: Vec<Self>) -> Result<Instance> {
        Ok(match shape.rank() {
            Rank::One => Instance::VectorI(NativeArray::from_parts(shape, data)?),
            Rank::Two => Instance::MatrixI(NativeArray::from_parts(shape, data)?),
            Rank::Three => Instance::Tensor3I(NativeArray::from_parts(shape, data)?),
            Rank::Four => Instance::Tensor4I(NativeArray::from_parts(shape, data)?),
        })
    }

    fn view(instance: &Instance) -> Result<View<'_, Self>> {
        match instance {
            Instance::VectorI(a) => Ok(a.view()),
            Instance::MatrixI(a) => Ok(a.view()),
            Instance::Tensor3I(a) => Ok(a.view()),
            Instance::Tensor4I(a) => Ok(a.view()),
            other => Err(TensorError::IncompatibleDtype {
                expected: Self::KIND,
                got: other.element_kind(),
            }),
        }
    }
}

impl Element for f32 {
    const KIND: ElementKind = ElementKind::Float32;

    fn add(self, rhs: Self) -> Self {
        self + rhs
    }

    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Float32(self)
    }

    /// Integer scalars promote into float arrays.
    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::Float32(v) => Some(v),
            Scalar::Int32(v) => Some(v as f32),
        }
    }

    fn build(shape: Shape, data: Vec<Self>) -> Result<Instance> {
        Ok(match shape.rank() {
            Rank::One => Instance::VectorF(NativeArray::from_parts(shape, data)?),
            Rank::Two => Instance::MatrixF(NativeArray::from_parts(shape, data)?),
            Rank::Three => Instance::Tensor3F(NativeArray::from_parts(shape, data)?),
            Rank::Four => Instance::Tensor4F(NativeArray::from_parts(shape, data)?),
        })
    }

    fn view(instance: &Instance) -> Result<View<'_, Self>> {
        match instance {
            Instance::VectorF(a) => Ok(a.view()),
            Instance::MatrixF(a) => Ok(a.view()),
            Instance::Tensor3F(a) => Ok(a.view()),
            Instance::Tensor4F(a) => Ok(a.view()),
            other => Err(TensorError::IncompatibleDtype {
                expected: Self::KIND,
                got: other.element_kind(),
            }),
        }
    }
}
