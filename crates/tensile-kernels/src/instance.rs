//! The closed set of native array kinds.

use tensile_core::{ConcreteKind, ElementKind, Rank, Result, Scalar, Shape, TensorError};

use crate::array::{
    MatrixF, MatrixI, Tensor3F, Tensor3I, Tensor4F, Tensor4I, VectorF, VectorI,
};
use crate::element::Element;
use crate::kernels::layout;

/// Apply `$body` to the array held by any variant.
macro_rules! each_variant {
    ($inst:expr, $a:ident => $body:expr) => {
        match $inst {
            Instance::VectorI($a) => $body,
            Instance::VectorF($a) => $body,
            Instance::MatrixI($a) => $body,
            Instance::MatrixF($a) => $body,
            Instance::Tensor3I($a) => $body,
            Instance::Tensor3F($a) => $body,
            Instance::Tensor4I($a) => $body,
            Instance::Tensor4F($a) => $body,
        }
    };
}

/// One native array, whichever of the eight kinds it is.
#[derive(Debug, Clone, PartialEq)]
pub enum Instance {
    VectorI(VectorI),
    VectorF(VectorF),
    MatrixI(MatrixI),
    MatrixF(MatrixF),
    Tensor3I(Tensor3I),
    Tensor3F(Tensor3F),
    Tensor4I(Tensor4I),
    Tensor4F(Tensor4F),
}

/// What indexing an instance yields.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeIndexed {
    /// Full coordinates address one element.
    Scalar(Scalar),
    /// A coordinate prefix addresses a lower-rank sub-block (copied).
    Block(Instance),
}

impl Instance {
    /// Build an instance from a row-major buffer. The element type and the
    /// shape's rank pick the variant.
    pub fn from_vec<T: Element>(shape: Shape, data: Vec<T>) -> Result<Instance> {
        T::build(shape, data)
    }

    /// Zero-initialised instance of `kind`.
    pub fn zeros(kind: ConcreteKind, shape: &Shape) -> Result<Instance> {
        if shape.rank() != kind.rank {
            return Err(TensorError::InvalidConstruction(format!(
                "shape {shape} does not have the rank of {kind}"
            )));
        }
        let numel = shape.numel();
        match kind.element {
            ElementKind::Int32 => i32::build(shape.clone(), vec![0; numel]),
            ElementKind::Float32 => f32::build(shape.clone(), vec![0.0; numel]),
        }
    }

    pub fn kind(&self) -> ConcreteKind {
        ConcreteKind::new(self.rank(), self.element_kind())
    }

    pub fn element_kind(&self) -> ElementKind {
        match self {
            Instance::VectorI(_)
            | Instance::MatrixI(_)
            | Instance::Tensor3I(_)
            | Instance::Tensor4I(_) => ElementKind::Int32,
            Instance::VectorF(_)
            | Instance::MatrixF(_)
            | Instance::Tensor3F(_)
            | Instance::Tensor4F(_) => ElementKind::Float32,
        }
    }

    pub fn rank(&self) -> Rank {
        self.shape().rank()
    }

    pub fn shape(&self) -> &Shape {
        each_variant!(self, a => a.shape())
    }

    pub fn numel(&self) -> usize {
        each_variant!(self, a => a.numel())
    }

    pub fn as_i32_slice(&self) -> Option<&[i32]> {
        i32::view(self).ok().map(|v| v.data)
    }

    pub fn as_f32_slice(&self) -> Option<&[f32]> {
        f32::view(self).ok().map(|v| v.data)
    }

    /// Raw bytes of the buffer, native endianness.
    pub fn as_bytes(&self) -> &[u8] {
        each_variant!(self, a => a.as_bytes())
    }

    /// Element at full coordinates.
    pub fn get(&self, coords: &[usize]) -> Result<Scalar> {
        let rank = self.shape().ndim();
        if coords.len() != rank {
            return Err(TensorError::IndexArityMismatch {
                rank,
                got: coords.len(),
            });
        }
        let offset = self.shape().offset_of(coords)?;
        Ok(each_variant!(self, a => a.as_slice()[offset].into_scalar()))
    }

    /// Index with full coordinates or, on rank 3 and 4, a coordinate prefix.
    ///
    /// A prefix of length `k` on a rank-`r` instance returns a copy of the
    /// rank-`(r - k)` block it addresses. Vectors and matrices only accept
    /// full coordinates.
    pub fn index(&self, coords: &[usize]) -> Result<NativeIndexed> {
        let rank = self.shape().ndim();
        if coords.len() == rank {
            return self.get(coords).map(NativeIndexed::Scalar);
        }
        if coords.is_empty() || coords.len() > rank || rank < 3 {
            return Err(TensorError::IndexArityMismatch {
                rank,
                got: coords.len(),
            });
        }
        let block = match self.element_kind() {
            ElementKind::Int32 => sub_block::<i32>(self, coords)?,
            ElementKind::Float32 => sub_block::<f32>(self, coords)?,
        };
        Ok(NativeIndexed::Block(block))
    }

    pub fn reshape1(&self, dims: [i64; 1]) -> Result<Instance> {
        layout::reshape(self, &dims)
    }

    pub fn reshape2(&self, dims: [i64; 2]) -> Result<Instance> {
        layout::reshape(self, &dims)
    }

    pub fn reshape3(&self, dims: [i64; 3]) -> Result<Instance> {
        layout::reshape(self, &dims)
    }

    pub fn reshape4(&self, dims: [i64; 4]) -> Result<Instance> {
        layout::reshape(self, &dims)
    }
}

fn sub_block<T: Element>(instance: &Instance, prefix: &[usize]) -> Result<Instance> {
    let view = T::view(instance)?;
    let offset = view.shape.offset_of(prefix)?;
    let shape = Shape::new(&view.shape.dims()[prefix.len()..])?;
    let len = shape.numel();
    T::build(shape, view.data[offset..offset + len].to_vec())
}
