//! # tensile-kernels
//!
//! Reference CPU implementation of the native array layer.
//!
//! Provides:
//! - `NativeArray<T, R>` and the eight concrete kinds (`VectorI` .. `Tensor4F`)
//! - `Instance`, the closed sum over those kinds, with indexing and reshape
//! - Elementwise, linear-algebra, math, reduction and layout kernels
//!   (rayon-parallel for large buffers behind the `parallel` feature)
//! - The static kernel registry keyed by operation and operand kinds

pub mod array;
pub mod element;
pub mod instance;
pub mod kernels;
pub mod registry;

pub use array::{
    MatrixF, MatrixI, NativeArray, Tensor3F, Tensor3I, Tensor4F, Tensor4I, VectorF, VectorI,
};
pub use element::{Element, View};
pub use instance::{Instance, NativeIndexed};
pub use registry::{lookup, Kernel, KernelKey, NativeOperand, Op, OperandTag};
