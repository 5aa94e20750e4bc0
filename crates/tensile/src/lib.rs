//! # tensile
//!
//! One tensor type over eight native fixed-rank array kinds
//! (ranks 1..=4 × `Int32`/`Float32`).
//!
//! Provides:
//! - Ingestion of nested literals, `ndarray` arrays, raw byte buffers and
//!   scalars, with 64-bit storage narrowed to 32 bits
//! - The `Tensor` facade: indexing, reshape, transpose, matmul, arithmetic
//! - Operation dispatch through a static kernel registry
//! - Functional helpers (`log`, `exp`, `pow`, `sum`, `argmax`, `flatten`)

pub mod dispatch;
pub mod functional;
pub mod ingest;
pub mod prelude;
pub mod tensor;

pub use dispatch::Operand;
pub use ingest::{normalize, Data, DenseArray, Nested, Normalized, RawBuffer};
pub use tensor::{ExportView, Index, Indexed, Tensor};

pub use tensile_core::{
    resolve, ConcreteKind, ElementKind, KindHint, Rank, Result, Scalar, Shape, StorageType,
    TensorError,
};
pub use tensile_kernels::{Instance, KernelKey, Op, OperandTag};

/// Kernel registry, for probing whether a combination is supported.
pub mod registry {
    pub use tensile_kernels::registry::{lookup, Kernel, KernelKey, Op, OperandTag};
}
