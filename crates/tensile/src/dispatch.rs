//! Operation dispatcher.
//!
//! Builds a [`KernelKey`] from the operation and its operands, looks it up
//! in the static registry and calls the kernel. A miss is reported as
//! `UnknownOperation` naming the rendered key. Nothing is cached.

use tracing::trace;

use tensile_core::{Rank, Result, Scalar, TensorError};
use tensile_kernels::{lookup, Instance, Kernel, KernelKey, NativeOperand, Op, OperandTag};

use crate::tensor::Tensor;

/// Right-hand side of `add` / `multiply`: another tensor or a bare scalar.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Tensor(&'a Tensor),
    Scalar(Scalar),
}

impl<'a> Operand<'a> {
    pub(crate) fn to_native(self) -> NativeOperand<'a> {
        match self {
            Operand::Tensor(t) => NativeOperand::Array(t.instance()),
            Operand::Scalar(s) => NativeOperand::Scalar(s),
        }
    }
}

impl<'a> From<&'a Tensor> for Operand<'a> {
    fn from(t: &'a Tensor) -> Self {
        Operand::Tensor(t)
    }
}

impl From<Scalar> for Operand<'_> {
    fn from(s: Scalar) -> Self {
        Operand::Scalar(s)
    }
}

macro_rules! operand_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand<'_> {
                fn from(v: $t) -> Self {
                    Operand::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

operand_from_scalar!(i32, i64, f32, f64);

fn select<K>(key: &KernelKey, signature: fn(Kernel) -> Option<K>) -> Result<K> {
    trace!(kernel = %key, "dispatch");
    lookup(key)
        .and_then(signature)
        .ok_or_else(|| TensorError::UnknownOperation(key.identifier()))
}

/// `add` / `multiply`, keyed on both operands.
pub fn binary(op: Op, lhs: &Instance, rhs: NativeOperand<'_>) -> Result<Instance> {
    let key = KernelKey::binary(op, OperandTag::Array(lhs.kind()), rhs.tag());
    let kernel = select(&key, Kernel::binary)?;
    kernel(lhs, rhs)
}

/// The generic dot kernel.
pub fn dot(lhs: &Instance, rhs: &Instance) -> Result<Instance> {
    let kernel = select(&KernelKey::fixed(Op::Dot), Kernel::pair)?;
    kernel(lhs, rhs)
}

/// A fixed single-operand kernel such as `transpose` or `log`.
pub fn unary(op: Op, input: &Instance) -> Result<Instance> {
    let kernel = select(&KernelKey::fixed(op), Kernel::unary)?;
    kernel(input)
}

pub fn power(input: &Instance, exponent: i32) -> Result<Instance> {
    let kernel = select(&KernelKey::fixed(Op::Pow), Kernel::power)?;
    kernel(input, exponent)
}

pub fn along_axis(op: Op, input: &Instance, axis: usize) -> Result<Instance> {
    let kernel = select(&KernelKey::fixed(op), Kernel::axis)?;
    kernel(input, axis)
}

/// Reshape, keyed by the target rank.
pub fn reshape(input: &Instance, target: &[i64]) -> Result<Instance> {
    let rank = Rank::new(target.len())?;
    let kernel = select(&KernelKey::fixed(Op::Reshape(rank)), Kernel::reshape)?;
    kernel(input, target)
}
