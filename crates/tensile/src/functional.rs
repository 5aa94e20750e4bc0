//! Free-function helpers over tensors.
//!
//! Each helper forwards to one fixed kernel family; none of them branch on
//! operand rank.

use tensile_core::{Result, TensorError};
use tensile_kernels::Op;

use crate::dispatch;
use crate::tensor::Tensor;

/// Natural logarithm. Float32 only.
pub fn log(t: &Tensor) -> Result<Tensor> {
    dispatch::unary(Op::Log, t.instance()).map(Tensor::from_instance)
}

/// `e^x`. Float32 only.
pub fn exp(t: &Tensor) -> Result<Tensor> {
    dispatch::unary(Op::Exp, t.instance()).map(Tensor::from_instance)
}

/// Integer power. Float32 only.
pub fn pow(t: &Tensor, exponent: i32) -> Result<Tensor> {
    dispatch::power(t.instance(), exponent).map(Tensor::from_instance)
}

/// Sum along `axis`, dropping it. A vector sums to a length-1 vector.
pub fn sum(t: &Tensor, axis: usize) -> Result<Tensor> {
    dispatch::along_axis(Op::Sum, t.instance(), axis).map(Tensor::from_instance)
}

/// Index of the largest element along the last axis, as an Int32 tensor.
pub fn argmax(t: &Tensor) -> Result<Tensor> {
    dispatch::unary(Op::Argmax(t.dtype()), t.instance()).map(Tensor::from_instance)
}

/// Collapse every axis after the first into one.
///
/// Only `keep_batch = true` is supported.
pub fn flatten(t: &Tensor, keep_batch: bool) -> Result<Tensor> {
    if !keep_batch {
        return Err(TensorError::NotImplemented("flatten without keep_batch"));
    }
    dispatch::unary(Op::FlattenKeepBatch, t.instance()).map(Tensor::from_instance)
}
