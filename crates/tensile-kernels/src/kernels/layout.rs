//! Kernels that change the shape but keep row-major element order.

use tensile_core::{ElementKind, Result, Shape, TensorError};

use crate::element::Element;
use crate::instance::Instance;

/// Reshape into `dims`, copying the buffer.
///
/// A `-1` on the first axis stands for the current first-axis size; it is
/// not inferred from the element count. Every other axis must be positive
/// and the element count must be preserved.
pub fn reshape(input: &Instance, dims: &[i64]) -> Result<Instance> {
    let numel = input.numel();
    let mismatch = || TensorError::ReshapeSizeMismatch {
        numel,
        shape: dims.to_vec(),
    };

    let mut target: Vec<usize> = Vec::with_capacity(dims.len());
    for (axis, &d) in dims.iter().enumerate() {
        let size = if axis == 0 && d == -1 {
            input.shape().dims()[0]
        } else if d > 0 {
            d as usize
        } else {
            return Err(mismatch());
        };
        target.push(size);
    }
    let count = target
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(mismatch)?;
    if count != numel {
        return Err(mismatch());
    }

    let shape = Shape::new(&target)?;
    match input.element_kind() {
        ElementKind::Int32 => relabel::<i32>(input, shape),
        ElementKind::Float32 => relabel::<f32>(input, shape),
    }
}

/// Collapse every axis after the first: `[d0, d1, ..]` becomes
/// `[d0, d1 * ..]`. A vector `[n]` becomes `[n, 1]`.
pub fn flatten_keep_batch(input: &Instance) -> Result<Instance> {
    let dims = input.shape().dims();
    let batch = dims[0];
    let rest: usize = dims[1..].iter().product();
    let shape = Shape::new(&[batch, rest])?;
    match input.element_kind() {
        ElementKind::Int32 => relabel::<i32>(input, shape),
        ElementKind::Float32 => relabel::<f32>(input, shape),
    }
}

fn relabel<T: Element>(input: &Instance, shape: Shape) -> Result<Instance> {
    let view = T::view(input)?;
    T::build(shape, view.data.to_vec())
}
