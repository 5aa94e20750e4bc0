//! Reductions: sum along an axis and argmax along the last axis.

use tensile_core::{ElementKind, Result, Shape, TensorError};

use crate::element::Element;
use crate::instance::Instance;

/// Sum along `axis`, removing that axis.
///
/// Summing the only axis of a vector yields a length-1 vector, since no
/// rank-0 kind exists.
pub fn sum(input: &Instance, axis: usize) -> Result<Instance> {
    match input.element_kind() {
        ElementKind::Int32 => sum_typed::<i32>(input, axis),
        ElementKind::Float32 => sum_typed::<f32>(input, axis),
    }
}

fn sum_typed<T: Element>(input: &Instance, axis: usize) -> Result<Instance> {
    let view = T::view(input)?;
    let dims = view.shape.dims();
    if axis >= dims.len() {
        return Err(TensorError::InvalidAxis {
            axis,
            rank: dims.len(),
        });
    }

    let axis_size = dims[axis];
    let outer_size: usize = dims[..axis].iter().product();
    let inner_size: usize = dims[axis + 1..].iter().product();

    let mut result = vec![T::zero(); outer_size * inner_size];
    for outer in 0..outer_size {
        for inner in 0..inner_size {
            let mut acc = T::zero();
            for k in 0..axis_size {
                let idx = outer * axis_size * inner_size + k * inner_size + inner;
                acc = acc.add(view.data[idx]);
            }
            result[outer * inner_size + inner] = acc;
        }
    }

    let out_shape = match view.shape.without_axis(axis) {
        Some(shape) => shape,
        None => Shape::new(&[1])?,
    };
    T::build(out_shape, result)
}

/// Argmax over the last axis of an Int32 instance.
pub fn argmax_i(input: &Instance) -> Result<Instance> {
    argmax_typed::<i32>(input)
}

/// Argmax over the last axis of a Float32 instance.
pub fn argmax_f(input: &Instance) -> Result<Instance> {
    argmax_typed::<f32>(input)
}

/// Indices of the largest element along the last axis, as Int32.
/// Ties resolve to the first occurrence.
fn argmax_typed<T: Element>(input: &Instance) -> Result<Instance> {
    let view = T::view(input)?;
    let dims = view.shape.dims();
    let axis = dims.len() - 1;
    let axis_size = dims[axis];

    let result: Vec<i32> = view
        .data
        .chunks_exact(axis_size)
        .map(|row| {
            let mut best_idx = 0usize;
            for (k, v) in row.iter().enumerate().skip(1) {
                if *v > row[best_idx] {
                    best_idx = k;
                }
            }
            best_idx as i32
        })
        .collect();

    let out_shape = match view.shape.without_axis(axis) {
        Some(shape) => shape,
        None => Shape::new(&[1])?,
    };
    i32::build(out_shape, result)
}
