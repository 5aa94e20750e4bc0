//! Addition and multiplication.
//!
//! Three operand layouts reach these kernels: two arrays of the same shape,
//! an array and a scalar, and (for addition only, gated by the registry) a
//! matrix plus a row vector whose length is the matrix's column count.

use tensile_core::{ElementKind, Result, TensorError};

use super::{map_elements, zip_elements};
use crate::element::{Element, View};
use crate::instance::Instance;
use crate::registry::NativeOperand;

pub fn add(lhs: &Instance, rhs: NativeOperand<'_>) -> Result<Instance> {
    match lhs.element_kind() {
        ElementKind::Int32 => combine::<i32>(lhs, rhs, <i32 as Element>::add),
        ElementKind::Float32 => combine::<f32>(lhs, rhs, <f32 as Element>::add),
    }
}

pub fn multiply(lhs: &Instance, rhs: NativeOperand<'_>) -> Result<Instance> {
    match lhs.element_kind() {
        ElementKind::Int32 => combine::<i32>(lhs, rhs, <i32 as Element>::mul),
        ElementKind::Float32 => combine::<f32>(lhs, rhs, <f32 as Element>::mul),
    }
}

fn combine<T: Element>(
    lhs: &Instance,
    rhs: NativeOperand<'_>,
    op: fn(T, T) -> T,
) -> Result<Instance> {
    let a = T::view(lhs)?;
    match rhs {
        NativeOperand::Scalar(scalar) => {
            let s = T::from_scalar(scalar).ok_or(TensorError::IncompatibleDtype {
                expected: T::KIND,
                got: scalar.kind(),
            })?;
            let out = map_elements(a.data, |v| op(v, s));
            T::build(a.shape.clone(), out)
        }
        NativeOperand::Array(other) => {
            let b = T::view(other)?;
            if a.shape == b.shape {
                let out = zip_elements(a.data, b.data, op);
                T::build(a.shape.clone(), out)
            } else if a.shape.ndim() == 2
                && b.shape.ndim() == 1
                && a.shape.dim(1) == b.shape.dim(0)
            {
                row_bias(a, b, op)
            } else {
                Err(TensorError::DimensionMismatch {
                    lhs: a.shape.dims().to_vec(),
                    rhs: b.shape.dims().to_vec(),
                })
            }
        }
    }
}

/// `[m, n] (op) [n]`: apply the vector to every row.
fn row_bias<T: Element>(
    matrix: View<'_, T>,
    row: View<'_, T>,
    op: fn(T, T) -> T,
) -> Result<Instance> {
    let cols = row.data.len();
    let out: Vec<T> = matrix
        .data
        .chunks_exact(cols)
        .flat_map(|r| r.iter().zip(row.data).map(|(&x, &y)| op(x, y)))
        .collect();
    T::build(matrix.shape.clone(), out)
}
