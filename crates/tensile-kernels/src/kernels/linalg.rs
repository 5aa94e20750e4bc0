//! Dot product and transpose.
//!
//! The dot kernel contracts the last axis of the left operand with the
//! first axis of the right one:
//! - `[k] · [k]` → `[1]`
//! - `[m, k] @ [k]` → `[m]`
//! - `[k] @ [k, n]` → `[n]`
//! - `[m, k] @ [k, n]` → `[m, n]`
//! - `[b, m, k] @ [k, n]` → `[b, m, n]`

use smallvec::SmallVec;
use tensile_core::{ElementKind, Result, Shape, TensorError};

use crate::element::{Element, View};
use crate::instance::Instance;

/// Tile size for cache-friendly blocking.
const TILE_M: usize = 64;
const TILE_N: usize = 64;
const TILE_K: usize = 64;

pub fn dot(lhs: &Instance, rhs: &Instance) -> Result<Instance> {
    if lhs.element_kind() != rhs.element_kind() {
        return Err(TensorError::IncompatibleDtype {
            expected: lhs.element_kind(),
            got: rhs.element_kind(),
        });
    }
    match lhs.element_kind() {
        ElementKind::Int32 => dot_typed::<i32>(lhs, rhs),
        ElementKind::Float32 => dot_typed::<f32>(lhs, rhs),
    }
}

fn dot_typed<T: Element>(lhs: &Instance, rhs: &Instance) -> Result<Instance> {
    let a = T::view(lhs)?;
    let b = T::view(rhs)?;
    let a_dims = a.shape.dims();
    let b_dims = b.shape.dims();

    let mismatch = || TensorError::DimensionMismatch {
        lhs: a_dims.to_vec(),
        rhs: b_dims.to_vec(),
    };

    // (rows of lhs, contracted length, columns of rhs, output dims)
    let (m, k, n, out_dims): (usize, usize, usize, SmallVec<[usize; 4]>) =
        match (a_dims, b_dims) {
            (&[k], &[k2]) if k == k2 => (1, k, 1, SmallVec::from_slice(&[1])),
            (&[m, k], &[k2]) if k == k2 => (m, k, 1, SmallVec::from_slice(&[m])),
            (&[k], &[k2, n]) if k == k2 => (1, k, n, SmallVec::from_slice(&[n])),
            (&[m, k], &[k2, n]) if k == k2 => (m, k, n, SmallVec::from_slice(&[m, n])),
            (&[batch, m, k], &[k2, n]) if k == k2 => {
                (batch * m, k, n, SmallVec::from_slice(&[batch, m, n]))
            }
            _ => return Err(mismatch()),
        };

    let mut out = vec![T::zero(); m * n];
    tiled_matmul(a.data, b.data, &mut out, m, n, k);
    T::build(Shape::new(&out_dims)?, out)
}

/// `c += a @ b` for row-major `[m, k]` and `[k, n]` buffers.
fn tiled_matmul<T: Element>(a: &[T], b: &[T], c: &mut [T], m: usize, n: usize, k: usize) {
    for i0 in (0..m).step_by(TILE_M) {
        let i_end = (i0 + TILE_M).min(m);
        for j0 in (0..n).step_by(TILE_N) {
            let j_end = (j0 + TILE_N).min(n);
            for p0 in (0..k).step_by(TILE_K) {
                let p_end = (p0 + TILE_K).min(k);

                for i in i0..i_end {
                    for p in p0..p_end {
                        let a_val = a[i * k + p];
                        for j in j0..j_end {
                            c[i * n + j] = c[i * n + j].add(a_val.mul(b[p * n + j]));
                        }
                    }
                }
            }
        }
    }
}

/// Reverse the axis order. A vector is returned unchanged.
pub fn transpose(input: &Instance) -> Result<Instance> {
    match input.element_kind() {
        ElementKind::Int32 => transpose_typed::<i32>(input),
        ElementKind::Float32 => transpose_typed::<f32>(input),
    }
}

fn transpose_typed<T: Element>(input: &Instance) -> Result<Instance> {
    let View { shape, data } = T::view(input)?;
    let ndim = shape.ndim();
    if ndim == 1 {
        return T::build(shape.clone(), data.to_vec());
    }

    let out_shape = shape.reversed();
    let in_strides = shape.contiguous_strides();
    let out_dims = out_shape.dims();

    // Walk the output in row-major order and gather from the input, whose
    // stride for output axis `d` is the input stride of axis `ndim - 1 - d`.
    let gather: SmallVec<[usize; 4]> = (0..ndim).map(|d| in_strides[ndim - 1 - d]).collect();
    let mut coords: SmallVec<[usize; 4]> = SmallVec::from_elem(0, ndim);
    let mut out = Vec::with_capacity(data.len());
    for _ in 0..data.len() {
        let src: usize = coords.iter().zip(gather.iter()).map(|(c, s)| c * s).sum();
        out.push(data[src]);
        for axis in (0..ndim).rev() {
            coords[axis] += 1;
            if coords[axis] < out_dims[axis] {
                break;
            }
            coords[axis] = 0;
        }
    }
    T::build(out_shape, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst<T: Element>(dims: &[usize], data: Vec<T>) -> Instance {
        Instance::from_vec(Shape::new(dims).unwrap(), data).unwrap()
    }

    #[test]
    fn test_matmul_2x2() {
        let a = inst(&[2, 2], vec![1.0f32, 2.0, 3.0, 4.0]);
        let b = inst(&[2, 2], vec![5.0f32, 6.0, 7.0, 8.0]);
        let c = dot(&a, &b).unwrap();
        assert_eq!(c.shape(), &[2, 2]);
        assert_eq!(c.as_f32_slice().unwrap(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_matvec_and_vecmat() {
        let m = inst(&[2, 3], vec![1i32, 2, 3, 4, 5, 6]);
        let v = inst(&[3], vec![1i32, 0, 2]);
        let c = dot(&m, &v).unwrap();
        assert_eq!(c.shape(), &[2]);
        assert_eq!(c.as_i32_slice().unwrap(), &[7, 16]);

        let u = inst(&[2], vec![1i32, 1]);
        let d = dot(&u, &m).unwrap();
        assert_eq!(d.shape(), &[3]);
        assert_eq!(d.as_i32_slice().unwrap(), &[5, 7, 9]);
    }

    #[test]
    fn test_inner_product() {
        let a = inst(&[3], vec![1.0f32, 2.0, 3.0]);
        let c = dot(&a, &a).unwrap();
        assert_eq!(c.shape(), &[1]);
        assert_eq!(c.as_f32_slice().unwrap(), &[14.0]);
    }

    #[test]
    fn test_batched_lhs() {
        let a = inst(&[2, 1, 2], vec![1.0f32, 2.0, 3.0, 4.0]);
        let b = inst(&[2, 2], vec![1.0f32, 0.0, 0.0, 1.0]);
        let c = dot(&a, &b).unwrap();
        assert_eq!(c.shape(), &[2, 1, 2]);
        assert_eq!(c.as_f32_slice().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_matmul_larger_than_tile() {
        let n = TILE_M + 3;
        let eye: Vec<f32> = (0..n * n).map(|i| if i % (n + 1) == 0 { 1.0 } else { 0.0 }).collect();
        let x: Vec<f32> = (0..n * n).map(|i| i as f32).collect();
        let c = dot(&inst(&[n, n], x.clone()), &inst(&[n, n], eye)).unwrap();
        assert_eq!(c.as_f32_slice().unwrap(), x.as_slice());
    }

    #[test]
    fn test_dot_errors() {
        let a = inst(&[2, 3], vec![0.0f32; 6]);
        let b = inst(&[2, 3], vec![0.0f32; 6]);
        assert_eq!(
            dot(&a, &b),
            Err(TensorError::DimensionMismatch {
                lhs: vec![2, 3],
                rhs: vec![2, 3],
            })
        );

        let c = inst(&[3, 3], vec![0i32; 9]);
        assert_eq!(
            dot(&a, &c),
            Err(TensorError::IncompatibleDtype {
                expected: ElementKind::Float32,
                got: ElementKind::Int32,
            })
        );
    }

    #[test]
    fn test_transpose_matrix() {
        let m = inst(&[2, 3], vec![1i32, 2, 3, 4, 5, 6]);
        let t = transpose(&m).unwrap();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.as_i32_slice().unwrap(), &[1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_transpose_vector_is_identity() {
        let v = inst(&[3], vec![1.0f32, 2.0, 3.0]);
        assert_eq!(transpose(&v).unwrap(), v);
    }

    #[test]
    fn test_transpose_tensor3() {
        let data: Vec<f32> = (0..24).map(|v| v as f32).collect();
        let t = inst(&[2, 3, 4], data);
        let r = transpose(&t).unwrap();
        assert_eq!(r.shape(), &[4, 3, 2]);
        // out[i][j][k] == in[k][j][i]
        assert_eq!(r.get(&[3, 1, 1]).unwrap(), t.get(&[1, 1, 3]).unwrap());
        assert_eq!(transpose(&r).unwrap(), t);
    }
}
