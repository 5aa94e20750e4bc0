//! Native kernels, grouped by what they do to the buffer.
//!
//! Every kernel takes borrowed instances and returns a freshly allocated
//! one. Inputs are never mutated.

pub mod elementwise;
pub mod layout;
pub mod linalg;
pub mod math;
pub mod reduce;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Buffers at least this long are processed on the rayon pool.
pub const PAR_THRESHOLD: usize = 8192;

#[cfg(feature = "parallel")]
pub(crate) fn map_elements<T, U, F>(src: &[T], op: F) -> Vec<U>
where
    T: Copy + Sync,
    U: Send,
    F: Fn(T) -> U + Sync + Send,
{
    if src.len() >= PAR_THRESHOLD {
        src.par_iter().map(|&v| op(v)).collect()
    } else {
        src.iter().map(|&v| op(v)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn map_elements<T, U, F>(src: &[T], op: F) -> Vec<U>
where
    T: Copy + Sync,
    U: Send,
    F: Fn(T) -> U + Sync + Send,
{
    src.iter().map(|&v| op(v)).collect()
}

#[cfg(feature = "parallel")]
pub(crate) fn zip_elements<T, F>(a: &[T], b: &[T], op: F) -> Vec<T>
where
    T: Copy + Send + Sync,
    F: Fn(T, T) -> T + Sync + Send,
{
    if a.len() >= PAR_THRESHOLD {
        a.par_iter().zip(b.par_iter()).map(|(&x, &y)| op(x, y)).collect()
    } else {
        a.iter().zip(b.iter()).map(|(&x, &y)| op(x, y)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn zip_elements<T, F>(a: &[T], b: &[T], op: F) -> Vec<T>
where
    T: Copy + Send + Sync,
    F: Fn(T, T) -> T + Sync + Send,
{
    a.iter().zip(b.iter()).map(|(&x, &y)| op(x, y)).collect()
}
