//! Convenience re-exports for common tensile types.
//!
//! ```rust
//! use tensile::prelude::*;
//! ```

pub use crate::functional;
pub use crate::{Data, ElementKind, Index, Indexed, Scalar, Shape, Tensor, TensorError};
pub use crate::Result;
