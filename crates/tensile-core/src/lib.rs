//! # tensile-core
//!
//! Shared vocabulary for the tensile crates.
//!
//! Provides:
//! - `ElementKind` (the two native element kinds) and `StorageType`
//!   (what the ingestion boundary accepts)
//! - `Rank`, `Shape` and `ConcreteKind` (the eight native array kinds)
//! - The kind resolver
//! - `TensorError`, the one error type used by every crate

pub mod dtype;
pub mod error;
pub mod kind;
pub mod rank;
pub mod scalar;
pub mod shape;

pub use dtype::{ElementKind, StorageType};
pub use error::TensorError;
pub use kind::{resolve, ConcreteKind, KindHint};
pub use rank::Rank;
pub use scalar::Scalar;
pub use shape::Shape;

pub type Result<T> = std::result::Result<T, TensorError>;
