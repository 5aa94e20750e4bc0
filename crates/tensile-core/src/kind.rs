//! Concrete array kinds and the resolver that picks one.

use std::fmt;

use crate::dtype::{ElementKind, StorageType};
use crate::rank::Rank;
use crate::{Result, TensorError};

/// One of the eight native array kinds: a (rank, element kind) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConcreteKind {
    pub rank: Rank,
    pub element: ElementKind,
}

impl ConcreteKind {
    pub const VECTOR_I: ConcreteKind = ConcreteKind::new(Rank::One, ElementKind::Int32);
    pub const VECTOR_F: ConcreteKind = ConcreteKind::new(Rank::One, ElementKind::Float32);
    pub const MATRIX_I: ConcreteKind = ConcreteKind::new(Rank::Two, ElementKind::Int32);
    pub const MATRIX_F: ConcreteKind = ConcreteKind::new(Rank::Two, ElementKind::Float32);
    pub const TENSOR3_I: ConcreteKind = ConcreteKind::new(Rank::Three, ElementKind::Int32);
    pub const TENSOR3_F: ConcreteKind = ConcreteKind::new(Rank::Three, ElementKind::Float32);
    pub const TENSOR4_I: ConcreteKind = ConcreteKind::new(Rank::Four, ElementKind::Int32);
    pub const TENSOR4_F: ConcreteKind = ConcreteKind::new(Rank::Four, ElementKind::Float32);

    /// Every constructible kind.
    pub const ALL: [ConcreteKind; 8] = [
        Self::VECTOR_I,
        Self::VECTOR_F,
        Self::MATRIX_I,
        Self::MATRIX_F,
        Self::TENSOR3_I,
        Self::TENSOR3_F,
        Self::TENSOR4_I,
        Self::TENSOR4_F,
    ];

    pub const fn new(rank: Rank, element: ElementKind) -> Self {
        Self { rank, element }
    }

    /// Native type name, e.g. `MatrixF` or `Tensor3I`.
    pub fn name(&self) -> &'static str {
        match (self.rank, self.element) {
            (Rank::One, ElementKind::Int32) => "VectorI",
            (Rank::One, ElementKind::Float32) => "VectorF",
            (Rank::Two, ElementKind::Int32) => "MatrixI",
            (Rank::Two, ElementKind::Float32) => "MatrixF",
            (Rank::Three, ElementKind::Int32) => "Tensor3I",
            (Rank::Three, ElementKind::Float32) => "Tensor3F",
            (Rank::Four, ElementKind::Int32) => "Tensor4I",
            (Rank::Four, ElementKind::Float32) => "Tensor4F",
        }
    }

    /// Lower-case operand tag used in kernel identifiers, e.g. `matrixf`.
    pub fn tag(&self) -> String {
        format!("{}{}", self.rank.name(), self.element.tag())
    }
}

impl fmt::Display for ConcreteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Anything that can name an element kind for the resolver.
pub trait KindHint {
    fn element_kind(&self) -> Result<ElementKind>;
}

impl KindHint for ElementKind {
    fn element_kind(&self) -> Result<ElementKind> {
        Ok(*self)
    }
}

/// Only the two 32-bit storages are kind hints. Wider storage has to go
/// through the ingestion downcast first.
impl KindHint for StorageType {
    fn element_kind(&self) -> Result<ElementKind> {
        match self {
            StorageType::I32 => Ok(ElementKind::Int32),
            StorageType::F32 => Ok(ElementKind::Float32),
            other => Err(TensorError::UnsupportedElementType(other.to_string())),
        }
    }
}

impl KindHint for str {
    fn element_kind(&self) -> Result<ElementKind> {
        match self.to_ascii_lowercase().as_str() {
            "int" | "int32" | "i32" | "i" => Ok(ElementKind::Int32),
            "float" | "float32" | "f32" | "f" => Ok(ElementKind::Float32),
            _ => Err(TensorError::UnsupportedElementType(self.to_string())),
        }
    }
}

impl<H: KindHint + ?Sized> KindHint for &H {
    fn element_kind(&self) -> Result<ElementKind> {
        (**self).element_kind()
    }
}

/// Map a rank and an element-kind hint to a concrete array kind.
///
/// ```
/// use tensile_core::{resolve, ConcreteKind, ElementKind};
///
/// assert_eq!(resolve(2, &ElementKind::Float32).unwrap(), ConcreteKind::MATRIX_F);
/// assert_eq!(resolve(3, "int").unwrap(), ConcreteKind::TENSOR3_I);
/// assert!(resolve(5, "float").is_err());
/// ```
pub fn resolve<H: KindHint + ?Sized>(rank: usize, hint: &H) -> Result<ConcreteKind> {
    let rank = Rank::new(rank)?;
    let element = hint.element_kind()?;
    Ok(ConcreteKind::new(rank, element))
}
