use std::fmt;

use crate::dtype::ElementKind;

/// A single element of one of the two supported kinds.
///
/// Host scalars convert with the same narrowing rules as dense buffers:
/// `i64` becomes `Int32`, `f64` becomes `Float32`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scalar {
    Int32(i32),
    Float32(f32),
}

impl Scalar {
    pub fn kind(&self) -> ElementKind {
        match self {
            Scalar::Int32(_) => ElementKind::Int32,
            Scalar::Float32(_) => ElementKind::Float32,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Scalar::Int32(v) => Some(v),
            Scalar::Float32(_) => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Scalar::Float32(v) => Some(v),
            Scalar::Int32(_) => None,
        }
    }

    /// Value as `f64`, exact for both kinds.
    pub fn to_f64(&self) -> f64 {
        match *self {
            Scalar::Int32(v) => v as f64,
            Scalar::Float32(v) => v as f64,
        }
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int32(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int32(v as i32)
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::Float32(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float32(v as f32)
    }
}

impl PartialEq<i32> for Scalar {
    fn eq(&self, other: &i32) -> bool {
        self.as_i32() == Some(*other)
    }
}

impl PartialEq<f32> for Scalar {
    fn eq(&self, other: &f32) -> bool {
        self.as_f32() == Some(*other)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int32(v) => write!(f, "{v}"),
            Scalar::Float32(v) => write!(f, "{v}"),
        }
    }
}
