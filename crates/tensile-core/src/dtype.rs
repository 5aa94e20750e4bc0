use std::fmt;

/// Element kinds a native array can hold.
///
/// Only two 32-bit kinds exist. Everything wider is downcast on ingestion,
/// everything else is rejected before it reaches a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    /// 32-bit signed integer
    Int32,
    /// 32-bit IEEE 754 single-precision float
    Float32,
}

impl ElementKind {
    /// One-letter tag used in kernel identifiers (`i` / `f`).
    pub fn tag(&self) -> char {
        match self {
            ElementKind::Int32 => 'i',
            ElementKind::Float32 => 'f',
        }
    }

    /// Size in bytes of a single element.
    pub fn element_size(&self) -> usize {
        4
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ElementKind::Float32)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, ElementKind::Int32)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Int32 => write!(f, "int32"),
            ElementKind::Float32 => write!(f, "float32"),
        }
    }
}

/// Storage width of an external dense buffer at the ingestion boundary.
///
/// This is wider than [`ElementKind`]: it names what a caller may hand in,
/// not what a native array may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StorageType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    /// 16-bit IEEE 754 half-precision float
    F16,
    /// 16-bit Brain Float
    BF16,
    F32,
    F64,
}

impl StorageType {
    /// Size in bytes of a single element.
    pub fn element_size(&self) -> usize {
        match self {
            StorageType::Bool | StorageType::I8 | StorageType::U8 => 1,
            StorageType::I16 | StorageType::U16 | StorageType::F16 | StorageType::BF16 => 2,
            StorageType::I32 | StorageType::U32 | StorageType::F32 => 4,
            StorageType::I64 | StorageType::U64 | StorageType::F64 => 8,
        }
    }

    /// Number of bytes needed to store `n` elements, or `None` if that
    /// overflows `usize`.
    pub fn storage_bytes(&self, n: usize) -> Option<usize> {
        self.element_size().checked_mul(n)
    }

    /// The element kind this storage normalizes to, if any.
    ///
    /// 32-bit kinds map to themselves, 64-bit signed integers and doubles
    /// narrow to their 32-bit counterpart. Every other width has no mapping.
    pub fn element_kind(&self) -> Option<ElementKind> {
        match self {
            StorageType::I32 | StorageType::I64 => Some(ElementKind::Int32),
            StorageType::F32 | StorageType::F64 => Some(ElementKind::Float32),
            _ => None,
        }
    }

    /// Whether ingesting this storage narrows the values.
    pub fn is_downcast(&self) -> bool {
        matches!(self, StorageType::I64 | StorageType::F64)
    }

    pub fn is_float(&self) -> bool {
        matches!(
            self,
            StorageType::F16 | StorageType::BF16 | StorageType::F32 | StorageType::F64
        )
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            StorageType::I8
                | StorageType::I16
                | StorageType::I32
                | StorageType::I64
                | StorageType::U8
                | StorageType::U16
                | StorageType::U32
                | StorageType::U64
        )
    }
}

impl From<ElementKind> for StorageType {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Int32 => StorageType::I32,
            ElementKind::Float32 => StorageType::F32,
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageType::Bool => "bool",
            StorageType::I8 => "int8",
            StorageType::I16 => "int16",
            StorageType::I32 => "int32",
            StorageType::I64 => "int64",
            StorageType::U8 => "uint8",
            StorageType::U16 => "uint16",
            StorageType::U32 => "uint32",
            StorageType::U64 => "uint64",
            StorageType::F16 => "float16",
            StorageType::BF16 => "bfloat16",
            StorageType::F32 => "float32",
            StorageType::F64 => "float64",
        };
        write!(f, "{name}")
    }
}
