//! Ingestion: turn heterogeneous host inputs into one native instance.
//!
//! Inputs arrive as an existing [`Instance`], a dense array (typed `ndarray`
//! or raw bytes tagged with a [`StorageType`]), a nested numeric literal, or
//! a bare scalar. 64-bit storage is narrowed to the matching 32-bit kind;
//! every other storage width is rejected before anything native is built.

use ndarray::{ArrayD, Dimension, IxDyn};
use tracing::debug;

use tensile_core::{
    resolve, ConcreteKind, ElementKind, Rank, Result, Scalar, Shape, StorageType, TensorError,
};
use tensile_kernels::{Element, Instance};

/// A dense host array.
#[derive(Debug, Clone, PartialEq)]
pub enum DenseArray {
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    Raw(RawBuffer),
}

impl DenseArray {
    pub fn storage_type(&self) -> StorageType {
        match self {
            DenseArray::I32(_) => StorageType::I32,
            DenseArray::I64(_) => StorageType::I64,
            DenseArray::F32(_) => StorageType::F32,
            DenseArray::F64(_) => StorageType::F64,
            DenseArray::Raw(raw) => raw.storage,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            DenseArray::I32(a) => a.shape(),
            DenseArray::I64(a) => a.shape(),
            DenseArray::F32(a) => a.shape(),
            DenseArray::F64(a) => a.shape(),
            DenseArray::Raw(raw) => &raw.shape,
        }
    }
}

/// Untyped row-major bytes in native endianness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBuffer {
    pub storage: StorageType,
    pub shape: Vec<usize>,
    pub bytes: Vec<u8>,
}

impl RawBuffer {
    pub fn new(storage: StorageType, shape: &[usize], bytes: Vec<u8>) -> Self {
        Self {
            storage,
            shape: shape.to_vec(),
            bytes,
        }
    }

    /// Reinterpret the bytes as a typed array. Only the four storages the
    /// normalizer accepts can be decoded.
    pub fn decode(&self) -> Result<DenseArray> {
        Rank::new(self.shape.len())?;
        Ok(match self.storage {
            StorageType::I32 => DenseArray::I32(self.typed()?),
            StorageType::I64 => DenseArray::I64(self.typed()?),
            StorageType::F32 => DenseArray::F32(self.typed()?),
            StorageType::F64 => DenseArray::F64(self.typed()?),
            other => return Err(TensorError::UnsupportedElementType(other.to_string())),
        })
    }

    fn typed<T: bytemuck::Pod>(&self) -> Result<ArrayD<T>> {
        let expected = self
            .shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .and_then(|numel| self.storage.storage_bytes(numel))
            .ok_or_else(|| {
                TensorError::InvalidConstruction(format!(
                    "byte size of {} shape {:?} overflows usize",
                    self.storage, self.shape
                ))
            })?;
        if self.bytes.len() != expected {
            return Err(TensorError::InvalidConstruction(format!(
                "{} bytes of {} cannot fill shape {:?} ({expected} bytes)",
                self.bytes.len(),
                self.storage,
                self.shape
            )));
        }
        let data: Vec<T> = self
            .bytes
            .chunks_exact(std::mem::size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
            .collect();
        ArrayD::from_shape_vec(IxDyn(&self.shape), data)
            .map_err(|e| TensorError::InvalidConstruction(e.to_string()))
    }
}

/// A nested numeric literal such as `vec![vec![1, 2], vec![3, 4]]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested {
    Int(i64),
    Float(f64),
    List(Vec<Nested>),
}

impl Nested {
    /// Materialize into a dense array the way a host array library would:
    /// integer leaves give `int64`, any float leaf promotes everything to
    /// `float64`.
    pub fn materialize(&self) -> Result<DenseArray> {
        let mut dims = Vec::new();
        let mut node = self;
        while let Nested::List(items) = node {
            match items.first() {
                Some(first) => {
                    dims.push(items.len());
                    node = first;
                }
                None => {
                    return Err(TensorError::InvalidConstruction(
                        "cannot build a tensor from an empty list".into(),
                    ))
                }
            }
        }

        let mut leaves = Vec::new();
        self.collect_leaves(0, &dims, &mut leaves)?;

        let any_float = leaves.iter().any(|l| matches!(l, Leaf::Float(_)));
        let dense = if any_float {
            let data = leaves
                .iter()
                .map(|l| match *l {
                    Leaf::Int(v) => v as f64,
                    Leaf::Float(v) => v,
                })
                .collect();
            DenseArray::F64(from_shape_vec(&dims, data)?)
        } else {
            let data = leaves
                .iter()
                .filter_map(|l| match *l {
                    Leaf::Int(v) => Some(v),
                    Leaf::Float(_) => None,
                })
                .collect();
            DenseArray::I64(from_shape_vec(&dims, data)?)
        };
        Ok(dense)
    }

    fn collect_leaves(&self, depth: usize, dims: &[usize], out: &mut Vec<Leaf>) -> Result<()> {
        let leaf = match self {
            Nested::List(items) => {
                if dims.get(depth) != Some(&items.len()) {
                    return Err(ragged(dims));
                }
                for item in items {
                    item.collect_leaves(depth + 1, dims, out)?;
                }
                return Ok(());
            }
            Nested::Int(v) => Leaf::Int(*v),
            Nested::Float(v) => Leaf::Float(*v),
        };
        if depth != dims.len() {
            return Err(ragged(dims));
        }
        out.push(leaf);
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Leaf {
    Int(i64),
    Float(f64),
}

fn ragged(dims: &[usize]) -> TensorError {
    TensorError::UnsupportedElementType(format!(
        "ragged nested sequence (expected shape {dims:?})"
    ))
}

fn from_shape_vec<T>(dims: &[usize], data: Vec<T>) -> Result<ArrayD<T>> {
    ArrayD::from_shape_vec(IxDyn(dims), data)
        .map_err(|e| TensorError::InvalidConstruction(e.to_string()))
}

macro_rules! nested_leaf {
    ($($t:ty => $variant:ident as $wide:ty),*) => {
        $(
            impl From<$t> for Nested {
                fn from(v: $t) -> Self {
                    Nested::$variant(v as $wide)
                }
            }
        )*
    };
}

nested_leaf!(i32 => Int as i64, i64 => Int as i64, f32 => Float as f64, f64 => Float as f64);

impl<T: Into<Nested>> From<Vec<T>> for Nested {
    fn from(items: Vec<T>) -> Self {
        Nested::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Nested>, const N: usize> From<[T; N]> for Nested {
    fn from(items: [T; N]) -> Self {
        Nested::List(items.into_iter().map(Into::into).collect())
    }
}

/// Anything a tensor can be built from.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Instance(Instance),
    Dense(DenseArray),
    Nested(Nested),
    Scalar(Scalar),
}

impl From<Instance> for Data {
    fn from(instance: Instance) -> Self {
        Data::Instance(instance)
    }
}

impl From<DenseArray> for Data {
    fn from(dense: DenseArray) -> Self {
        Data::Dense(dense)
    }
}

impl From<RawBuffer> for Data {
    fn from(raw: RawBuffer) -> Self {
        Data::Dense(DenseArray::Raw(raw))
    }
}

impl From<Nested> for Data {
    fn from(nested: Nested) -> Self {
        Data::Nested(nested)
    }
}

impl From<Scalar> for Data {
    fn from(scalar: Scalar) -> Self {
        Data::Scalar(scalar)
    }
}

impl<T: Into<Nested>> From<Vec<T>> for Data {
    fn from(items: Vec<T>) -> Self {
        Data::Nested(items.into())
    }
}

impl<T: Into<Nested>, const N: usize> From<[T; N]> for Data {
    fn from(items: [T; N]) -> Self {
        Data::Nested(items.into())
    }
}

macro_rules! data_from_host {
    ($($t:ty => $variant:ident),*) => {
        $(
            impl From<$t> for Data {
                fn from(v: $t) -> Self {
                    Data::Scalar(Scalar::from(v))
                }
            }

            impl<D: Dimension> From<ndarray::Array<$t, D>> for Data {
                fn from(array: ndarray::Array<$t, D>) -> Self {
                    Data::Dense(DenseArray::$variant(array.into_dyn()))
                }
            }
        )*
    };
}

data_from_host!(i32 => I32, i64 => I64, f32 => F32, f64 => F64);

/// Output of the normalizer: the decided kind and the instance built for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub kind: ConcreteKind,
    pub buffer: Instance,
}

/// Normalize construction inputs.
///
/// An explicit `shape` wins: it builds a zero-filled Float32 instance and
/// `data` is not looked at. Without a shape, `data` is required.
pub fn normalize(data: Option<Data>, shape: Option<&[usize]>) -> Result<Normalized> {
    if let Some(dims) = shape {
        return zeros(dims);
    }
    match data {
        Some(Data::Instance(instance)) => Ok(Normalized {
            kind: instance.kind(),
            buffer: instance,
        }),
        Some(Data::Dense(dense)) => from_dense(dense),
        Some(Data::Nested(nested)) => from_dense(nested.materialize()?),
        Some(Data::Scalar(scalar)) => from_scalar(scalar),
        None => Err(TensorError::InvalidConstruction(
            "either data or shape must be provided".into(),
        )),
    }
}

/// Zero-filled Float32 instance of the given shape.
pub fn zeros(dims: &[usize]) -> Result<Normalized> {
    let shape = Shape::new(dims)?;
    let kind = resolve(shape.ndim(), &ElementKind::Float32)?;
    debug!(%shape, %kind, "zero-initialising from explicit shape");
    let buffer = Instance::zeros(kind, &shape)?;
    Ok(Normalized { kind, buffer })
}

/// Accept a dense array, narrowing 64-bit storage to 32 bits.
pub fn from_dense(dense: DenseArray) -> Result<Normalized> {
    match dense {
        DenseArray::I32(array) => build(array),
        DenseArray::F32(array) => build(array),
        DenseArray::I64(array) => {
            debug!(from = "int64", to = "int32", numel = array.len(), "downcasting dense buffer");
            build(array.mapv(|v| v as i32))
        }
        DenseArray::F64(array) => {
            debug!(from = "float64", to = "float32", numel = array.len(), "downcasting dense buffer");
            build(array.mapv(|v| v as f32))
        }
        DenseArray::Raw(raw) => from_dense(raw.decode()?),
    }
}

fn from_scalar(scalar: Scalar) -> Result<Normalized> {
    let shape = Shape::new(&[1])?;
    let buffer = match scalar {
        Scalar::Int32(v) => Instance::from_vec(shape, vec![v])?,
        Scalar::Float32(v) => Instance::from_vec(shape, vec![v])?,
    };
    Ok(Normalized {
        kind: buffer.kind(),
        buffer,
    })
}

fn build<T: Element>(array: ArrayD<T>) -> Result<Normalized> {
    let shape = Shape::new(array.shape())?;
    let kind = resolve(shape.ndim(), &T::KIND)?;
    let data = array
        .as_slice()
        .map_or_else(|| array.iter().copied().collect(), <[T]>::to_vec);
    let buffer = Instance::from_vec(shape, data)?;
    Ok(Normalized { kind, buffer })
}
