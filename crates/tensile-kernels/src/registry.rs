//! Static kernel registry.
//!
//! Kernels are looked up by a [`KernelKey`]: the operation plus the tags of
//! its operands. The table is a single `match`, so the set of supported
//! combinations is fixed at compile time and anything not listed is a miss.

use std::fmt;

use smallvec::SmallVec;
use tensile_core::{ConcreteKind, ElementKind, Rank, Result, Scalar, TensorError};

use crate::instance::Instance;
use crate::kernels::{elementwise, layout, linalg, math, reduce};

/// Right-hand operand of a binary kernel.
#[derive(Debug, Clone, Copy)]
pub enum NativeOperand<'a> {
    Array(&'a Instance),
    Scalar(Scalar),
}

impl NativeOperand<'_> {
    pub fn tag(&self) -> OperandTag {
        match self {
            NativeOperand::Array(inst) => OperandTag::Array(inst.kind()),
            NativeOperand::Scalar(s) => OperandTag::Scalar(s.kind()),
        }
    }
}

/// Registered operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Multiply,
    Dot,
    Transpose,
    Log,
    Exp,
    Pow,
    Sum,
    Argmax(ElementKind),
    FlattenKeepBatch,
    /// Reshape into the given target rank.
    Reshape(Rank),
}

impl Op {
    pub fn name(&self) -> String {
        match self {
            Op::Add => "add".into(),
            Op::Multiply => "multiply".into(),
            Op::Dot => "dot".into(),
            Op::Transpose => "transpose".into(),
            Op::Log => "log".into(),
            Op::Exp => "exp".into(),
            Op::Pow => "pow".into(),
            Op::Sum => "sum".into(),
            Op::Argmax(kind) => format!("argmax_{}", kind.tag()),
            Op::FlattenKeepBatch => "flatten_keep_batch".into(),
            Op::Reshape(rank) => format!("reshape{}", rank.get()),
        }
    }
}

/// What a key records about one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandTag {
    /// A native array, tagged by rank and element kind (`matrixf`).
    Array(ConcreteKind),
    /// A host scalar, tagged by element kind only (`f`).
    Scalar(ElementKind),
}

impl fmt::Display for OperandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandTag::Array(kind) => write!(f, "{}", kind.tag()),
            OperandTag::Scalar(kind) => write!(f, "{}", kind.tag()),
        }
    }
}

/// Registry key. Renders as e.g. `add_matrixf_vectorf` or `multiply_vectorf_f`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelKey {
    pub op: Op,
    pub operands: SmallVec<[OperandTag; 2]>,
}

impl KernelKey {
    /// Key for an operation routed to one kernel whatever its operands.
    pub fn fixed(op: Op) -> Self {
        Self {
            op,
            operands: SmallVec::new(),
        }
    }

    pub fn binary(op: Op, lhs: OperandTag, rhs: OperandTag) -> Self {
        let mut operands = SmallVec::new();
        operands.push(lhs);
        operands.push(rhs);
        Self { op, operands }
    }

    /// Identifier of the kernel this key names.
    pub fn identifier(&self) -> String {
        let mut id = self.op.name();
        for tag in &self.operands {
            id.push('_');
            id.push_str(&tag.to_string());
        }
        id
    }
}

impl fmt::Display for KernelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

pub type BinaryKernel = fn(&Instance, NativeOperand<'_>) -> Result<Instance>;
pub type PairKernel = fn(&Instance, &Instance) -> Result<Instance>;
pub type UnaryKernel = fn(&Instance) -> Result<Instance>;
pub type PowerKernel = fn(&Instance, i32) -> Result<Instance>;
pub type AxisKernel = fn(&Instance, usize) -> Result<Instance>;
pub type ReshapeKernel = fn(&Instance, &[i64]) -> Result<Instance>;

/// A registered kernel, by call signature.
#[derive(Clone, Copy)]
pub enum Kernel {
    Binary(BinaryKernel),
    Pair(PairKernel),
    Unary(UnaryKernel),
    Power(PowerKernel),
    Axis(AxisKernel),
    Reshape(ReshapeKernel),
}

impl Kernel {
    pub fn binary(self) -> Option<BinaryKernel> {
        match self {
            Kernel::Binary(k) => Some(k),
            _ => None,
        }
    }

    pub fn pair(self) -> Option<PairKernel> {
        match self {
            Kernel::Pair(k) => Some(k),
            _ => None,
        }
    }

    pub fn unary(self) -> Option<UnaryKernel> {
        match self {
            Kernel::Unary(k) => Some(k),
            _ => None,
        }
    }

    pub fn power(self) -> Option<PowerKernel> {
        match self {
            Kernel::Power(k) => Some(k),
            _ => None,
        }
    }

    pub fn axis(self) -> Option<AxisKernel> {
        match self {
            Kernel::Axis(k) => Some(k),
            _ => None,
        }
    }

    pub fn reshape(self) -> Option<ReshapeKernel> {
        match self {
            Kernel::Reshape(k) => Some(k),
            _ => None,
        }
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kernel::Binary(_) => "Binary",
            Kernel::Pair(_) => "Pair",
            Kernel::Unary(_) => "Unary",
            Kernel::Power(_) => "Power",
            Kernel::Axis(_) => "Axis",
            Kernel::Reshape(_) => "Reshape",
        };
        write!(f, "Kernel::{name}")
    }
}

/// Find the kernel registered for `key`.
pub fn lookup(key: &KernelKey) -> Option<Kernel> {
    use OperandTag::{Array, Scalar};

    let kernel = match (key.op, key.operands.as_slice()) {
        (Op::Add, [Array(lhs), Array(rhs)]) if same_kind(lhs, rhs) || row_bias(lhs, rhs) => {
            Kernel::Binary(elementwise::add)
        }
        (Op::Add, [Array(lhs), Scalar(rhs)]) if scalar_fits(lhs, *rhs) => {
            Kernel::Binary(elementwise::add)
        }
        (Op::Multiply, [Array(lhs), Array(rhs)]) if same_kind(lhs, rhs) => {
            Kernel::Binary(elementwise::multiply)
        }
        (Op::Multiply, [Array(lhs), Scalar(rhs)]) if scalar_fits(lhs, *rhs) => {
            Kernel::Binary(elementwise::multiply)
        }
        (Op::Dot, []) => Kernel::Pair(linalg::dot),
        (Op::Transpose, []) => Kernel::Unary(linalg::transpose),
        (Op::Log, []) => Kernel::Unary(math::log),
        (Op::Exp, []) => Kernel::Unary(math::exp),
        (Op::Pow, []) => Kernel::Power(math::pow),
        (Op::Sum, []) => Kernel::Axis(reduce::sum),
        (Op::Argmax(ElementKind::Int32), []) => Kernel::Unary(reduce::argmax_i),
        (Op::Argmax(ElementKind::Float32), []) => Kernel::Unary(reduce::argmax_f),
        (Op::FlattenKeepBatch, []) => Kernel::Unary(layout::flatten_keep_batch),
        (Op::Reshape(Rank::One), []) => Kernel::Reshape(reshape1),
        (Op::Reshape(Rank::Two), []) => Kernel::Reshape(reshape2),
        (Op::Reshape(Rank::Three), []) => Kernel::Reshape(reshape3),
        (Op::Reshape(Rank::Four), []) => Kernel::Reshape(reshape4),
        _ => {
            tracing::trace!(kernel = %key, "no kernel registered");
            return None;
        }
    };
    Some(kernel)
}

fn reshape1(input: &Instance, dims: &[i64]) -> Result<Instance> {
    input.reshape1(target_dims(input, dims)?)
}

fn reshape2(input: &Instance, dims: &[i64]) -> Result<Instance> {
    input.reshape2(target_dims(input, dims)?)
}

fn reshape3(input: &Instance, dims: &[i64]) -> Result<Instance> {
    input.reshape3(target_dims(input, dims)?)
}

fn reshape4(input: &Instance, dims: &[i64]) -> Result<Instance> {
    input.reshape4(target_dims(input, dims)?)
}

/// A reshape kernel only accepts targets of the rank it is keyed by.
fn target_dims<const R: usize>(input: &Instance, dims: &[i64]) -> Result<[i64; R]> {
    dims.try_into().map_err(|_| TensorError::ReshapeSizeMismatch {
        numel: input.numel(),
        shape: dims.to_vec(),
    })
}

fn same_kind(lhs: &ConcreteKind, rhs: &ConcreteKind) -> bool {
    lhs == rhs
}

/// Matrix plus a vector of the same element kind, added to every row.
fn row_bias(lhs: &ConcreteKind, rhs: &ConcreteKind) -> bool {
    lhs.rank == Rank::Two && rhs.rank == Rank::One && lhs.element == rhs.element
}

/// Scalars of the array's own kind are accepted, and Int32 scalars also
/// apply to Float32 arrays.
fn scalar_fits(lhs: &ConcreteKind, rhs: ElementKind) -> bool {
    lhs.element == rhs || (lhs.element == ElementKind::Float32 && rhs == ElementKind::Int32)
}
