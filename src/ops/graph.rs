use std::fmt;

use ndarray::ArrayD;
use strum::{Display, EnumIter, EnumString};

use crate::axes::{Axes, Axis};
use crate::error::{Error, Result};

/// Index of an op inside an [`OpGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub(crate) usize);

impl OpId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

/// Element-wise functions of one argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum UnaryOp {
    Neg,
    Abs,
    Exp,
    Log,
    Sqrt,
    Reciprocal,
    Ceil,
    Floor,
    Tanh,
    Sigmoid,
}

impl UnaryOp {
    pub fn apply(self, x: f32) -> f32 {
        match self {
            UnaryOp::Neg => -x,
            UnaryOp::Abs => x.abs(),
            UnaryOp::Exp => x.exp(),
            UnaryOp::Log => x.ln(),
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Reciprocal => 1.0 / x,
            UnaryOp::Ceil => x.ceil(),
            UnaryOp::Floor => x.floor(),
            UnaryOp::Tanh => x.tanh(),
            UnaryOp::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }
}

/// Element-wise functions of two arguments. Comparisons yield 1.0 or 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Maximum,
    Minimum,
    Equal,
    Greater,
    Less,
}

impl BinaryOp {
    pub fn apply(self, x: f32, y: f32) -> f32 {
        let truth = |b: bool| if b { 1.0 } else { 0.0 };
        match self {
            BinaryOp::Add => x + y,
            BinaryOp::Subtract => x - y,
            BinaryOp::Multiply => x * y,
            BinaryOp::Divide => x / y,
            BinaryOp::Power => x.powf(y),
            BinaryOp::Maximum => x.max(y),
            BinaryOp::Minimum => x.min(y),
            BinaryOp::Equal => truth(x == y),
            BinaryOp::Greater => truth(x > y),
            BinaryOp::Less => truth(x < y),
        }
    }
}

/// Reductions over a set of named axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum ReduceOp {
    Sum,
    Max,
    Min,
    Mean,
    Prod,
}

/// What an op computes
#[derive(Debug, Clone, PartialEq)]
pub enum OpKind {
    /// Value supplied when a computation is called
    Placeholder,
    Constant(ArrayD<f32>),
    Unary(UnaryOp),
    /// Operands are aligned by axis identity; missing axes broadcast
    Binary(BinaryOp),
    /// Contraction over every axis the two operands share
    Dot,
    Reduce { op: ReduceOp, axes: Axes },
    ExpandDims { axis: Axis, position: usize },
    /// Relabel axes without touching data
    CastAxes,
    /// Drop length-1 axes
    Squeeze { axes: Axes },
    /// Permute to the op's axes
    Reorder,
}

impl OpKind {
    pub fn label(&self) -> String {
        match self {
            OpKind::Placeholder => "Placeholder".to_string(),
            OpKind::Constant(_) => "Constant".to_string(),
            OpKind::Unary(op) => op.to_string(),
            OpKind::Binary(op) => op.to_string(),
            OpKind::Dot => "Dot".to_string(),
            OpKind::Reduce { op, .. } => format!("Reduce{}", op),
            OpKind::ExpandDims { .. } => "ExpandDims".to_string(),
            OpKind::CastAxes => "CastAxes".to_string(),
            OpKind::Squeeze { .. } => "Squeeze".to_string(),
            OpKind::Reorder => "Reorder".to_string(),
        }
    }
}

/// A node of the named-axis computation graph
#[derive(Debug, Clone, PartialEq)]
pub struct Op {
    pub id: OpId,
    pub name: Option<String>,
    pub kind: OpKind,
    pub args: Vec<OpId>,
    pub axes: Axes,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "<{}({}):{}>", self.kind.label(), name, self.id.0),
            None => write!(f, "<{}:{}>", self.kind.label(), self.id.0),
        }
    }
}

/// Arena of named-axis ops.
///
/// Ops are only ever appended and always refer to ops created before them, so
/// id order is a valid evaluation order.
#[derive(Debug, Clone, Default)]
pub struct OpGraph {
    ops: Vec<Op>,
    axis_counter: usize,
}

impl OpGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter()
    }

    pub fn op(&self, id: OpId) -> Result<&Op> {
        self.ops
            .get(id.0)
            .ok_or_else(|| Error::InvalidArgument(format!("{} does not belong to this graph", id)))
    }

    /// Output axes of an op
    pub fn axes(&self, id: OpId) -> Result<&Axes> {
        Ok(&self.op(id)?.axes)
    }

    /// Attach a display name to an op
    pub fn set_name(&mut self, id: OpId, name: impl Into<String>) -> Result<()> {
        let op = self
            .ops
            .get_mut(id.0)
            .ok_or_else(|| Error::InvalidArgument(format!("{} does not belong to this graph", id)))?;
        op.name = Some(name.into());
        Ok(())
    }

    /// Create an axis with a name no other axis of this graph uses
    pub fn make_axis(&mut self, length: usize, prefix: &str) -> Axis {
        let name = format!("{}_{}", prefix, self.axis_counter);
        self.axis_counter += 1;
        Axis::new(name, length)
    }

    /// Fresh axes for the given lengths
    pub fn make_axes(&mut self, lengths: &[usize], prefix: &str) -> Result<Axes> {
        let axes = lengths.iter().map(|&l| self.make_axis(l, prefix)).collect();
        Axes::new(axes)
    }

    pub(crate) fn push(&mut self, kind: OpKind, args: Vec<OpId>, axes: Axes) -> OpId {
        let id = OpId(self.ops.len());
        self.ops.push(Op { id, name: None, kind, args, axes });
        id
    }

    /// Input fed at call time
    pub fn placeholder(&mut self, axes: Axes) -> OpId {
        self.push(OpKind::Placeholder, Vec::new(), axes)
    }

    /// Constant tensor laid out along `axes`
    pub fn constant(&mut self, value: ArrayD<f32>, axes: Axes) -> Result<OpId> {
        if value.shape() != axes.lengths().as_slice() {
            return Err(Error::ShapeMismatch(format!(
                "constant of shape {:?} cannot take axes {}",
                value.shape(),
                axes
            )));
        }
        Ok(self.push(OpKind::Constant(value), Vec::new(), axes))
    }

    pub fn scalar(&mut self, value: f32) -> OpId {
        self.push(
            OpKind::Constant(ndarray::arr0(value).into_dyn()),
            Vec::new(),
            Axes::scalar(),
        )
    }
}
