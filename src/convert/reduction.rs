use strum::{Display, EnumIter, EnumString};

use crate::axes::{Axes, Axis};
use crate::error::{Error, Result};
use crate::ops::{OpGraph, OpId, ReduceOp, UnaryOp};
use crate::parser::NodeWrapper;

use super::{constant_ints, first, normalize_axis, ConversionContext, Converter};

/// Axes a reduction node reduces over.
///
/// The `axes` attribute lists positions into the input, negative values counting
/// from the end. Without the attribute every axis is reduced.
pub fn get_reduction_axes(node: &NodeWrapper<'_>, input_axes: &Axes) -> Result<Axes> {
    match node.get_ints("axes")? {
        Some(indices) => select_axes(node, &indices, input_axes),
        None => Ok(input_axes.clone()),
    }
}

fn select_axes(node: &NodeWrapper<'_>, indices: &[i64], input_axes: &Axes) -> Result<Axes> {
    let positions = indices
        .iter()
        .map(|&axis| normalize_axis(node, axis, input_axes.len()))
        .collect::<Result<Vec<usize>>>()?;

    input_axes.select(&positions).map_err(|_| {
        Error::InvalidAttribute(format!(
            "{} node ({}): axes {:?} contain duplicates",
            node.op_type(),
            node.name(),
            indices
        ))
    })
}

/// Build a reduction and honour `keepdims`.
///
/// `inputs` holds the data and, from opset 13 (ReduceSum) or 18 (the other
/// reductions), an optional constant `axes` input that replaces the attribute.
/// An empty `axes` input reduces everything unless `noop_with_empty_axes` is
/// set, in which case the data passes through.
///
/// `reduce` receives the input and the axes to reduce. When `keepdims` is set
/// (the default) every reduced axis is put back with length 1 at its original
/// position.
pub fn make_reduction_op<F>(
    graph: &mut OpGraph,
    node: &NodeWrapper<'_>,
    inputs: &[OpId],
    reduce: F,
) -> Result<OpId>
where
    F: FnOnce(&mut OpGraph, OpId, Axes) -> Result<OpId>,
{
    let input = first(inputs)?;
    let input_axes = graph.axes(input)?.clone();
    let reduction_axes = match inputs.get(1) {
        Some(&axes_input) => {
            let indices = constant_ints(graph, node, axes_input)?;
            if indices.is_empty() {
                if node.get_int_or("noop_with_empty_axes", 0)? != 0 {
                    return Ok(input);
                }
                input_axes.clone()
            } else {
                select_axes(node, &indices, &input_axes)?
            }
        }
        None => get_reduction_axes(node, &input_axes)?,
    };
    let mut op = reduce(graph, input, reduction_axes.clone())?;

    if node.get_int_or("keepdims", 1)? != 0 {
        let mut positions: Vec<usize> = reduction_axes
            .iter()
            .filter_map(|axis| input_axes.index_of(axis))
            .collect();
        positions.sort_unstable();

        for position in positions {
            let axis = Axis::new(input_axes[position].name(), 1);
            op = graph.expand_dims(op, axis, position)?;
        }
    }

    Ok(op)
}

/// ONNX reduction operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum ReductionKind {
    ReduceSum,
    ReduceMax,
    ReduceMin,
    ReduceMean,
    ReduceProd,
    ReduceSumSquare,
    ReduceL1,
    ReduceL2,
    ReduceLogSum,
    ReduceLogSumExp,
}

impl ReductionKind {
    fn build(self, graph: &mut OpGraph, x: OpId, axes: Axes) -> Result<OpId> {
        match self {
            Self::ReduceSum => graph.reduce(ReduceOp::Sum, x, axes),
            Self::ReduceMax => graph.reduce(ReduceOp::Max, x, axes),
            Self::ReduceMin => graph.reduce(ReduceOp::Min, x, axes),
            Self::ReduceMean => graph.reduce(ReduceOp::Mean, x, axes),
            Self::ReduceProd => graph.reduce(ReduceOp::Prod, x, axes),
            Self::ReduceSumSquare => {
                let squared = graph.multiply(x, x)?;
                graph.sum(squared, axes)
            }
            Self::ReduceL1 => {
                let magnitude = graph.unary(UnaryOp::Abs, x)?;
                graph.sum(magnitude, axes)
            }
            Self::ReduceL2 => {
                let squared = graph.multiply(x, x)?;
                let total = graph.sum(squared, axes)?;
                graph.unary(UnaryOp::Sqrt, total)
            }
            Self::ReduceLogSum => {
                let total = graph.sum(x, axes)?;
                graph.unary(UnaryOp::Log, total)
            }
            Self::ReduceLogSumExp => {
                // Shift by the maximum so exp cannot overflow
                let peak = graph.max(x, axes.clone())?;
                let shifted = graph.subtract(x, peak)?;
                let exp = graph.unary(UnaryOp::Exp, shifted)?;
                let total = graph.sum(exp, axes)?;
                let log = graph.unary(UnaryOp::Log, total)?;
                graph.add(log, peak)
            }
        }
    }
}

/// First opset whose Softmax normalizes over a single axis
pub const SINGLE_AXIS_SOFTMAX_OPSET: i64 = 13;

#[derive(Debug, Clone, Copy)]
pub struct Reduction(pub ReductionKind);

impl Converter for Reduction {
    fn arity(&self) -> (usize, usize) {
        (1, 2)
    }

    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        node: &NodeWrapper<'_>,
        inputs: &[OpId],
    ) -> Result<Vec<OpId>> {
        let kind = self.0;
        let op = make_reduction_op(ctx.graph, node, inputs, |graph, x, axes| {
            kind.build(graph, x, axes)
        })?;
        Ok(vec![op])
    }
}

/// Softmax and LogSoftmax.
///
/// Before opset 13 the input is treated as a matrix split at `axis` (default 1)
/// and normalized over every axis from `axis` on. From opset 13 only the single
/// `axis` (default -1) is normalized.
#[derive(Debug, Clone, Copy)]
pub struct Softmax {
    pub log: bool,
}

impl Converter for Softmax {
    fn arity(&self) -> (usize, usize) {
        (1, 1)
    }

    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        node: &NodeWrapper<'_>,
        inputs: &[OpId],
    ) -> Result<Vec<OpId>> {
        let graph = &mut *ctx.graph;
        let x = first(inputs)?;
        let input_axes = graph.axes(x)?.clone();
        let axes = if node.opset_version() >= SINGLE_AXIS_SOFTMAX_OPSET {
            let axis = normalize_axis(node, node.get_int_or("axis", -1)?, input_axes.len())?;
            input_axes.select(&[axis])?
        } else {
            let axis = normalize_axis(node, node.get_int_or("axis", 1)?, input_axes.len())?;
            let positions: Vec<usize> = (axis..input_axes.len()).collect();
            input_axes.select(&positions)?
        };

        let peak = graph.max(x, axes.clone())?;
        let shifted = graph.subtract(x, peak)?;
        let exp = graph.unary(UnaryOp::Exp, shifted)?;
        let total = graph.sum(exp, axes)?;

        let output = if self.log {
            let log_total = graph.unary(UnaryOp::Log, total)?;
            graph.subtract(shifted, log_total)?
        } else {
            graph.divide(exp, total)?
        };
        Ok(vec![output])
    }
}
