use strum::{Display, EnumIter, EnumString};

use crate::error::{Error, Result};
use crate::ops::{BinaryOp, OpGraph, OpId, UnaryOp};
use crate::parser::NodeWrapper;

use super::broadcast::{is_compatible_broadcast_shape, make_broadcast_binary};
use super::{first, ConversionContext, Converter};

/// Nonlinear activations built from element-wise primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum ActivationKind {
    Relu,
    LeakyRelu,
    PRelu,
    Selu,
    Elu,
    HardSigmoid,
    ThresholdedRelu,
    Softplus,
    Softsign,
}

#[derive(Debug, Clone, Copy)]
pub struct Activation(pub ActivationKind);

/// max(x, 0)
fn positive_part(graph: &mut OpGraph, x: OpId) -> Result<OpId> {
    let zero = graph.scalar(0.0);
    graph.maximum(x, zero)
}

/// min(x, 0)
fn negative_part(graph: &mut OpGraph, x: OpId) -> Result<OpId> {
    let zero = graph.scalar(0.0);
    graph.minimum(x, zero)
}

/// alpha * (exp(min(x, 0)) - 1)
fn exponential_negative_part(graph: &mut OpGraph, x: OpId, alpha: f32) -> Result<OpId> {
    let negative = negative_part(graph, x)?;
    let exp = graph.unary(UnaryOp::Exp, negative)?;
    let shifted = graph.shift(exp, -1.0)?;
    graph.scale(shifted, alpha)
}

impl Converter for Activation {
    fn arity(&self) -> (usize, usize) {
        match self.0 {
            ActivationKind::PRelu => (1, 2),
            _ => (1, 1),
        }
    }

    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        node: &NodeWrapper<'_>,
        inputs: &[OpId],
    ) -> Result<Vec<OpId>> {
        let graph = &mut *ctx.graph;
        let x = first(inputs)?;

        let output = match self.0 {
            ActivationKind::Relu => positive_part(graph, x)?,
            ActivationKind::LeakyRelu => {
                let alpha = node.get_float_or("alpha", 0.01)?;
                let positive = positive_part(graph, x)?;
                let negative = negative_part(graph, x)?;
                let negative = graph.scale(negative, alpha)?;
                graph.add(positive, negative)?
            }
            ActivationKind::PRelu => {
                let positive = positive_part(graph, x)?;
                let negative = negative_part(graph, x)?;
                let negative = match inputs.get(1) {
                    Some(&slope) => {
                        let x_shape = graph.axes(x)?.lengths();
                        let slope_shape = graph.axes(slope)?.lengths();
                        if !is_compatible_broadcast_shape(&slope_shape, &x_shape) {
                            return Err(Error::BroadcastMismatch(format!(
                                "{} node ({}): slope of shape {:?} does not broadcast to {:?}",
                                node.op_type(),
                                node.name(),
                                slope_shape,
                                x_shape
                            )));
                        }
                        make_broadcast_binary(graph, BinaryOp::Multiply, negative, slope)?
                    }
                    None => {
                        let slope = node.get_float_or("slope", 0.01)?;
                        graph.scale(negative, slope)?
                    }
                };
                graph.add(positive, negative)?
            }
            ActivationKind::Selu => {
                let alpha = node.get_float_or("alpha", 1.673_263_2)?;
                let gamma = node.get_float_or("gamma", 1.050_701)?;
                let positive = positive_part(graph, x)?;
                let negative = exponential_negative_part(graph, x, alpha)?;
                let sum = graph.add(positive, negative)?;
                graph.scale(sum, gamma)?
            }
            ActivationKind::Elu => {
                let alpha = node.get_float_or("alpha", 1.0)?;
                let positive = positive_part(graph, x)?;
                let negative = exponential_negative_part(graph, x, alpha)?;
                graph.add(positive, negative)?
            }
            ActivationKind::HardSigmoid => {
                let alpha = node.get_float_or("alpha", 0.2)?;
                let beta = node.get_float_or("beta", 0.5)?;
                let scaled = graph.scale(x, alpha)?;
                let linear = graph.shift(scaled, beta)?;
                let zero = graph.scalar(0.0);
                let one = graph.scalar(1.0);
                let lower = graph.maximum(linear, zero)?;
                graph.minimum(lower, one)?
            }
            ActivationKind::ThresholdedRelu => {
                let alpha = node.get_float_or("alpha", 1.0)?;
                let threshold = graph.scalar(alpha);
                let mask = graph.binary(BinaryOp::Greater, x, threshold)?;
                graph.multiply(x, mask)?
            }
            ActivationKind::Softplus => {
                let exp = graph.unary(UnaryOp::Exp, x)?;
                let shifted = graph.shift(exp, 1.0)?;
                graph.unary(UnaryOp::Log, shifted)?
            }
            ActivationKind::Softsign => {
                let magnitude = graph.unary(UnaryOp::Abs, x)?;
                let denominator = graph.shift(magnitude, 1.0)?;
                graph.divide(x, denominator)?
            }
        };

        Ok(vec![output])
    }
}
