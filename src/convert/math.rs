use log::warn;
use strum::{Display, EnumIter, EnumString};

use crate::axes::Axes;
use crate::config::ImportOptions;
use crate::error::{Error, Result};
use crate::ops::{BinaryOp, OpId, UnaryOp};
use crate::parser::NodeWrapper;

use super::broadcast::{
    is_compatible_broadcast_shape, make_broadcast_binary, verify_axes_binary_broadcast_compatible,
    MULTIDIRECTIONAL_BROADCAST_OPSET,
};
use super::matmul::cast_axes_for_matmul;
use super::{first, input, ConversionContext, Converter};

/// Element-wise function of one input
#[derive(Debug, Clone, Copy)]
pub struct Unary(pub UnaryOp);

impl Converter for Unary {
    fn arity(&self) -> (usize, usize) {
        (1, 1)
    }

    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        _node: &NodeWrapper<'_>,
        inputs: &[OpId],
    ) -> Result<Vec<OpId>> {
        Ok(vec![ctx.graph.unary(self.0, first(inputs)?)?])
    }
}

/// Element-wise function of two inputs with ONNX broadcasting
#[derive(Debug, Clone, Copy)]
pub struct Binary(pub BinaryOp);

impl Converter for Binary {
    fn arity(&self) -> (usize, usize) {
        (2, 2)
    }

    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        node: &NodeWrapper<'_>,
        inputs: &[OpId],
    ) -> Result<Vec<OpId>> {
        let (left, right) = (input(inputs, 0)?, input(inputs, 1)?);
        let left_axes = ctx.graph.axes(left)?.clone();
        let right_axes = ctx.graph.axes(right)?.clone();
        verify_axes_binary_broadcast_compatible(node, &left_axes, &right_axes, ctx.options)?;

        Ok(vec![make_broadcast_binary(ctx.graph, self.0, left, right)?])
    }
}

/// Element-wise ops taking any number of inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum VariadicKind {
    Sum,
    Mean,
    Max,
    Min,
}

#[derive(Debug, Clone, Copy)]
pub struct Variadic(pub VariadicKind);

impl Converter for Variadic {
    fn arity(&self) -> (usize, usize) {
        (1, usize::MAX)
    }

    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        _node: &NodeWrapper<'_>,
        inputs: &[OpId],
    ) -> Result<Vec<OpId>> {
        let op = match self.0 {
            VariadicKind::Sum | VariadicKind::Mean => BinaryOp::Add,
            VariadicKind::Max => BinaryOp::Maximum,
            VariadicKind::Min => BinaryOp::Minimum,
        };

        let mut result = first(inputs)?;
        for &input in &inputs[1..] {
            result = make_broadcast_binary(ctx.graph, op, result, input)?;
        }

        if self.0 == VariadicKind::Mean && inputs.len() > 1 {
            result = ctx.graph.scale(result, 1.0 / inputs.len() as f32)?;
        }

        Ok(vec![result])
    }
}

/// Matrix product of operands of rank 1 or 2
#[derive(Debug, Clone, Copy, Default)]
pub struct MatMul;

impl Converter for MatMul {
    fn arity(&self) -> (usize, usize) {
        (2, 2)
    }

    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        node: &NodeWrapper<'_>,
        inputs: &[OpId],
    ) -> Result<Vec<OpId>> {
        let (left, right) = (input(inputs, 0)?, input(inputs, 1)?);
        for &operand in &[left, right] {
            let rank = ctx.graph.axes(operand)?.len();
            if rank > 2 {
                return Err(Error::UnsupportedFeature(format!(
                    "{} node ({}): operands of rank {} (batched matrix multiplication) are not supported",
                    node.op_type(),
                    node.name(),
                    rank
                )));
            }
        }

        let (left, right) = cast_axes_for_matmul(ctx.graph, left, right)?;
        Ok(vec![ctx.graph.dot(left, right)?])
    }
}

/// General matrix multiplication: `alpha * A' * B' + beta * C`
#[derive(Debug, Clone, Copy, Default)]
pub struct Gemm;

impl Converter for Gemm {
    fn arity(&self) -> (usize, usize) {
        (2, 3)
    }

    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        node: &NodeWrapper<'_>,
        inputs: &[OpId],
    ) -> Result<Vec<OpId>> {
        let graph = &mut *ctx.graph;
        let mut operands = [input(inputs, 0)?, input(inputs, 1)?];

        for (operand, flag) in operands.iter_mut().zip(["transA", "transB"]) {
            let axes = graph.axes(*operand)?.clone();
            if axes.len() != 2 {
                return Err(Error::ShapeMismatch(format!(
                    "{} node ({}): inputs A and B must be matrices, got {}",
                    node.op_type(),
                    node.name(),
                    axes
                )));
            }
            if node.get_int_or(flag, 0)? != 0 {
                *operand = graph.reorder(*operand, axes.select(&[1, 0])?)?;
            }
        }

        let (a, b) = cast_axes_for_matmul(graph, operands[0], operands[1])?;
        let mut output = graph.dot(a, b)?;

        let alpha = node.get_float_or("alpha", 1.0)?;
        if alpha != 1.0 {
            output = graph.scale(output, alpha)?;
        }

        if let Some(&c) = inputs.get(2) {
            let beta = node.get_float_or("beta", 1.0)?;
            let output_axes = graph.axes(output)?.clone();
            let c_axes = graph.axes(c)?.clone();
            verify_gemm_bias(node, &output_axes, &c_axes, ctx.options)?;

            let c = if beta != 1.0 { graph.scale(c, beta)? } else { c };
            output = make_broadcast_binary(graph, BinaryOp::Add, output, c)?;
        }

        Ok(vec![output])
    }
}

/// C broadcasts one way only, onto the `(M, N)` product.
///
/// Before opset 7 a C of another shape also needs `broadcast=1`; a missing flag
/// is handled as for binary ops.
fn verify_gemm_bias(node: &NodeWrapper<'_>, output: &Axes, c: &Axes, options: &ImportOptions) -> Result<()> {
    let (output_shape, c_shape) = (output.lengths(), c.lengths());
    if c_shape == output_shape {
        return Ok(());
    }

    if node.opset_version() < MULTIDIRECTIONAL_BROADCAST_OPSET && node.get_int_or("broadcast", 0)? == 0 {
        warn!(
            "{} node ({}) broadcasts C of shape {:?} without broadcast=1",
            node.op_type(),
            node.name(),
            c_shape
        );
        if options.strict_broadcast_flag {
            return Err(Error::BroadcastMismatch(format!(
                "{} node ({}): C of shape {:?} differs from {:?} and broadcast is not set",
                node.op_type(),
                node.name(),
                c_shape,
                output_shape
            )));
        }
    }

    if !is_compatible_broadcast_shape(&c_shape, &output_shape) {
        return Err(Error::BroadcastMismatch(format!(
            "{} node ({}): C of shape {:?} does not broadcast to {:?}",
            node.op_type(),
            node.name(),
            c_shape,
            output_shape
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::OpGraph;
    use crate::proto::NodeProto;

    fn node(op_type: &str) -> NodeProto {
        NodeProto {
            op_type: op_type.to_string(),
            name: op_type.to_lowercase(),
            output: vec!["y".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_batched_matmul_rejected() {
        let mut graph = OpGraph::new();
        let a = graph.make_axes(&[2, 3, 4], "A").unwrap();
        let b = graph.make_axes(&[4, 5], "B").unwrap();
        let a = graph.placeholder(a);
        let b = graph.placeholder(b);
        let options = ImportOptions::default();
        let proto = node("MatMul");
        let mut ctx = ConversionContext::new(&mut graph, &options);
        let result = MatMul.convert(&mut ctx, &NodeWrapper::new(&proto, 9), &[a, b]);
        assert!(matches!(result, Err(Error::UnsupportedFeature(_))));
    }

    #[test]
    fn test_binary_result_is_positional() {
        let mut graph = OpGraph::new();
        let a = graph.make_axes(&[2, 3], "A").unwrap();
        let b = graph.make_axes(&[3], "B").unwrap();
        let a = graph.placeholder(a);
        let b = graph.placeholder(b);
        let options = ImportOptions::default();
        let proto = node("Add");
        let mut ctx = ConversionContext::new(&mut graph, &options);
        let y = Binary(BinaryOp::Add)
            .convert(&mut ctx, &NodeWrapper::new(&proto, 7), &[b, a])
            .unwrap()[0];
        assert_eq!(graph.axes(y).unwrap().lengths(), vec![2, 3]);
    }

    #[test]
    fn test_missing_operand_is_an_error() {
        let mut graph = OpGraph::new();
        let a = graph.make_axes(&[2, 3], "A").unwrap();
        let a = graph.placeholder(a);
        let options = ImportOptions::default();
        let proto = node("Add");
        let wrapper = NodeWrapper::new(&proto, 7);
        let mut ctx = ConversionContext::new(&mut graph, &options);

        assert!(matches!(Binary(BinaryOp::Add).convert(&mut ctx, &wrapper, &[a]), Err(Error::InvalidModel(_))));
        assert!(matches!(MatMul.convert(&mut ctx, &wrapper, &[a]), Err(Error::InvalidModel(_))));
        assert!(matches!(Gemm.convert(&mut ctx, &wrapper, &[]), Err(Error::InvalidModel(_))));
    }

    #[test]
    fn test_gemm_bias_broadcasts_one_way() {
        let mut graph = OpGraph::new();
        let operand = |graph: &mut OpGraph, lengths: &[usize]| {
            let axes = graph.make_axes(lengths, "G").unwrap();
            graph.placeholder(axes)
        };
        let a = operand(&mut graph, &[2, 3]);
        let b = operand(&mut graph, &[3, 1]);
        let wide_c = operand(&mut graph, &[2, 3]);
        let column_c = operand(&mut graph, &[2, 1]);
        let options = ImportOptions::default();
        let proto = node("Gemm");
        let wrapper = NodeWrapper::new(&proto, 7);

        // [2, 3] and [2, 1] are NumPy compatible, but C may not widen the product
        let mut ctx = ConversionContext::new(&mut graph, &options);
        let result = Gemm.convert(&mut ctx, &wrapper, &[a, b, wide_c]);
        assert!(matches!(result, Err(Error::BroadcastMismatch(_))));

        let mut ctx = ConversionContext::new(&mut graph, &options);
        let y = Gemm.convert(&mut ctx, &wrapper, &[a, b, column_c]).unwrap()[0];
        assert_eq!(graph.axes(y).unwrap().lengths(), vec![2, 1]);

        let row = operand(&mut graph, &[1]);
        let legacy = NodeWrapper::new(&proto, 6);
        let mut ctx = ConversionContext::new(&mut graph, &options);
        let result = Gemm.convert(&mut ctx, &legacy, &[a, b, row]);
        assert!(matches!(result, Err(Error::BroadcastMismatch(_))));
    }

    #[test]
    fn test_variadic_names() {
        assert_eq!(VariadicKind::Sum.to_string(), "Sum");
        assert_eq!("Mean".parse::<VariadicKind>().unwrap(), VariadicKind::Mean);
    }
}
