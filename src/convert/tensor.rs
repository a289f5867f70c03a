use crate::axes::Axes;
use crate::error::{Error, Result};
use crate::ops::{OpGraph, OpId};
use crate::parser::{tensor_to_array, NodeWrapper};

use super::{constant_ints, first, normalize_axis, ConversionContext, Converter};

/// Axis indices from the constant `axes` input (opset 13 and later) or else the attribute
fn axes_operand(graph: &OpGraph, node: &NodeWrapper<'_>, inputs: &[OpId]) -> Result<Option<Vec<i64>>> {
    match inputs.get(1) {
        Some(&axes) => constant_ints(graph, node, axes).map(Some),
        None => node.get_ints("axes"),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Converter for Identity {
    fn arity(&self) -> (usize, usize) {
        (1, 1)
    }

    fn convert(
        &self,
        _ctx: &mut ConversionContext<'_>,
        _node: &NodeWrapper<'_>,
        inputs: &[OpId],
    ) -> Result<Vec<OpId>> {
        Ok(vec![first(inputs)?])
    }
}

/// Constant node carrying its value in the `value` attribute
#[derive(Debug, Clone, Copy, Default)]
pub struct Constant;

impl Converter for Constant {
    fn arity(&self) -> (usize, usize) {
        (0, 0)
    }

    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        node: &NodeWrapper<'_>,
        _inputs: &[OpId],
    ) -> Result<Vec<OpId>> {
        let tensor = node.get_tensor("value")?.ok_or_else(|| {
            Error::MissingField(format!(
                "{} node ({}) has no \"value\" attribute",
                node.op_type(),
                node.name()
            ))
        })?;
        let value = tensor_to_array(&tensor)?;
        let axes = ctx.graph.make_axes(value.shape(), "CONST")?;
        Ok(vec![ctx.graph.constant(value, axes)?])
    }
}

/// Permute axes by `perm`, reversing them by default
#[derive(Debug, Clone, Copy, Default)]
pub struct Transpose;

impl Converter for Transpose {
    fn arity(&self) -> (usize, usize) {
        (1, 1)
    }

    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        node: &NodeWrapper<'_>,
        inputs: &[OpId],
    ) -> Result<Vec<OpId>> {
        let x = first(inputs)?;
        let axes = ctx.graph.axes(x)?.clone();
        let permutation: Vec<usize> = match node.get_ints("perm")? {
            Some(perm) => perm
                .iter()
                .map(|&p| normalize_axis(node, p, axes.len()))
                .collect::<Result<_>>()?,
            None => (0..axes.len()).rev().collect(),
        };

        if permutation.len() != axes.len() {
            return Err(Error::InvalidAttribute(format!(
                "{} node ({}): perm {:?} does not match rank {}",
                node.op_type(),
                node.name(),
                permutation,
                axes.len()
            )));
        }
        let reordered = axes.select(&permutation).map_err(|_| {
            Error::InvalidAttribute(format!(
                "{} node ({}): perm {:?} is not a permutation",
                node.op_type(),
                node.name(),
                permutation
            ))
        })?;

        Ok(vec![ctx.graph.reorder(x, reordered)?])
    }
}

/// Remove length-1 axes listed in `axes`, or all of them when unset
#[derive(Debug, Clone, Copy, Default)]
pub struct Squeeze;

impl Converter for Squeeze {
    fn arity(&self) -> (usize, usize) {
        (1, 2)
    }

    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        node: &NodeWrapper<'_>,
        inputs: &[OpId],
    ) -> Result<Vec<OpId>> {
        let x = first(inputs)?;
        let axes = ctx.graph.axes(x)?.clone();

        let squeezed = match axes_operand(ctx.graph, node, inputs)? {
            Some(indices) => {
                let positions = indices
                    .iter()
                    .map(|&i| normalize_axis(node, i, axes.len()))
                    .collect::<Result<Vec<usize>>>()?;
                let selected = axes.select(&positions)?;
                if let Some(axis) = selected.iter().find(|a| a.length() != 1) {
                    return Err(Error::InvalidAttribute(format!(
                        "{} node ({}): axis {} does not have length 1",
                        node.op_type(),
                        node.name(),
                        axis
                    )));
                }
                selected
            }
            None => Axes::new(axes.iter().filter(|a| a.length() == 1).cloned().collect())?,
        };

        Ok(vec![ctx.graph.squeeze(x, squeezed)?])
    }
}

/// Insert length-1 axes at the output positions listed in `axes`
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsqueeze;

impl Converter for Unsqueeze {
    fn arity(&self) -> (usize, usize) {
        (1, 2)
    }

    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        node: &NodeWrapper<'_>,
        inputs: &[OpId],
    ) -> Result<Vec<OpId>> {
        let mut x = first(inputs)?;
        let indices = axes_operand(ctx.graph, node, inputs)?.ok_or_else(|| {
            Error::MissingField(format!(
                "{} node ({}) has neither an \"axes\" input nor attribute",
                node.op_type(),
                node.name()
            ))
        })?;

        let rank = ctx.graph.axes(x)?.len() + indices.len();
        let mut positions = indices
            .iter()
            .map(|&i| normalize_axis(node, i, rank))
            .collect::<Result<Vec<usize>>>()?;
        positions.sort_unstable();
        if positions.windows(2).any(|w| w[0] == w[1]) {
            return Err(Error::InvalidAttribute(format!(
                "{} node ({}): axes {:?} contain duplicates",
                node.op_type(),
                node.name(),
                indices
            )));
        }

        for position in positions {
            let axis = ctx.graph.make_axis(1, "UNSQUEEZE");
            x = ctx.graph.expand_dims(x, axis, position)?;
        }

        Ok(vec![x])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportOptions;
    use crate::proto::{AttributeProto, AttributeType, NodeProto};

    fn node(op_type: &str, ints: Option<(&str, Vec<i64>)>) -> NodeProto {
        NodeProto {
            op_type: op_type.to_string(),
            output: vec!["y".to_string()],
            attribute: ints
                .map(|(name, values)| AttributeProto {
                    name: name.to_string(),
                    r#type: AttributeType::Ints as i32,
                    ints: values,
                    ..Default::default()
                })
                .into_iter()
                .collect(),
            ..Default::default()
        }
    }

    fn output_lengths(converter: &dyn Converter, proto: &NodeProto, lengths: &[usize]) -> Result<Vec<usize>> {
        let mut graph = OpGraph::new();
        let axes = graph.make_axes(lengths, "X")?;
        let x = graph.placeholder(axes);
        let options = ImportOptions::default();
        let mut ctx = ConversionContext::new(&mut graph, &options);
        let y = converter.convert(&mut ctx, &NodeWrapper::new(proto, 11), &[x])?[0];
        Ok(graph.axes(y)?.lengths())
    }

    #[test]
    fn test_transpose() {
        let reversed = node("Transpose", None);
        assert_eq!(output_lengths(&Transpose, &reversed, &[2, 3, 4]).unwrap(), vec![4, 3, 2]);

        let perm = node("Transpose", Some(("perm", vec![0, 2, 1])));
        assert_eq!(output_lengths(&Transpose, &perm, &[2, 3, 4]).unwrap(), vec![2, 4, 3]);

        let bad = node("Transpose", Some(("perm", vec![0, 0, 1])));
        assert!(output_lengths(&Transpose, &bad, &[2, 3, 4]).is_err());
    }

    #[test]
    fn test_squeeze() {
        let all = node("Squeeze", None);
        assert_eq!(output_lengths(&Squeeze, &all, &[1, 3, 1]).unwrap(), vec![3]);

        let listed = node("Squeeze", Some(("axes", vec![-1])));
        assert_eq!(output_lengths(&Squeeze, &listed, &[1, 3, 1]).unwrap(), vec![1, 3]);

        let wrong = node("Squeeze", Some(("axes", vec![1])));
        assert!(matches!(
            output_lengths(&Squeeze, &wrong, &[1, 3, 1]),
            Err(Error::InvalidAttribute(_))
        ));
    }

    #[test]
    fn test_unsqueeze() {
        let proto = node("Unsqueeze", Some(("axes", vec![0, 3])));
        assert_eq!(output_lengths(&Unsqueeze, &proto, &[2, 3]).unwrap(), vec![1, 2, 3, 1]);

        let missing = node("Unsqueeze", None);
        assert!(matches!(
            output_lengths(&Unsqueeze, &missing, &[2, 3]),
            Err(Error::MissingField(_))
        ));
    }

    #[test]
    fn test_axes_given_as_input() {
        let mut graph = OpGraph::new();
        let axes = graph.make_axes(&[2, 3], "X").unwrap();
        let x = graph.placeholder(axes);
        let layout = graph.make_axes(&[2], "AXES").unwrap();
        let listed = graph.constant(ndarray::arr1(&[0.0f32, -1.0]).into_dyn(), layout).unwrap();
        let options = ImportOptions::default();

        let unsqueeze = node("Unsqueeze", None);
        let mut ctx = ConversionContext::new(&mut graph, &options);
        let y = Unsqueeze
            .convert(&mut ctx, &NodeWrapper::new(&unsqueeze, 13), &[x, listed])
            .unwrap()[0];
        assert_eq!(graph.axes(y).unwrap().lengths(), vec![1, 2, 3, 1]);

        let squeeze = node("Squeeze", None);
        let mut ctx = ConversionContext::new(&mut graph, &options);
        let z = Squeeze
            .convert(&mut ctx, &NodeWrapper::new(&squeeze, 13), &[y, listed])
            .unwrap()[0];
        assert_eq!(graph.axes(z).unwrap().lengths(), vec![2, 3]);

        let computed = graph.unary(crate::ops::UnaryOp::Abs, listed).unwrap();
        let mut ctx = ConversionContext::new(&mut graph, &options);
        let result = Unsqueeze.convert(&mut ctx, &NodeWrapper::new(&unsqueeze, 13), &[x, computed]);
        assert!(matches!(result, Err(Error::UnsupportedFeature(_))));
    }
}
