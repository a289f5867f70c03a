use std::collections::{BTreeSet, HashMap};

use log::debug;
use ndarray::{ArrayD, Axis as ArrayAxis, Zip};

use crate::axes::Axes;
use crate::error::{Error, Result};
use crate::ops::{Op, OpGraph, OpId, OpKind, ReduceOp};

/// Builds executable computations from an [`OpGraph`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Transformer;

impl Transformer {
    pub fn new() -> Self {
        Self
    }

    /// Prepare a computation of `output` taking `inputs` as its arguments.
    ///
    /// Every placeholder that `output` depends on must be listed in `inputs`.
    pub fn computation<'g>(
        &self,
        graph: &'g OpGraph,
        output: OpId,
        inputs: &[OpId],
    ) -> Result<Computation<'g>> {
        for &input in inputs {
            let op = graph.op(input)?;
            if op.kind != OpKind::Placeholder {
                return Err(Error::InvalidArgument(format!("{} is not a placeholder", op)));
            }
        }

        let schedule = Self::schedule(graph, output)?;

        for &id in &schedule {
            let op = graph.op(id)?;
            if op.kind == OpKind::Placeholder && !inputs.contains(&id) {
                return Err(Error::InvalidArgument(format!(
                    "placeholder {} is required by the output but not given as an input",
                    op
                )));
            }
        }

        debug!("Scheduled {} ops for computation of {}", schedule.len(), output);

        Ok(Computation {
            graph,
            output,
            inputs: inputs.to_vec(),
            schedule,
        })
    }

    /// Ops reachable from `output`, in id order
    fn schedule(graph: &OpGraph, output: OpId) -> Result<Vec<OpId>> {
        let mut reachable = BTreeSet::new();
        let mut stack = vec![output];

        while let Some(id) = stack.pop() {
            if reachable.insert(id) {
                stack.extend(graph.op(id)?.args.iter().copied());
            }
        }

        Ok(reachable.into_iter().collect())
    }
}

/// An output of an op graph bound to its input placeholders
#[derive(Debug, Clone)]
pub struct Computation<'g> {
    graph: &'g OpGraph,
    output: OpId,
    inputs: Vec<OpId>,
    schedule: Vec<OpId>,
}

impl<'g> Computation<'g> {
    pub fn output(&self) -> OpId {
        self.output
    }

    pub fn inputs(&self) -> &[OpId] {
        &self.inputs
    }

    /// Evaluate the output for one value per input placeholder.
    ///
    /// The result is laid out along the output op's axes.
    pub fn call(&self, args: &[ArrayD<f32>]) -> Result<ArrayD<f32>> {
        if args.len() != self.inputs.len() {
            return Err(Error::InvalidArgument(format!(
                "computation takes {} arguments, got {}",
                self.inputs.len(),
                args.len()
            )));
        }

        let mut values: HashMap<OpId, ArrayD<f32>> = HashMap::new();

        for (&input, arg) in self.inputs.iter().zip(args) {
            let expected = self.graph.axes(input)?.lengths();
            if arg.shape() != expected.as_slice() {
                return Err(Error::ShapeMismatch(format!(
                    "argument for {} has shape {:?}, expected {:?}",
                    self.graph.op(input)?,
                    arg.shape(),
                    expected
                )));
            }
            values.insert(input, arg.clone());
        }

        for &id in &self.schedule {
            let op = self.graph.op(id)?;
            if op.kind == OpKind::Placeholder {
                continue;
            }
            let value = self.evaluate(op, &values)?;
            values.insert(id, value);
        }

        values
            .remove(&self.output)
            .ok_or_else(|| Error::InvalidArgument(format!("{} was not computed", self.output)))
    }

    fn argument<'v>(
        &self,
        op: &Op,
        index: usize,
        values: &'v HashMap<OpId, ArrayD<f32>>,
    ) -> Result<(&'v ArrayD<f32>, &'g Axes)> {
        let id = *op.args.get(index).ok_or_else(|| {
            Error::InvalidArgument(format!("{} is missing argument {}", op, index))
        })?;
        let value = values
            .get(&id)
            .ok_or_else(|| Error::InvalidArgument(format!("{} has no value yet", id)))?;
        Ok((value, self.graph.axes(id)?))
    }

    fn evaluate(&self, op: &Op, values: &HashMap<OpId, ArrayD<f32>>) -> Result<ArrayD<f32>> {
        match &op.kind {
            OpKind::Placeholder => Err(Error::InvalidArgument(format!("{} is unbound", op))),
            OpKind::Constant(value) => Ok(value.clone()),
            OpKind::Unary(unary) => {
                let (x, _) = self.argument(op, 0, values)?;
                Ok(x.mapv(|v| unary.apply(v)))
            }
            OpKind::Binary(binary) => {
                let (x, x_axes) = self.argument(op, 0, values)?;
                let (y, y_axes) = self.argument(op, 1, values)?;
                let left = align(x, x_axes, &op.axes)?;
                let right = align(y, y_axes, &op.axes)?;
                Ok(Zip::from(&left).and(&right).map_collect(|&a, &b| binary.apply(a, b)))
            }
            OpKind::Dot => {
                let (x, x_axes) = self.argument(op, 0, values)?;
                let (y, y_axes) = self.argument(op, 1, values)?;
                tensordot(x, x_axes, y, y_axes)
            }
            OpKind::Reduce { op: reduction, axes } => {
                let (x, x_axes) = self.argument(op, 0, values)?;
                reduce(x, x_axes, *reduction, axes)
            }
            OpKind::ExpandDims { position, .. } => {
                let (x, _) = self.argument(op, 0, values)?;
                let expanded = x.view().insert_axis(ArrayAxis(*position));
                let shape = op.axes.lengths();
                let broadcast = expanded.broadcast(shape.as_slice()).ok_or_else(|| {
                    Error::ShapeMismatch(format!("cannot expand {:?} to {:?}", x.shape(), shape))
                })?;
                Ok(broadcast.to_owned())
            }
            OpKind::CastAxes => {
                let (x, _) = self.argument(op, 0, values)?;
                Ok(x.clone())
            }
            OpKind::Squeeze { axes } => {
                let (x, x_axes) = self.argument(op, 0, values)?;
                let mut indices = positions(axes, x_axes)?;
                indices.sort_unstable_by(|a, b| b.cmp(a));
                let mut value = x.clone();
                for index in indices {
                    value = value.index_axis_move(ArrayAxis(index), 0);
                }
                Ok(value)
            }
            OpKind::Reorder => {
                let (x, x_axes) = self.argument(op, 0, values)?;
                let permutation = positions(&op.axes, x_axes)?;
                Ok(x.view().permuted_axes(permutation).as_standard_layout().into_owned())
            }
        }
    }
}

/// Position of each of `axes` within `within`
fn positions(axes: &Axes, within: &Axes) -> Result<Vec<usize>> {
    axes.iter()
        .map(|axis| {
            within
                .index_of(axis)
                .ok_or_else(|| Error::AxisMismatch(format!("{} has no axis {}", within, axis)))
        })
        .collect()
}

/// Lay out `x` (with axes `from`) along `to`, broadcasting over missing axes
fn align(x: &ArrayD<f32>, from: &Axes, to: &Axes) -> Result<ArrayD<f32>> {
    let targets = positions(from, to)?;
    let mut order: Vec<usize> = (0..from.len()).collect();
    order.sort_by_key(|&i| targets[i]);

    let mut view = x.view().permuted_axes(order);
    for (position, axis) in to.iter().enumerate() {
        if !from.contains(axis) {
            view = view.insert_axis(ArrayAxis(position));
        }
    }

    let shape = to.lengths();
    let broadcast = view.broadcast(shape.as_slice()).ok_or_else(|| {
        Error::ShapeMismatch(format!("cannot broadcast {} to {}", from, to))
    })?;
    Ok(broadcast.to_owned())
}

/// Contract `x` and `y` over their shared axes
fn tensordot(x: &ArrayD<f32>, x_axes: &Axes, y: &ArrayD<f32>, y_axes: &Axes) -> Result<ArrayD<f32>> {
    let shared = x_axes.intersection(y_axes);
    let left_free = x_axes.without(&shared);
    let right_free = y_axes.without(&shared);

    let left_order = positions(&left_free.union(&shared), x_axes)?;
    let right_order = positions(&shared.union(&right_free), y_axes)?;

    let left = x
        .view()
        .permuted_axes(left_order)
        .as_standard_layout()
        .into_owned()
        .into_shape((left_free.size(), shared.size()))?;
    let right = y
        .view()
        .permuted_axes(right_order)
        .as_standard_layout()
        .into_owned()
        .into_shape((shared.size(), right_free.size()))?;

    let mut shape = left_free.lengths();
    shape.extend(right_free.lengths());

    let product = left.dot(&right);
    Ok(product.as_standard_layout().into_owned().into_shape(shape.as_slice())?)
}

fn reduce(x: &ArrayD<f32>, x_axes: &Axes, op: ReduceOp, axes: &Axes) -> Result<ArrayD<f32>> {
    let mut indices = positions(axes, x_axes)?;
    indices.sort_unstable_by(|a, b| b.cmp(a));

    let mut value = x.clone();
    for index in indices {
        let axis = ArrayAxis(index);
        value = match op {
            ReduceOp::Sum | ReduceOp::Mean => value.sum_axis(axis),
            ReduceOp::Max => value.fold_axis(axis, f32::NEG_INFINITY, |&acc, &v| acc.max(v)),
            ReduceOp::Min => value.fold_axis(axis, f32::INFINITY, |&acc, &v| acc.min(v)),
            ReduceOp::Prod => value.fold_axis(axis, 1.0, |&acc, &v| acc * v),
        };
    }

    if op == ReduceOp::Mean {
        let count = axes.size() as f32;
        value.mapv_inplace(|v| v / count);
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, ArrayD};

    fn close(a: &ArrayD<f32>, b: &ArrayD<f32>) -> bool {
        a.shape() == b.shape() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_binary_broadcasts_by_axis_identity() {
        let mut graph = OpGraph::new();
        let axes = graph.make_axes(&[2, 3], "X").unwrap();
        let x = graph.placeholder(axes.clone());
        // Row vector laid out along the second axis only
        let y = graph.placeholder(axes.select(&[1]).unwrap());
        let sum = graph.add(x, y).unwrap();

        let computation = Transformer::new().computation(&graph, sum, &[x, y]).unwrap();
        let result = computation
            .call(&[
                arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn(),
                arr1(&[10.0, 20.0, 30.0]).into_dyn(),
            ])
            .unwrap();

        assert!(close(&result, &arr2(&[[11.0, 22.0, 33.0], [14.0, 25.0, 36.0]]).into_dyn()));
    }

    #[test]
    fn test_dot_matches_matrix_product() {
        let mut graph = OpGraph::new();
        let ij = graph.make_axes(&[2, 3], "L").unwrap();
        let k = graph.make_axis(2, "R");
        let a = graph.placeholder(ij.clone());
        let b = graph.placeholder(Axes::new(vec![ij[1].clone(), k]).unwrap());
        let c = graph.dot(a, b).unwrap();

        let computation = Transformer::new().computation(&graph, c, &[a, b]).unwrap();
        let result = computation
            .call(&[
                arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn(),
                arr2(&[[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]).into_dyn(),
            ])
            .unwrap();

        assert!(close(&result, &arr2(&[[4.0, 5.0], [10.0, 11.0]]).into_dyn()));
    }

    #[test]
    fn test_reduce_and_reorder() {
        let mut graph = OpGraph::new();
        let axes = graph.make_axes(&[2, 3], "X").unwrap();
        let x = graph.placeholder(axes.clone());
        let mean = graph.reduce(ReduceOp::Mean, x, axes.select(&[1]).unwrap()).unwrap();
        let transposed = graph.reorder(x, axes.select(&[1, 0]).unwrap()).unwrap();
        let data = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn();

        let transformer = Transformer::new();
        let result = transformer.computation(&graph, mean, &[x]).unwrap().call(&[data.clone()]).unwrap();
        assert!(close(&result, &arr1(&[2.0, 5.0]).into_dyn()));

        let result = transformer.computation(&graph, transposed, &[x]).unwrap().call(&[data]).unwrap();
        assert!(close(&result, &arr2(&[[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]]).into_dyn()));
    }

    #[test]
    fn test_unbound_placeholder_rejected() {
        let mut graph = OpGraph::new();
        let axes = graph.make_axes(&[2], "X").unwrap();
        let x = graph.placeholder(axes);
        let y = graph.unary(crate::ops::UnaryOp::Exp, x).unwrap();

        assert!(Transformer::new().computation(&graph, y, &[]).is_err());
    }

    #[test]
    fn test_argument_shape_checked() {
        let mut graph = OpGraph::new();
        let axes = graph.make_axes(&[2], "X").unwrap();
        let x = graph.placeholder(axes);

        let computation = Transformer::new().computation(&graph, x, &[x]).unwrap();
        let result = computation.call(&[arr1(&[1.0, 2.0, 3.0]).into_dyn()]);
        assert!(matches!(result, Err(Error::ShapeMismatch(_))));
    }
}
