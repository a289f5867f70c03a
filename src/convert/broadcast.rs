use log::{error, warn};

use crate::axes::{Axes, Axis};
use crate::config::ImportOptions;
use crate::error::{Error, Result};
use crate::ops::{BinaryOp, OpGraph, OpId};
use crate::parser::NodeWrapper;

/// First opset in which element-wise ops broadcast without a `broadcast` attribute
pub const MULTIDIRECTIONAL_BROADCAST_OPSET: i64 = 7;

/// Whether `src` can be broadcast onto `dst`.
///
/// Shapes are right-aligned; every dimension of `src` must equal the matching
/// dimension of `dst` or be 1, and `src` may not have more dimensions.
pub fn is_compatible_broadcast_shape(src: &[usize], dst: &[usize]) -> bool {
    src.len() <= dst.len()
        && src.iter().rev().zip(dst.iter().rev()).all(|(&s, &d)| s == d || s == 1)
}

/// Whether two shapes broadcast against each other under NumPy rules
pub fn is_compatible_numpy_shape(left: &[usize], right: &[usize]) -> bool {
    left.iter()
        .rev()
        .zip(right.iter().rev())
        .all(|(&l, &r)| l == r || l == 1 || r == 1)
}

/// Check that two operands of a binary node can be combined element-wise.
///
/// Identical shapes always pass. Before opset 7 differing shapes need
/// `broadcast=1` and the right operand must broadcast onto the left one; from
/// opset 7 on, NumPy broadcasting applies.
pub fn verify_axes_binary_broadcast_compatible(
    node: &NodeWrapper<'_>,
    left: &Axes,
    right: &Axes,
    options: &ImportOptions,
) -> Result<()> {
    if node.has_attribute("axis") {
        return Err(Error::NotImplemented(format!(
            "{} node ({}): \"axis\" attribute not supported yet.",
            node.op_type(),
            node.name()
        )));
    }

    let shape_left = left.lengths();
    let shape_right = right.lengths();
    if shape_left == shape_right {
        return Ok(());
    }

    let compatible = if node.opset_version() < MULTIDIRECTIONAL_BROADCAST_OPSET {
        let broadcast_flag_set = node.get_int("broadcast")? == Some(1);
        if !broadcast_flag_set {
            warn!(
                "{} node ({}): operands have different dimensions, and \"broadcast\" attribute is not set.",
                node.op_type(),
                node.name()
            );
            if options.strict_broadcast_flag {
                return Err(Error::BroadcastMismatch(format!(
                    "{} node ({}): shapes {:?} and {:?} differ and \"broadcast\" is not set",
                    node.op_type(),
                    node.name(),
                    shape_left,
                    shape_right
                )));
            }
        }
        is_compatible_broadcast_shape(&shape_right, &shape_left)
    } else {
        is_compatible_numpy_shape(&shape_left, &shape_right)
    };

    if !compatible {
        error!(
            "{} node ({}): operands have shapes incompatible for broadcasting.",
            node.op_type(),
            node.name()
        );
        return Err(Error::BroadcastMismatch(format!(
            "{} node ({}): shapes {:?} and {:?} are incompatible for broadcasting",
            node.op_type(),
            node.name(),
            shape_left,
            shape_right
        )));
    }

    Ok(())
}

/// Axis of `axes` at output position `position` when right-aligned to `rank`
fn aligned(axes: &Axes, rank: usize, position: usize) -> Option<&Axis> {
    let offset = rank - axes.len();
    position.checked_sub(offset).and_then(|i| axes.get(i))
}

/// Make two operands line up positionally in the named-axis model.
///
/// Length-1 axes that broadcast are squeezed away and every other axis is cast to
/// the output axis at the same right-aligned position. Returns the adjusted
/// operands and the positional axes of the broadcast result.
pub fn broadcast_operands(graph: &mut OpGraph, left: OpId, right: OpId) -> Result<(OpId, OpId, Axes)> {
    let left_axes = graph.axes(left)?.clone();
    let right_axes = graph.axes(right)?.clone();
    let rank = left_axes.len().max(right_axes.len());

    let mut output: Vec<Axis> = Vec::with_capacity(rank);
    for position in 0..rank {
        let l = aligned(&left_axes, rank, position);
        let r = aligned(&right_axes, rank, position);
        let l_len = l.map_or(1, Axis::length);
        let r_len = r.map_or(1, Axis::length);

        if l_len != r_len && l_len != 1 && r_len != 1 {
            return Err(Error::BroadcastMismatch(format!(
                "cannot broadcast {:?} with {:?}",
                left_axes.lengths(),
                right_axes.lengths()
            )));
        }
        let length = if l_len == 1 { r_len } else { l_len };

        let existing = [l, r]
            .into_iter()
            .flatten()
            .find(|axis| axis.length() == length && !output.contains(axis))
            .cloned();
        let axis = match existing {
            Some(axis) => axis,
            None => graph.make_axis(length, "BCAST"),
        };
        output.push(axis);
    }
    let output = Axes::new(output)?;

    let left = align_operand(graph, left, &left_axes, &output)?;
    let right = align_operand(graph, right, &right_axes, &output)?;
    Ok((left, right, output))
}

fn align_operand(graph: &mut OpGraph, x: OpId, axes: &Axes, output: &Axes) -> Result<OpId> {
    let offset = output.len() - axes.len();
    let mut squeezed = Vec::new();
    let mut targets = Vec::new();

    for (i, axis) in axes.iter().enumerate() {
        let target = &output[offset + i];
        if axis.length() == target.length() {
            targets.push(target.clone());
        } else {
            squeezed.push(axis.clone());
        }
    }

    let x = graph.squeeze(x, Axes::new(squeezed)?)?;
    graph.cast_axes(x, Axes::new(targets)?)
}

/// Element-wise op with NumPy broadcasting; the result has positional axes
pub fn make_broadcast_binary(graph: &mut OpGraph, op: BinaryOp, left: OpId, right: OpId) -> Result<OpId> {
    let (left, right, output) = broadcast_operands(graph, left, right)?;
    let result = graph.binary(op, left, right)?;
    graph.reorder(result, output)
}
