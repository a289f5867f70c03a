use crate::axes::{Axes, Axis};
use crate::error::{Error, Result};
use crate::ops::{OpGraph, OpId};

/// Relabel the operands of a matrix product so that a named-axis dot contracts
/// exactly the dimensions matrix multiplication would.
///
/// * vector · vector: the right axis becomes the left one
/// * vector · matrix: the left axis becomes the right operand's row axis
/// * matrix · vector: the right axis becomes the left operand's last axis
/// * matrix · matrix: the right operand gets fresh axes except for its row
///   axis, which becomes the left operand's last axis
pub fn cast_axes_for_matmul(graph: &mut OpGraph, left: OpId, right: OpId) -> Result<(OpId, OpId)> {
    let left_axes = graph.axes(left)?.clone();
    let right_axes = graph.axes(right)?.clone();

    let (left_last, right_row) = match (left_axes.last(), row_axis(&right_axes)) {
        (Some(l), Some(r)) => (l.clone(), r.clone()),
        _ => {
            return Err(Error::ShapeMismatch(format!(
                "matrix multiplication needs operands of rank 1 or more, got {} and {}",
                left_axes, right_axes
            )))
        }
    };

    if left_last.length() != right_row.length() {
        let message = if left_axes.len() == 1 && right_axes.len() == 1 {
            "Vector lengths must be equal for multiplication.".to_string()
        } else {
            format!(
                "cannot multiply {:?} by {:?}: inner dimensions differ",
                left_axes.lengths(),
                right_axes.lengths()
            )
        };
        return Err(Error::ShapeMismatch(message));
    }

    match (left_axes.len(), right_axes.len()) {
        (1, 1) => {
            let right = graph.cast_axes(right, left_axes)?;
            Ok((left, right))
        }
        (1, _) => {
            let left = graph.cast_axes(left, Axes::new(vec![right_row])?)?;
            Ok((left, right))
        }
        (_, 1) => {
            let right = graph.cast_axes(right, Axes::new(vec![left_last])?)?;
            Ok((left, right))
        }
        (_, rank) => {
            let mut axes: Vec<Axis> = right_axes
                .iter()
                .map(|axis| graph.make_axis(axis.length(), "DOT"))
                .collect();
            axes[rank - 2] = left_last;
            let right = graph.cast_axes(right, Axes::new(axes)?)?;
            Ok((left, right))
        }
    }
}

/// Axis of a right operand that a matrix product contracts
fn row_axis(axes: &Axes) -> Option<&Axis> {
    match axes.len() {
        0 => None,
        1 => axes.first(),
        n => axes.get(n - 2),
    }
}
