use crate::axes::{Axes, Axis};
use crate::error::{Error, Result};

use super::graph::{OpGraph, OpId, OpKind};

impl OpGraph {
    /// Relabel the axes of `x`. Lengths must match position by position.
    pub fn cast_axes(&mut self, x: OpId, axes: Axes) -> Result<OpId> {
        let current = self.axes(x)?;
        if current == &axes {
            return Ok(x);
        }
        if current.lengths() != axes.lengths() {
            return Err(Error::AxisMismatch(format!(
                "cannot cast axes {} to {}: lengths differ",
                current, axes
            )));
        }
        Ok(self.push(OpKind::CastAxes, vec![x], axes))
    }

    /// Insert `axis` at `position`, repeating the data along it
    pub fn expand_dims(&mut self, x: OpId, axis: Axis, position: usize) -> Result<OpId> {
        let current = self.axes(x)?;
        if current.contains(&axis) {
            return Err(Error::AxisMismatch(format!("{} already has axis {}", current, axis)));
        }
        let axes = current.insert(position, axis.clone())?;
        Ok(self.push(OpKind::ExpandDims { axis, position }, vec![x], axes))
    }

    /// Remove length-1 axes
    pub fn squeeze(&mut self, x: OpId, axes: Axes) -> Result<OpId> {
        if axes.is_empty() {
            return Ok(x);
        }
        let current = self.axes(x)?;
        for axis in &axes {
            if !current.contains(axis) {
                return Err(Error::AxisMismatch(format!("{} has no axis {}", current, axis)));
            }
            if axis.length() != 1 {
                return Err(Error::AxisMismatch(format!(
                    "cannot squeeze axis {} of length {}",
                    axis,
                    axis.length()
                )));
            }
        }
        let remaining = current.without(&axes);
        Ok(self.push(OpKind::Squeeze { axes }, vec![x], remaining))
    }

    /// Permute `x` so its axes appear in the order given
    pub fn reorder(&mut self, x: OpId, axes: Axes) -> Result<OpId> {
        let current = self.axes(x)?;
        if current == &axes {
            return Ok(x);
        }
        if !current.same_set(&axes) {
            return Err(Error::AxisMismatch(format!("cannot reorder {} as {}", current, axes)));
        }
        Ok(self.push(OpKind::Reorder, vec![x], axes))
    }
}
