use crate::axes::Axes;
use crate::error::{Error, Result};

use super::graph::{OpGraph, OpId, OpKind, ReduceOp};

impl OpGraph {
    /// Reduce `x` over `reduction_axes`, which must all belong to `x`
    pub fn reduce(&mut self, op: ReduceOp, x: OpId, reduction_axes: Axes) -> Result<OpId> {
        let current = self.axes(x)?;
        if let Some(missing) = reduction_axes.iter().find(|a| !current.contains(a)) {
            return Err(Error::AxisMismatch(format!(
                "cannot reduce {} over axis {}",
                current, missing
            )));
        }
        let remaining = current.without(&reduction_axes);
        Ok(self.push(OpKind::Reduce { op, axes: reduction_axes }, vec![x], remaining))
    }

    pub fn sum(&mut self, x: OpId, reduction_axes: Axes) -> Result<OpId> {
        self.reduce(ReduceOp::Sum, x, reduction_axes)
    }

    pub fn max(&mut self, x: OpId, reduction_axes: Axes) -> Result<OpId> {
        self.reduce(ReduceOp::Max, x, reduction_axes)
    }
}
