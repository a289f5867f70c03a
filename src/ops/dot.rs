use crate::error::Result;

use super::graph::{OpGraph, OpId, OpKind};

impl OpGraph {
    /// Tensor contraction over every axis `left` and `right` have in common.
    ///
    /// The result carries the remaining axes of `left` followed by the remaining
    /// axes of `right`. With no shared axes this is an outer product.
    pub fn dot(&mut self, left: OpId, right: OpId) -> Result<OpId> {
        let left_axes = self.axes(left)?;
        let right_axes = self.axes(right)?;
        let shared = left_axes.intersection(right_axes);
        let axes = left_axes.without(&shared).union(&right_axes.without(&shared));
        Ok(self.push(OpKind::Dot, vec![left, right], axes))
    }
}
