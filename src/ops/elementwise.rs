use crate::error::Result;

use super::graph::{BinaryOp, OpGraph, OpId, OpKind, UnaryOp};

impl OpGraph {
    /// Apply an element-wise function; axes are unchanged
    pub fn unary(&mut self, op: UnaryOp, x: OpId) -> Result<OpId> {
        let axes = self.axes(x)?.clone();
        Ok(self.push(OpKind::Unary(op), vec![x], axes))
    }

    /// Combine two ops element-wise.
    ///
    /// Result axes are the left operand's axes followed by any right operand axes
    /// the left one lacks. Each operand is broadcast along the axes it is missing.
    pub fn binary(&mut self, op: BinaryOp, left: OpId, right: OpId) -> Result<OpId> {
        let axes = self.axes(left)?.union(self.axes(right)?);
        Ok(self.push(OpKind::Binary(op), vec![left, right], axes))
    }

    pub fn add(&mut self, left: OpId, right: OpId) -> Result<OpId> {
        self.binary(BinaryOp::Add, left, right)
    }

    pub fn subtract(&mut self, left: OpId, right: OpId) -> Result<OpId> {
        self.binary(BinaryOp::Subtract, left, right)
    }

    pub fn multiply(&mut self, left: OpId, right: OpId) -> Result<OpId> {
        self.binary(BinaryOp::Multiply, left, right)
    }

    pub fn divide(&mut self, left: OpId, right: OpId) -> Result<OpId> {
        self.binary(BinaryOp::Divide, left, right)
    }

    pub fn maximum(&mut self, left: OpId, right: OpId) -> Result<OpId> {
        self.binary(BinaryOp::Maximum, left, right)
    }

    pub fn minimum(&mut self, left: OpId, right: OpId) -> Result<OpId> {
        self.binary(BinaryOp::Minimum, left, right)
    }

    /// `x * factor`
    pub fn scale(&mut self, x: OpId, factor: f32) -> Result<OpId> {
        let factor = self.scalar(factor);
        self.multiply(x, factor)
    }

    /// `x + offset`
    pub fn shift(&mut self, x: OpId, offset: f32) -> Result<OpId> {
        let offset = self.scalar(offset);
        self.add(x, offset)
    }
}
