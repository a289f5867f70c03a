//! Named-axis tensor operations.
//!
//! Every ONNX node is translated into calls on the factory methods of
//! [`OpGraph`]. The factories check the named-axis rules and compute the result
//! axes; [`crate::execution`] evaluates the resulting graph.

pub mod graph;
mod elementwise;
mod shape;
mod reduction;
mod dot;

pub use graph::{BinaryOp, Op, OpGraph, OpId, OpKind, ReduceOp, UnaryOp};
