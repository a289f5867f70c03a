//! Reference evaluator for named-axis op graphs.

pub mod engine;

pub use engine::{Computation, Transformer};
