//! Translation of ONNX nodes into named-axis ops.
//!
//! Each supported ONNX operator has a [`Converter`] registered under its
//! `op_type` in a [`ConverterRegistry`]. The importer walks the graph in
//! dependency order and hands every node to the registry.

pub mod broadcast;
pub mod matmul;
pub mod reduction;
mod activations;
mod math;
mod tensor;

use std::collections::HashMap;
use std::fmt::Debug;

use log::debug;
use strum::IntoEnumIterator;

use crate::config::ImportOptions;
use crate::error::{Error, Result};
use crate::ops::{BinaryOp, OpGraph, OpId, OpKind, UnaryOp};
use crate::parser::{NodeWrapper, OnnxModelLoader};

pub use activations::{Activation, ActivationKind};
pub use math::{Binary, Gemm, MatMul, Unary, Variadic, VariadicKind};
pub use reduction::{Reduction, ReductionKind, Softmax};
pub use tensor::{Constant, Identity, Squeeze, Transpose, Unsqueeze};

/// State shared by converters while a model is being imported
pub struct ConversionContext<'a> {
    pub graph: &'a mut OpGraph,
    pub options: &'a ImportOptions,
}

impl<'a> ConversionContext<'a> {
    pub fn new(graph: &'a mut OpGraph, options: &'a ImportOptions) -> Self {
        Self { graph, options }
    }
}

/// Trait for translating one kind of ONNX node
pub trait Converter: Send + Sync + Debug {
    /// Smallest and largest number of inputs the node may have
    fn arity(&self) -> (usize, usize);

    /// Build the ops for `node`, returning one op per node output
    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        node: &NodeWrapper<'_>,
        inputs: &[OpId],
    ) -> Result<Vec<OpId>>;

    /// Validate the converter against a node
    fn validate(&self, node: &NodeWrapper<'_>, inputs: &[OpId]) -> Result<()> {
        let (min, max) = self.arity();
        if inputs.len() < min || inputs.len() > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{} to {}", min, max)
            };
            return Err(Error::InvalidModel(format!(
                "{} node ({}) expects {} inputs, got {}",
                node.op_type(),
                node.name(),
                expected,
                inputs.len()
            )));
        }
        Ok(())
    }
}

/// Registry of converters keyed by ONNX op type
#[derive(Debug, Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Box<dyn Converter>>,
}

impl ConverterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Register a converter
    pub fn register_converter(&mut self, op_type: &str, converter: Box<dyn Converter>) -> Result<()> {
        if self.converters.contains_key(op_type) {
            return Err(Error::InvalidArgument(format!(
                "Converter for {} is already registered",
                op_type
            )));
        }
        self.converters.insert(op_type.to_string(), converter);
        Ok(())
    }

    pub fn get_converter(&self, op_type: &str) -> Option<&dyn Converter> {
        self.converters.get(op_type).map(|c| c.as_ref())
    }

    /// Op types with a registered converter, sorted
    pub fn supported_ops(&self) -> Vec<&str> {
        let mut ops: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        ops.sort_unstable();
        ops
    }

    /// Registry holding a converter for every supported ONNX operator
    pub fn initialize_standard_converters() -> Self {
        let mut registry = Self::new();

        // Element-wise math
        for op in UnaryOp::iter() {
            registry.insert(op.to_string(), Box::new(Unary(op)));
        }
        let binary = [
            ("Add", BinaryOp::Add),
            ("Sub", BinaryOp::Subtract),
            ("Mul", BinaryOp::Multiply),
            ("Div", BinaryOp::Divide),
            ("Pow", BinaryOp::Power),
            ("Equal", BinaryOp::Equal),
            ("Greater", BinaryOp::Greater),
            ("Less", BinaryOp::Less),
        ];
        for (op_type, op) in binary {
            registry.insert(op_type.to_string(), Box::new(Binary(op)));
        }
        for kind in VariadicKind::iter() {
            registry.insert(kind.to_string(), Box::new(Variadic(kind)));
        }
        registry.insert("MatMul".to_string(), Box::new(MatMul));
        registry.insert("Gemm".to_string(), Box::new(Gemm));

        for kind in ActivationKind::iter() {
            registry.insert(kind.to_string(), Box::new(Activation(kind)));
        }

        for kind in ReductionKind::iter() {
            registry.insert(kind.to_string(), Box::new(Reduction(kind)));
        }
        registry.insert("Softmax".to_string(), Box::new(Softmax { log: false }));
        registry.insert("LogSoftmax".to_string(), Box::new(Softmax { log: true }));

        registry.insert("Constant".to_string(), Box::new(Constant));
        registry.insert("Identity".to_string(), Box::new(Identity));
        registry.insert("Transpose".to_string(), Box::new(Transpose));
        registry.insert("Squeeze".to_string(), Box::new(Squeeze));
        registry.insert("Unsqueeze".to_string(), Box::new(Unsqueeze));

        registry
    }

    fn insert(&mut self, op_type: String, converter: Box<dyn Converter>) {
        self.converters.insert(op_type, converter);
    }

    /// Convert a single node, returning the ops for its outputs
    pub fn convert_node(
        &self,
        ctx: &mut ConversionContext<'_>,
        node: &NodeWrapper<'_>,
        inputs: &[OpId],
    ) -> Result<Vec<OpId>> {
        if !OnnxModelLoader::normalize_domain(node.domain()).is_empty() {
            return Err(Error::UnsupportedFeature(format!(
                "Operator {}.{} not supported",
                node.domain(),
                node.op_type()
            )));
        }

        let converter = self.get_converter(node.op_type()).ok_or_else(|| {
            Error::UnsupportedFeature(format!("Unknown operation: {}", node.op_type()))
        })?;

        debug!(
            "Converting {} node ({}) at opset {}",
            node.op_type(),
            node.name(),
            node.opset_version()
        );

        converter.validate(node, inputs)?;
        let outputs = converter.convert(ctx, node, inputs)?;

        let expected = node.outputs().iter().filter(|o| !o.is_empty()).count();
        if outputs.len() < expected {
            return Err(Error::UnsupportedFeature(format!(
                "{} node ({}) has {} outputs but only {} can be produced",
                node.op_type(),
                node.name(),
                expected,
                outputs.len()
            )));
        }

        Ok(outputs)
    }
}

/// First input of a node
pub(crate) fn first(inputs: &[OpId]) -> Result<OpId> {
    input(inputs, 0)
}

/// Input `index` of a node
pub(crate) fn input(inputs: &[OpId], index: usize) -> Result<OpId> {
    inputs.get(index).copied().ok_or_else(|| {
        Error::InvalidModel(format!("node has {} inputs, input {} is missing", inputs.len(), index))
    })
}

/// Integer list held by a constant input such as the `axes` of opset 13 Squeeze
pub(crate) fn constant_ints(graph: &OpGraph, node: &NodeWrapper<'_>, id: OpId) -> Result<Vec<i64>> {
    match &graph.op(id)?.kind {
        OpKind::Constant(value) => Ok(value.iter().map(|&v| v as i64).collect()),
        _ => Err(Error::UnsupportedFeature(format!(
            "{} node ({}): axes computed at run time are not supported, they must be a constant or initializer",
            node.op_type(),
            node.name()
        ))),
    }
}

/// Resolve a possibly negative axis index against `rank`
pub(crate) fn normalize_axis(node: &NodeWrapper<'_>, axis: i64, rank: usize) -> Result<usize> {
    let rank = rank as i64;
    let resolved = if axis < 0 { axis + rank } else { axis };
    if resolved < 0 || resolved >= rank {
        return Err(Error::InvalidAttribute(format!(
            "{} node ({}): axis {} is out of range for rank {}",
            node.op_type(),
            node.name(),
            axis,
            rank
        )));
    }
    Ok(resolved as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::NodeProto;

    #[test]
    fn test_standard_registry_contents() {
        let registry = ConverterRegistry::initialize_standard_converters();
        for op in ["Add", "Sub", "Relu", "Selu", "MatMul", "Gemm", "ReduceLogSumExp", "Softmax", "Unsqueeze", "Abs"] {
            assert!(registry.get_converter(op).is_some(), "missing converter for {}", op);
        }
        assert!(registry.get_converter("Conv").is_none());

        let ops = registry.supported_ops();
        let mut sorted = ops.clone();
        sorted.sort_unstable();
        assert_eq!(ops, sorted);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = ConverterRegistry::new();
        registry.register_converter("Identity", Box::new(Identity)).unwrap();
        assert!(registry.register_converter("Identity", Box::new(Identity)).is_err());
    }

    #[test]
    fn test_unknown_op_and_domain() {
        let registry = ConverterRegistry::initialize_standard_converters();
        let mut graph = OpGraph::new();
        let options = ImportOptions::default();
        let x = graph.scalar(1.0);

        let unknown = NodeProto {
            op_type: "Conv".to_string(),
            output: vec!["y".to_string()],
            ..Default::default()
        };
        let mut ctx = ConversionContext::new(&mut graph, &options);
        let result = registry.convert_node(&mut ctx, &NodeWrapper::new(&unknown, 7), &[x]);
        assert!(matches!(result, Err(Error::UnsupportedFeature(_))));

        let foreign = NodeProto {
            op_type: "Relu".to_string(),
            domain: "com.example".to_string(),
            output: vec!["y".to_string()],
            ..Default::default()
        };
        let result = registry.convert_node(&mut ctx, &NodeWrapper::new(&foreign, 7), &[x]);
        assert!(matches!(result, Err(Error::UnsupportedFeature(_))));
    }

    #[test]
    fn test_default_domain_spelled_out() {
        let registry = ConverterRegistry::initialize_standard_converters();
        let mut graph = OpGraph::new();
        let options = ImportOptions::default();
        let x = graph.scalar(-1.0);

        let relu = NodeProto {
            op_type: "Relu".to_string(),
            domain: "ai.onnx".to_string(),
            output: vec!["y".to_string()],
            ..Default::default()
        };
        let mut ctx = ConversionContext::new(&mut graph, &options);
        let outputs = registry.convert_node(&mut ctx, &NodeWrapper::new(&relu, 7), &[x]).unwrap();
        assert_eq!(outputs.len(), 1);
    }

    #[test]
    fn test_missing_input_is_an_error() {
        assert_eq!(input(&[OpId(0)], 0).unwrap(), OpId(0));
        assert!(matches!(input(&[OpId(0)], 1), Err(Error::InvalidModel(_))));
        assert!(matches!(first(&[]), Err(Error::InvalidModel(_))));
    }

    #[test]
    fn test_constant_ints() {
        let mut graph = OpGraph::new();
        let proto = NodeProto {
            op_type: "Unsqueeze".to_string(),
            ..Default::default()
        };
        let node = NodeWrapper::new(&proto, 13);
        let layout = graph.make_axes(&[2], "AXES").unwrap();
        let axes = graph.constant(ndarray::arr1(&[0.0f32, -1.0]).into_dyn(), layout).unwrap();
        assert_eq!(constant_ints(&graph, &node, axes).unwrap(), vec![0, -1]);

        let x = graph.scalar(1.0);
        let computed = graph.unary(UnaryOp::Exp, x).unwrap();
        assert!(matches!(constant_ints(&graph, &node, computed), Err(Error::UnsupportedFeature(_))));
    }

    #[test]
    fn test_arity_checked() {
        let registry = ConverterRegistry::initialize_standard_converters();
        let mut graph = OpGraph::new();
        let options = ImportOptions::default();
        let x = graph.scalar(1.0);

        let add = NodeProto {
            op_type: "Add".to_string(),
            output: vec!["y".to_string()],
            ..Default::default()
        };
        let mut ctx = ConversionContext::new(&mut graph, &options);
        let result = registry.convert_node(&mut ctx, &NodeWrapper::new(&add, 7), &[x]);
        assert!(matches!(result, Err(Error::InvalidModel(_))));
    }
}
