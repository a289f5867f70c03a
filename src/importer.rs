use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use log::{debug, info};

use crate::config::ImportOptions;
use crate::convert::{ConversionContext, ConverterRegistry};
use crate::error::{Error, Result};
use crate::execution::{Computation, Transformer};
use crate::model::{Dimension, ModelMetadata, TensorInfo};
use crate::ops::{OpGraph, OpId, OpKind};
use crate::parser::{tensor_to_array, GraphBuilder, NodeWrapper, OnnxModelLoader};
use crate::proto::ModelProto;

/// A named graph output with the placeholders it is computed from
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedOutput {
    pub name: String,
    /// Placeholders for the graph inputs, in declaration order
    pub inputs: Vec<OpId>,
    pub output: OpId,
}

/// Result of importing an ONNX model
#[derive(Debug, Clone)]
pub struct ImportedModel {
    pub graph: OpGraph,
    pub outputs: Vec<ImportedOutput>,
    pub metadata: ModelMetadata,
    pub opset_version: i64,
}

impl ImportedModel {
    pub fn output(&self, name: &str) -> Option<&ImportedOutput> {
        self.outputs.iter().find(|o| o.name == name)
    }

    /// Computation of the output called `name`, taking every graph input
    pub fn computation(&self, name: &str) -> Result<Computation<'_>> {
        let output = self
            .output(name)
            .ok_or_else(|| Error::InvalidArgument(format!("Model has no output named {}", name)))?;
        Transformer::new().computation(&self.graph, output.output, &output.inputs)
    }
}

/// Import a decoded model with default options
pub fn import_onnx_model(model: &ModelProto) -> Result<ImportedModel> {
    import_onnx_model_with_options(model, &ImportOptions::default())
}

/// Decode and import a serialized model
pub fn import_onnx_bytes(data: &[u8]) -> Result<ImportedModel> {
    let model = OnnxModelLoader::load_model_from_bytes(data)?;
    import_onnx_model(&model)
}

/// Load and import a model file
pub fn import_onnx_file(path: impl AsRef<Path>) -> Result<ImportedModel> {
    let model = OnnxModelLoader::load_model(path.as_ref())?;
    import_onnx_model(&model)
}

/// Import a decoded model.
///
/// Initializers become constants, the remaining graph inputs become
/// placeholders and every node is converted after the nodes producing its
/// inputs.
pub fn import_onnx_model_with_options(model: &ModelProto, options: &ImportOptions) -> Result<ImportedModel> {
    let graph_proto = model
        .graph
        .as_ref()
        .ok_or_else(|| Error::MissingField("Model has no graph".to_string()))?;

    let opsets = OnnxModelLoader::handle_opset_imports(&model.opset_import);
    let opset_version = opsets
        .get("")
        .copied()
        .unwrap_or(options.default_opset_version);
    let metadata = OnnxModelLoader::extract_model_metadata(model);

    info!(
        "Importing graph {} (producer {}, opset {})",
        graph_proto.name, metadata.producer_name, opset_version
    );

    let mut graph = OpGraph::new();
    let mut tensors: HashMap<&str, OpId> = HashMap::new();

    for initializer in &graph_proto.initializer {
        let value = tensor_to_array(initializer)?;
        let axes = graph.make_axes(value.shape(), "INIT")?;
        let op = graph.constant(value, axes)?;
        graph.set_name(op, initializer.name.clone())?;
        tensors.insert(initializer.name.as_str(), op);
    }

    let mut placeholders = Vec::new();
    let initializer_names: HashSet<&str> = graph_proto
        .initializer
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    for value_info in graph_proto
        .input
        .iter()
        .filter(|v| !initializer_names.contains(v.name.as_str()))
    {
        let info = OnnxModelLoader::convert_value_info_proto(value_info)?;
        if !info.data_type.is_numeric() {
            return Err(Error::UnsupportedFeature(format!(
                "Input {} has element type {:?}; only numeric inputs can be imported",
                info.name, info.data_type
            )));
        }
        let lengths = input_lengths(&info, options)?;
        let axes = graph.make_axes(&lengths, "IN")?;
        let op = graph.placeholder(axes);
        graph.set_name(op, info.name.clone())?;
        placeholders.push(op);
        tensors.insert(value_info.name.as_str(), op);
    }

    let registry = ConverterRegistry::initialize_standard_converters();
    let order = GraphBuilder::topological_sort(&graph_proto.node)?;

    for index in order {
        let proto = &graph_proto.node[index];
        // Only default-domain nodes convert, so they all share its opset
        let node = NodeWrapper::new(proto, opset_version);

        let inputs = proto
            .input
            .iter()
            .filter(|name| !name.is_empty())
            .map(|name| {
                tensors.get(name.as_str()).copied().ok_or_else(|| {
                    Error::InvalidGraph(format!(
                        "Input {} of {} node ({}) is not produced by any node, input or initializer",
                        name,
                        node.op_type(),
                        node.name()
                    ))
                })
            })
            .collect::<Result<Vec<OpId>>>()?;

        let mut ctx = ConversionContext::new(&mut graph, options);
        let outputs = registry.convert_node(&mut ctx, &node, &inputs)?;

        for (name, op) in proto.output.iter().filter(|n| !n.is_empty()).zip(outputs) {
            if graph.op(op)?.name.is_none() {
                graph.set_name(op, node.name())?;
            }
            tensors.insert(name.as_str(), op);
        }
    }

    let outputs = graph_proto
        .output
        .iter()
        .map(|value_info| {
            let output = tensors.get(value_info.name.as_str()).copied().ok_or_else(|| {
                Error::InvalidGraph(format!("Graph output {} is never produced", value_info.name))
            })?;
            Ok(ImportedOutput {
                name: value_info.name.clone(),
                inputs: placeholders.clone(),
                output,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Imported {} ops for {} outputs",
        graph.len(),
        outputs.len()
    );

    Ok(ImportedModel {
        graph,
        outputs,
        metadata,
        opset_version,
    })
}

/// Concrete lengths for a declared input shape
fn input_lengths(info: &TensorInfo, options: &ImportOptions) -> Result<Vec<usize>> {
    let shape = info.shape.as_ref().ok_or_else(|| {
        Error::MissingField(format!("Input {} has no declared shape", info.name))
    })?;

    shape
        .iter()
        .map(|dim| match dim {
            Dimension::Value(v) if *v >= 0 => Ok(*v as usize),
            Dimension::Value(v) => Err(Error::InvalidModel(format!(
                "Input {} has negative dimension {}",
                info.name, v
            ))),
            Dimension::Param(_) | Dimension::Unknown => options.dynamic_dim_length.ok_or_else(|| {
                Error::UnsupportedFeature(format!(
                    "Input {} has dynamic dimension {}; set a dynamic dimension length to import it",
                    info.name, dim
                ))
            }),
        })
        .collect()
}

/// Placeholders `output` depends on, in graph order
pub fn required_inputs(graph: &OpGraph, output: OpId) -> Result<Vec<OpId>> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![output];
    while let Some(id) = stack.pop() {
        if seen.insert(id) {
            stack.extend(graph.op(id)?.args.iter().copied());
        }
    }

    let mut placeholders = Vec::new();
    for id in seen {
        if graph.op(id)?.kind == OpKind::Placeholder {
            placeholders.push(id);
        }
    }
    Ok(placeholders)
}
