use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{Error, Result};
use crate::proto::NodeProto;

/// Orders the nodes of an ONNX graph by their tensor dependencies
pub struct GraphBuilder;

impl GraphBuilder {
    /// Map every produced tensor name to the index of the node producing it
    pub fn tensor_producers(nodes: &[NodeProto]) -> Result<HashMap<&str, usize>> {
        let mut producers = HashMap::new();

        for (index, node) in nodes.iter().enumerate() {
            for output in node.output.iter().filter(|o| !o.is_empty()) {
                if let Some(previous) = producers.insert(output.as_str(), index) {
                    return Err(Error::InvalidGraph(format!(
                        "Tensor {} is produced by both node {} and node {}",
                        output, previous, index
                    )));
                }
            }
        }

        Ok(producers)
    }

    /// Sort nodes topologically.
    ///
    /// Returns node indices such that every node comes after the producers of its
    /// inputs. Inputs with no producer are graph inputs or initializers.
    pub fn topological_sort(nodes: &[NodeProto]) -> Result<Vec<usize>> {
        let producers = Self::tensor_producers(nodes)?;

        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(nodes.len(), 0);
        let indices: Vec<NodeIndex> = (0..nodes.len()).map(|i| graph.add_node(i)).collect();

        for (consumer, node) in nodes.iter().enumerate() {
            for input in node.input.iter().filter(|i| !i.is_empty()) {
                if let Some(&producer) = producers.get(input.as_str()) {
                    graph.update_edge(indices[producer], indices[consumer], ());
                }
            }
        }

        let sorted = toposort(&graph, None).map_err(|cycle| {
            let node = &nodes[graph[cycle.node_id()]];
            Error::InvalidGraph(format!(
                "Graph contains a cycle through node {} ({})",
                node.name, node.op_type
            ))
        })?;

        Ok(sorted.into_iter().map(|index| graph[index]).collect())
    }
}
