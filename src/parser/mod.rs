pub mod model_loader;
pub mod graph_builder;
pub mod node;
pub mod tensor_data;

// Re-export key types from the parser module
pub use model_loader::OnnxModelLoader;
pub use graph_builder::GraphBuilder;
pub use node::NodeWrapper;
pub use tensor_data::tensor_to_array;
