//! Import ONNX models into a named-axis computation graph.

pub mod axes;
pub mod config;
pub mod convert;
pub mod error;
pub mod execution;
pub mod importer;
pub mod model;
pub mod ops;
pub mod parser;
pub mod proto;

// Re-export commonly used types
pub use axes::{Axes, Axis};
pub use config::ImportOptions;
pub use convert::{ConversionContext, Converter, ConverterRegistry};
pub use error::{Error, Result};
pub use execution::{Computation, Transformer};
pub use importer::{
    import_onnx_bytes, import_onnx_file, import_onnx_model, import_onnx_model_with_options,
    ImportedModel, ImportedOutput,
};
pub use model::{DataType, Dimension, ModelMetadata, TensorInfo};
pub use ops::{BinaryOp, Op, OpGraph, OpId, OpKind, ReduceOp, UnaryOp};
