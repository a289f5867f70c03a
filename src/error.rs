use thiserror::Error;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Protobuf parsing error: {0}")]
    ProtobufError(#[from] prost::DecodeError),

    #[error("Failed to load model from {0}: {1}")]
    ModelLoadError(PathBuf, String),

    #[error("Invalid ONNX model: {0}")]
    InvalidModel(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid graph structure: {0}")]
    InvalidGraph(String),

    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Broadcast error: {0}")]
    BroadcastMismatch(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Axis error: {0}")]
    AxisMismatch(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Array shape error: {0}")]
    ArrayShape(#[from] ndarray::ShapeError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] serde_json::Error),
}
