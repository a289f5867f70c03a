use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;
use prost::Message;

use crate::error::{Error, Result};
use crate::model::{DataType, Dimension, ModelMetadata, TensorInfo};
use crate::proto::{DimensionValue, ModelProto, OperatorSetIdProto, TypeValue, ValueInfoProto};

/// Domain name of the standard operator set. The empty string is an alias.
pub const ONNX_DOMAIN: &str = "ai.onnx";

/// ONNX model loader responsible for decoding models and reading their metadata
pub struct OnnxModelLoader;

impl OnnxModelLoader {
    /// Load an ONNX model from a file path
    pub fn load_model(path: &Path) -> Result<ModelProto> {
        let mut file = File::open(path).map_err(|e| {
            Error::ModelLoadError(path.to_path_buf(), format!("Failed to open file: {}", e))
        })?;

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer).map_err(|e| {
            Error::ModelLoadError(path.to_path_buf(), format!("Failed to read file: {}", e))
        })?;

        debug!("Read {} bytes from {}", buffer.len(), path.display());
        Self::load_model_from_bytes(&buffer)
    }

    /// Load an ONNX model from bytes
    pub fn load_model_from_bytes(data: &[u8]) -> Result<ModelProto> {
        ModelProto::decode(data).map_err(Error::ProtobufError)
    }

    /// Extract model metadata from protobuf
    pub fn extract_model_metadata(proto: &ModelProto) -> ModelMetadata {
        ModelMetadata {
            producer_name: proto.producer_name.clone(),
            producer_version: proto.producer_version.clone(),
            domain: proto.domain.clone(),
            model_version: proto.model_version,
            doc_string: proto.doc_string.clone(),
            graph_name: proto.graph.as_ref()
                .map(|g| g.name.clone())
                .unwrap_or_default(),
            ir_version: proto.ir_version,
            metadata_props: proto.metadata_props.iter()
                .map(|entry| (entry.key.clone(), entry.value.clone()))
                .collect(),
        }
    }

    /// Map each imported domain to its opset version.
    ///
    /// `"ai.onnx"` is stored under the empty domain it aliases.
    pub fn handle_opset_imports(imports: &[OperatorSetIdProto]) -> HashMap<String, i64> {
        let mut opset_map = HashMap::new();

        for import in imports {
            let domain = Self::normalize_domain(&import.domain);
            opset_map.insert(domain.to_string(), import.version);
        }

        opset_map
    }

    /// Collapse the `"ai.onnx"` alias into the empty default domain
    pub fn normalize_domain(domain: &str) -> &str {
        if domain == ONNX_DOMAIN {
            ""
        } else {
            domain
        }
    }

    /// Convert a ValueInfoProto to internal TensorInfo representation
    pub fn convert_value_info_proto(value_info: &ValueInfoProto) -> Result<TensorInfo> {
        let name = value_info.name.clone();

        let type_proto = value_info.r#type.as_ref()
            .ok_or_else(|| Error::MissingField(format!("Missing type for value info: {}", name)))?;

        let tensor_type = match &type_proto.value {
            Some(TypeValue::TensorType(tensor)) => tensor,
            None => {
                return Err(Error::MissingField(format!(
                    "Missing tensor type for value info: {}",
                    name
                )))
            }
        };

        let shape = tensor_type.shape.as_ref().map(|shape| {
            shape.dim.iter()
                .map(|dim| match &dim.value {
                    Some(DimensionValue::DimValue(val)) => Dimension::Value(*val),
                    Some(DimensionValue::DimParam(param)) => Dimension::Param(param.clone()),
                    None => Dimension::Unknown,
                })
                .collect()
        });

        Ok(TensorInfo {
            name,
            shape,
            data_type: DataType::from_proto(tensor_type.elem_type),
        })
    }
}
