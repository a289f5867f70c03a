use crate::error::{Error, Result};
use crate::model::Attribute;
use crate::proto::{AttributeProto, AttributeType, NodeProto, TensorProto};

/// Convert an AttributeProto to internal Attribute representation.
///
/// IR version 1 models leave `type` unset; the value is then inferred from
/// whichever field is populated.
pub fn convert_attribute_proto(attr: &AttributeProto) -> Result<Attribute> {
    let string = |bytes: &[u8]| String::from_utf8_lossy(bytes).into_owned();

    match attr.r#type() {
        AttributeType::Float => Ok(Attribute::Float(attr.f)),
        AttributeType::Int => Ok(Attribute::Int(attr.i)),
        AttributeType::String => Ok(Attribute::String(string(&attr.s))),
        AttributeType::Tensor => attr.t.clone().map(Attribute::Tensor).ok_or_else(|| {
            Error::MissingField(format!("Missing tensor in attribute {}", attr.name))
        }),
        AttributeType::Floats => Ok(Attribute::Floats(attr.floats.clone())),
        AttributeType::Ints => Ok(Attribute::Ints(attr.ints.clone())),
        AttributeType::Strings => Ok(Attribute::Strings(
            attr.strings.iter().map(|s| string(s)).collect(),
        )),
        AttributeType::Tensors => Ok(Attribute::Tensors(attr.tensors.clone())),
        AttributeType::Undefined => {
            if !attr.floats.is_empty() {
                Ok(Attribute::Floats(attr.floats.clone()))
            } else if !attr.ints.is_empty() {
                Ok(Attribute::Ints(attr.ints.clone()))
            } else if !attr.strings.is_empty() {
                Ok(Attribute::Strings(attr.strings.iter().map(|s| string(s)).collect()))
            } else if !attr.tensors.is_empty() {
                Ok(Attribute::Tensors(attr.tensors.clone()))
            } else if let Some(t) = &attr.t {
                Ok(Attribute::Tensor(t.clone()))
            } else if !attr.s.is_empty() {
                Ok(Attribute::String(string(&attr.s)))
            } else if attr.f != 0.0 {
                Ok(Attribute::Float(attr.f))
            } else {
                Ok(Attribute::Int(attr.i))
            }
        }
        other => Err(Error::UnsupportedFeature(format!(
            "Attribute {} has unsupported type {:?}",
            attr.name, other
        ))),
    }
}

/// Typed access to the fields and attributes of an ONNX node
#[derive(Debug, Clone, Copy)]
pub struct NodeWrapper<'a> {
    proto: &'a NodeProto,
    opset_version: i64,
}

impl<'a> NodeWrapper<'a> {
    pub fn new(proto: &'a NodeProto, opset_version: i64) -> Self {
        Self { proto, opset_version }
    }

    pub fn proto(&self) -> &'a NodeProto {
        self.proto
    }

    pub fn op_type(&self) -> &'a str {
        &self.proto.op_type
    }

    pub fn domain(&self) -> &'a str {
        &self.proto.domain
    }

    /// Node name, falling back to its first output
    pub fn name(&self) -> &'a str {
        if !self.proto.name.is_empty() {
            &self.proto.name
        } else {
            self.proto.output.first().map(String::as_str).unwrap_or("")
        }
    }

    pub fn inputs(&self) -> &'a [String] {
        &self.proto.input
    }

    pub fn outputs(&self) -> &'a [String] {
        &self.proto.output
    }

    /// Opset version of the node's domain
    pub fn opset_version(&self) -> i64 {
        self.opset_version
    }

    fn attribute_proto(&self, name: &str) -> Option<&'a AttributeProto> {
        self.proto.attribute.iter().find(|a| a.name == name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute_proto(name).is_some()
    }

    pub fn get_attribute(&self, name: &str) -> Result<Option<Attribute>> {
        self.attribute_proto(name).map(convert_attribute_proto).transpose()
    }

    fn type_error(&self, name: &str, expected: &str, found: &Attribute) -> Error {
        Error::InvalidAttribute(format!(
            "{} node ({}): attribute \"{}\" should be {}, found {}",
            self.op_type(),
            self.name(),
            name,
            expected,
            found.kind()
        ))
    }

    /// Float attribute; integer values are accepted
    pub fn get_float(&self, name: &str) -> Result<Option<f32>> {
        match self.get_attribute(name)? {
            None => Ok(None),
            Some(Attribute::Float(v)) => Ok(Some(v)),
            Some(Attribute::Int(v)) => Ok(Some(v as f32)),
            Some(other) => Err(self.type_error(name, "a float", &other)),
        }
    }

    pub fn get_float_or(&self, name: &str, default: f32) -> Result<f32> {
        Ok(self.get_float(name)?.unwrap_or(default))
    }

    pub fn get_int(&self, name: &str) -> Result<Option<i64>> {
        match self.get_attribute(name)? {
            None => Ok(None),
            Some(Attribute::Int(v)) => Ok(Some(v)),
            Some(other) => Err(self.type_error(name, "an int", &other)),
        }
    }

    pub fn get_int_or(&self, name: &str, default: i64) -> Result<i64> {
        Ok(self.get_int(name)?.unwrap_or(default))
    }

    pub fn get_ints(&self, name: &str) -> Result<Option<Vec<i64>>> {
        match self.get_attribute(name)? {
            None => Ok(None),
            Some(Attribute::Ints(v)) => Ok(Some(v)),
            Some(Attribute::Int(v)) => Ok(Some(vec![v])),
            Some(other) => Err(self.type_error(name, "a list of ints", &other)),
        }
    }

    pub fn get_tensor(&self, name: &str) -> Result<Option<TensorProto>> {
        match self.get_attribute(name)? {
            None => Ok(None),
            Some(Attribute::Tensor(t)) => Ok(Some(t)),
            Some(other) => Err(self.type_error(name, "a tensor", &other)),
        }
    }
}
