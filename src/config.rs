use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options controlling how ONNX models are imported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Reject binary ops on differing shapes that lack `broadcast=1` in opsets
    /// before 7. When false a warning is logged and the shapes are still checked
    /// for compatibility.
    pub strict_broadcast_flag: bool,
    /// Opset version assumed for the default domain when the model declares none
    pub default_opset_version: i64,
    /// Length substituted for symbolic or unknown input dimensions. Unset means
    /// such inputs are rejected.
    pub dynamic_dim_length: Option<usize>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            strict_broadcast_flag: true,
            default_opset_version: 1,
            dynamic_dim_length: None,
        }
    }
}

impl ImportOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict_broadcast_flag(mut self, strict: bool) -> Self {
        self.strict_broadcast_flag = strict;
        self
    }

    pub fn default_opset_version(mut self, version: i64) -> Self {
        self.default_opset_version = version;
        self
    }

    pub fn dynamic_dim_length(mut self, length: Option<usize>) -> Self {
        self.dynamic_dim_length = length;
        self
    }

    /// Parse options from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read options from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let options = ImportOptions::from_json_str(r#"{ "dynamic_dim_length": 1 }"#).unwrap();
        assert_eq!(options.dynamic_dim_length, Some(1));
        assert!(options.strict_broadcast_flag);
        assert_eq!(options.default_opset_version, 1);
    }

    #[test]
    fn test_builder_and_round_trip() {
        let options = ImportOptions::new()
            .strict_broadcast_flag(false)
            .default_opset_version(7);
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(ImportOptions::from_json_str(&json).unwrap(), options);
    }

    #[test]
    fn test_invalid_json() {
        assert!(ImportOptions::from_json_str("{ not json").is_err());
    }
}
