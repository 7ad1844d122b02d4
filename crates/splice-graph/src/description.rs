use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use splice_core::error::{Result, SpliceError};
use splice_core::Signature;

use crate::procedure::{JointId, Procedure, Wire};

/// Source format of a description document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionFormat {
    Yaml,
    Json,
}

impl DescriptionFormat {
    /// `.json` files are JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// `[joint-key | null, index]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDescription(pub Option<String>, pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDescription {
    /// Signature of the inner procedure, resolved against the target site.
    pub procedure: Signature,
    #[serde(default)]
    pub input_joints: Vec<WireDescription>,
    /// Unset means the builder's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_cache: Option<bool>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub breakpoint: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureDescription {
    pub signature: Signature,
    #[serde(default)]
    pub docstring: String,
    #[serde(default)]
    pub input_signatures: Vec<Signature>,
    #[serde(default)]
    pub output_signatures: Vec<Signature>,
    #[serde(default)]
    pub joints: IndexMap<String, JointDescription>,
    #[serde(default)]
    pub output_joints: Vec<WireDescription>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ProcedureDescription {
    /// Describe a composite. Returns `None` for primitives.
    pub fn from_procedure(procedure: &Procedure) -> Option<Self> {
        let composite = procedure.as_composite()?;
        let keys: HashMap<JointId, String> = composite
            .joint_ids()
            .zip(composite.joints())
            .map(|(id, joint)| (id, joint.signature().to_string()))
            .collect();
        let describe = |wiring: Option<&[Wire]>| -> Vec<WireDescription> {
            wiring
                .unwrap_or_default()
                .iter()
                .map(|w| WireDescription(w.source.and_then(|s| keys.get(&s).cloned()), w.index))
                .collect()
        };

        let joints = composite
            .joints()
            .iter()
            .map(|joint| {
                let description = JointDescription {
                    procedure: joint.procedure().signature().clone(),
                    input_joints: describe(joint.wiring()),
                    use_cache: Some(joint.use_cache()),
                    breakpoint: joint.has_breakpoint(),
                };
                (joint.signature().to_string(), description)
            })
            .collect();

        Some(Self {
            signature: procedure.signature().clone(),
            docstring: procedure.docstring().to_string(),
            input_signatures: procedure.input_signatures().to_vec(),
            output_signatures: procedure.output_signatures().to_vec(),
            joints,
            output_joints: describe(composite.output_wiring()),
        })
    }
}

/// Parse a list of descriptions.
pub fn parse_description(
    content: &str,
    format: DescriptionFormat,
) -> Result<Vec<ProcedureDescription>> {
    match format {
        DescriptionFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| SpliceError::Description(format!("YAML parse error: {e}"))),
        DescriptionFormat::Json => serde_json::from_str(content)
            .map_err(|e| SpliceError::Description(format!("JSON parse error: {e}"))),
    }
}

/// Read and parse a description file, picking the format from its extension.
pub fn load_description(path: &Path) -> Result<Vec<ProcedureDescription>> {
    let content = std::fs::read_to_string(path)?;
    parse_description(&content, DescriptionFormat::from_path(path))
}

pub fn to_yaml(descriptions: &[ProcedureDescription]) -> Result<String> {
    serde_yaml::to_string(descriptions).map_err(|e| SpliceError::Description(e.to_string()))
}

pub fn to_json(descriptions: &[ProcedureDescription]) -> Result<String> {
    Ok(serde_json::to_string_pretty(descriptions)?)
}
