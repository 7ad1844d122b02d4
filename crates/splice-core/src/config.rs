use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::{DataFactory, TypeDescriptor, ValueKind};
use crate::error::{Result, SpliceError};

/// Top-level Splice configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    /// Extra data types registered at startup.
    #[serde(default)]
    pub types: Vec<TypeConfig>,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Cache setting for builder joints that do not state `use_cache`.
    #[serde(default)]
    pub default_cache: bool,
    /// Maximum nesting of composite invocations within one run.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_cache: false,
            max_depth: default_max_depth(),
        }
    }
}

/// Description files loaded into the workspace site, in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    #[serde(default)]
    pub paths: Vec<String>,
}

/// A user data type declared in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeConfig {
    pub signature: String,
    #[serde(default)]
    pub label: Option<String>,
    pub kind: ValueKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_max_depth() -> usize { 64 }
fn default_log_filter() -> String { "splice=info,warn".to_string() }

impl AppConfig {
    /// Load config from a TOML file, with env var expansion.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| SpliceError::ConfigNotFound(path.display().to_string()))?;

        // Expand ${ENV_VAR} references
        let expanded = expand_env_vars(&content);

        toml::from_str(&expanded).map_err(|e| SpliceError::Config(e.to_string()))
    }

    /// Library paths resolved against the directory holding the config file.
    pub fn library_paths(&self, config_path: &Path) -> Vec<PathBuf> {
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        self.library
            .paths
            .iter()
            .map(|p| {
                let path = PathBuf::from(p);
                if path.is_absolute() {
                    path
                } else {
                    base.join(path)
                }
            })
            .collect()
    }

    /// Build a data factory with the builtin types plus `[[types]]`.
    pub fn data_factory(&self) -> Result<DataFactory> {
        let mut factory = DataFactory::with_builtins();
        for ty in &self.types {
            let label = ty.label.clone().unwrap_or_else(|| ty.signature.clone());
            factory.register_type(ty.signature.as_str(), TypeDescriptor::new(label, ty.kind))?;
        }
        Ok(factory)
    }
}

/// Expand `${ENV_VAR}` patterns in a string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            match std::env::var(&var_name) {
                Ok(val) => result.push_str(&val),
                Err(_) => {
                    // Keep original if env var not set
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}
