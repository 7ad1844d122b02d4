use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpliceError};
use crate::types::Signature;

/// Underlying runtime type of a data signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    String,
    Json,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Json => "json",
        };
        f.write_str(name)
    }
}

/// A raw runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Json(_) => ValueKind::Json,
        }
    }

    /// Zero value of a kind.
    pub fn default_for(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Int => Value::Int(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::String => Value::String(String::new()),
            ValueKind::Json => Value::Json(serde_json::Value::Null),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// NaN and infinite floats have no JSON form and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::json!(i),
            Value::Float(f) => serde_json::json!(f),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Json(v) => v.clone(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// How values of one data signature look.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub label: String,
    pub kind: ValueKind,
    pub default: Value,
}

impl TypeDescriptor {
    pub fn new(label: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            label: label.into(),
            kind,
            default: Value::default_for(kind),
        }
    }

    /// Override the value used when `create` gets no initial value.
    ///
    /// The default must match `kind`; a mismatching default is ignored.
    pub fn with_default(mut self, default: Value) -> Self {
        if default.kind() == self.kind {
            self.default = default;
        }
        self
    }
}

/// A typed runtime value with a stable signature.
///
/// `Clone` yields an independent copy owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct DataValue {
    signature: Signature,
    label: String,
    kind: ValueKind,
    value: Value,
}

impl DataValue {
    pub fn new(signature: Signature, descriptor: &TypeDescriptor) -> Self {
        Self {
            signature,
            label: descriptor.label.clone(),
            kind: descriptor.kind,
            value: descriptor.default.clone(),
        }
    }

    /// A value of the builtin `bool` type.
    pub fn bool(b: bool) -> Self {
        Self::builtin(Signature::BOOL, Value::Bool(b))
    }

    /// A value of the builtin `int` type.
    pub fn int(i: i64) -> Self {
        Self::builtin(Signature::INT, Value::Int(i))
    }

    /// A value of the builtin `float` type.
    pub fn float(f: f64) -> Self {
        Self::builtin(Signature::FLOAT, Value::Float(f))
    }

    /// A value of the builtin `string` type.
    pub fn string(s: impl Into<String>) -> Self {
        Self::builtin(Signature::STRING, Value::String(s.into()))
    }

    fn builtin(signature: &str, value: Value) -> Self {
        Self {
            signature: Signature::from(signature),
            label: signature.to_string(),
            kind: value.kind(),
            value,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Replace the value in place. Fails if the runtime type disagrees with
    /// the declared type of this value's signature.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if value.kind() != self.kind {
            return Err(SpliceError::TypeMismatch {
                signature: self.signature.clone(),
                expected: self.kind,
                actual: value.kind(),
            });
        }
        self.value = value;
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.value.to_json()
    }
}

/// Registry of data types keyed by signature.
#[derive(Debug, Clone, Default)]
pub struct DataFactory {
    types: IndexMap<Signature, TypeDescriptor>,
}

impl DataFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory with the standard data types registered.
    pub fn with_builtins() -> Self {
        let mut types = IndexMap::new();
        types.insert(
            Signature::from(Signature::BOOL),
            TypeDescriptor::new("bool", ValueKind::Bool).with_default(Value::Bool(true)),
        );
        types.insert(
            Signature::from(Signature::INT),
            TypeDescriptor::new("int", ValueKind::Int),
        );
        types.insert(
            Signature::from(Signature::FLOAT),
            TypeDescriptor::new("float", ValueKind::Float),
        );
        types.insert(
            Signature::from(Signature::STRING),
            TypeDescriptor::new("string", ValueKind::String),
        );
        Self { types }
    }

    /// Register an additional data type.
    pub fn register_type(
        &mut self,
        signature: impl Into<Signature>,
        descriptor: TypeDescriptor,
    ) -> Result<()> {
        let signature = signature.into();
        if self.types.contains_key(&signature) {
            return Err(SpliceError::DuplicateSignature(signature));
        }
        self.types.insert(signature, descriptor);
        Ok(())
    }

    pub fn descriptor(&self, signature: &str) -> Option<&TypeDescriptor> {
        self.types.get(signature)
    }

    pub fn kind_of(&self, signature: &str) -> Option<ValueKind> {
        self.descriptor(signature).map(|d| d.kind)
    }

    /// Registered signatures in registration order. Each call starts over.
    pub fn signatures(&self) -> impl Iterator<Item = &Signature> + '_ {
        self.types.keys()
    }

    /// Create a value of `signature`, optionally with an initial value.
    pub fn create(&self, signature: &str, initial: Option<Value>) -> Result<DataValue> {
        let (signature, descriptor) = self
            .types
            .get_key_value(signature)
            .ok_or_else(|| SpliceError::UnknownSignature(Signature::from(signature)))?;

        let mut data = DataValue::new(signature.clone(), descriptor);
        if let Some(value) = initial {
            data.set_value(value)?;
        }
        Ok(data)
    }

    /// Marshal a raw JSON value into a value of `signature`.
    pub fn from_json(&self, signature: &str, raw: &serde_json::Value) -> Result<DataValue> {
        let kind = self
            .kind_of(signature)
            .ok_or_else(|| SpliceError::UnknownSignature(Signature::from(signature)))?;

        let value = match kind {
            ValueKind::Bool => raw.as_bool().map(Value::Bool),
            ValueKind::Int => raw.as_i64().map(Value::Int),
            ValueKind::Float => raw.as_f64().map(Value::Float),
            ValueKind::String => raw.as_str().map(Value::from),
            ValueKind::Json => Some(Value::Json(raw.clone())),
        };

        match value {
            Some(v) => self.create(signature, Some(v)),
            None => Err(SpliceError::TypeMismatch {
                signature: Signature::from(signature),
                expected: kind,
                actual: json_kind(raw),
            }),
        }
    }
}

/// Validate a run's input list against declared signatures.
///
/// Empty entries are accepted; present values must carry the declared
/// signature at their position.
pub fn check_inputs(inputs: &[Option<DataValue>], signatures: &[Signature]) -> Result<()> {
    if inputs.len() != signatures.len() {
        return Err(SpliceError::ArityMismatch {
            expected: signatures.len(),
            actual: inputs.len(),
        });
    }
    for (position, (data, expected)) in inputs.iter().zip(signatures).enumerate() {
        if let Some(data) = data {
            if data.signature() != expected {
                return Err(SpliceError::SignatureMismatch {
                    position,
                    expected: expected.clone(),
                    actual: data.signature().clone(),
                });
            }
        }
    }
    Ok(())
}

fn json_kind(raw: &serde_json::Value) -> ValueKind {
    match raw {
        serde_json::Value::Bool(_) => ValueKind::Bool,
        serde_json::Value::Number(n) if n.is_i64() => ValueKind::Int,
        serde_json::Value::Number(_) => ValueKind::Float,
        serde_json::Value::String(_) => ValueKind::String,
        _ => ValueKind::Json,
    }
}
