use splice_core::error::Result;
use splice_core::{DataValue, Signature, ValueKind};

/// Input and output signatures of an operator instantiated over one data type.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub inputs: Vec<Signature>,
    pub outputs: Vec<Signature>,
}

impl Shape {
    pub fn new(inputs: Vec<Signature>, outputs: Vec<Signature>) -> Self {
        Self { inputs, outputs }
    }

    /// `n` inputs of `data`, one output of `data`.
    pub fn uniform(data: &Signature, n: usize) -> Self {
        Self {
            inputs: vec![data.clone(); n],
            outputs: vec![data.clone()],
        }
    }
}

/// Operator — a fixed-arity native function, parameterised by a data type.
pub trait Operator: Send + Sync + 'static {
    /// Operator name (the suffix of primitive signatures, e.g. `add`).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn docstring(&self) -> &str {
        ""
    }

    /// Shape over `data`, or `None` if values of `kind` are not supported.
    fn shape(&self, data: &Signature, kind: ValueKind) -> Option<Shape>;

    /// Apply the native function. `inputs` are all present and already
    /// validated against the shape; the result must match its output arity.
    fn apply(&self, procedure: &Signature, inputs: &[DataValue]) -> Result<Vec<Option<DataValue>>>;
}
