use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use splice_core::error::{Result, SpliceError};
use splice_core::{DataValue, Signature, Value, ValueKind};
use splice_primitives::{Operator, Shape};

/// `(a:int, b:int) -> [a + b, a - b]`.
pub const SCENARIO_A: &str = r#"
- signature: add_sub
  docstring: a + b, a - b
  input_signatures: [int, int]
  output_signatures: [int, int]
  joints:
    add:
      procedure: int:add
      input_joints: [[null, 0], [null, 1]]
    sub:
      procedure: int:sub
      input_joints: [[null, 0], [null, 1]]
  output_joints: [[add, 0], [sub, 0]]
"#;

/// `(x + y) * z` over floats.
pub const SCENARIO_B: &str = r#"
- signature: sum_times
  docstring: (x + y) * z
  input_signatures: [float, float, float]
  output_signatures: [float]
  joints:
    add:
      procedure: float:add
      input_joints: [[null, 0], [null, 1]]
    mul:
      procedure: float:mul
      input_joints: [[add, 0], [null, 2]]
  output_joints: [[mul, 0]]
"#;

/// `x + y * z` over floats.
pub const SCENARIO_C: &str = r#"
- signature: sum_of_product
  docstring: x + y * z
  input_signatures: [float, float, float]
  output_signatures: [float]
  joints:
    mul:
      procedure: float:mul
      input_joints: [[null, 1], [null, 2]]
    add:
      procedure: float:add
      input_joints: [[null, 0], [mul, 0]]
  output_joints: [[add, 0]]
"#;

/// Both outputs read the `square` joint. Needs [`CountingOperator`]
/// registered.
pub const DIAMOND: &str = r#"
- signature: diamond
  docstring: x * x, -(x * x)
  input_signatures: [int]
  output_signatures: [int, int]
  joints:
    square:
      procedure: int:counting
      input_joints: [[null, 0]]
      use_cache: true
    negate:
      procedure: int:neg
      input_joints: [[square, 0]]
  output_joints: [[square, 0], [negate, 0]]
"#;

/// Squares its input and counts how often it ran.
#[derive(Debug, Clone, Default)]
pub struct CountingOperator {
    calls: Arc<AtomicUsize>,
}

impl CountingOperator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared counter, readable after the operator is moved into a library.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Operator for CountingOperator {
    fn name(&self) -> &str {
        "counting"
    }

    fn docstring(&self) -> &str {
        "x * x, counted"
    }

    fn shape(&self, data: &Signature, kind: ValueKind) -> Option<Shape> {
        matches!(kind, ValueKind::Int | ValueKind::Float).then(|| Shape::uniform(data, 1))
    }

    fn apply(&self, procedure: &Signature, inputs: &[DataValue]) -> Result<Vec<Option<DataValue>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let value = match inputs[0].value() {
            Value::Int(i) => i
                .checked_mul(*i)
                .map(Value::Int)
                .ok_or_else(|| SpliceError::runtime(procedure, "integer overflow"))?,
            Value::Float(f) => Value::Float(f * f),
            other => {
                return Err(SpliceError::runtime(
                    procedure,
                    format!("unsupported operand kind {}", other.kind()),
                ))
            }
        };
        let mut out = inputs[0].clone();
        out.set_value(value)?;
        Ok(vec![Some(out)])
    }
}

pub fn int(i: i64) -> DataValue {
    DataValue::int(i)
}

pub fn float(f: f64) -> DataValue {
    DataValue::float(f)
}

pub fn boolean(b: bool) -> DataValue {
    DataValue::bool(b)
}

pub fn string(s: &str) -> DataValue {
    DataValue::string(s)
}
