use std::cmp::Ordering;

use splice_core::error::Result;
use splice_core::{DataValue, Signature, Value, ValueKind};

use crate::operator::{Operator, Shape};

/// `[T, T] -> [bool]` comparators. The output is always a fresh `bool` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl CompareOp {
    pub const ALL: [CompareOp; 6] = [
        CompareOp::Equal,
        CompareOp::NotEqual,
        CompareOp::Less,
        CompareOp::LessEqual,
        CompareOp::Greater,
        CompareOp::GreaterEqual,
    ];

    fn evaluate(&self, a: &Value, b: &Value) -> bool {
        match self {
            CompareOp::Equal => a == b,
            CompareOp::NotEqual => a != b,
            CompareOp::Less => matches!(order(a, b), Some(Ordering::Less)),
            CompareOp::LessEqual => {
                matches!(order(a, b), Some(Ordering::Less | Ordering::Equal))
            }
            CompareOp::Greater => matches!(order(a, b), Some(Ordering::Greater)),
            CompareOp::GreaterEqual => {
                matches!(order(a, b), Some(Ordering::Greater | Ordering::Equal))
            }
        }
    }
}

/// NaN and mixed kinds are unordered, so every ordering comparison is false.
fn order(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

impl Operator for CompareOp {
    fn name(&self) -> &str {
        match self {
            CompareOp::Equal => "eq",
            CompareOp::NotEqual => "ne",
            CompareOp::Less => "lt",
            CompareOp::LessEqual => "lte",
            CompareOp::Greater => "gt",
            CompareOp::GreaterEqual => "gte",
        }
    }

    fn docstring(&self) -> &str {
        match self {
            CompareOp::Equal => "x == y",
            CompareOp::NotEqual => "x != y",
            CompareOp::Less => "x < y",
            CompareOp::LessEqual => "x <= y",
            CompareOp::Greater => "x > y",
            CompareOp::GreaterEqual => "x >= y",
        }
    }

    fn shape(&self, data: &Signature, kind: ValueKind) -> Option<Shape> {
        let supported = match self {
            CompareOp::Equal | CompareOp::NotEqual => true,
            _ => matches!(kind, ValueKind::Int | ValueKind::Float | ValueKind::String),
        };
        supported.then(|| {
            Shape::new(
                vec![data.clone(), data.clone()],
                vec![Signature::from(Signature::BOOL)],
            )
        })
    }

    fn apply(&self, _procedure: &Signature, inputs: &[DataValue]) -> Result<Vec<Option<DataValue>>> {
        let result = self.evaluate(inputs[0].value(), inputs[1].value());
        Ok(vec![Some(DataValue::bool(result))])
    }
}
