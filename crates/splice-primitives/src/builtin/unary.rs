use splice_core::error::Result;
use splice_core::{DataValue, Signature, Value, ValueKind};

use super::{overflow, unsupported, with_value};
use crate::operator::{Operator, Shape};

/// `[T] -> [T]` operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    Square,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 3] = [UnaryOp::Not, UnaryOp::Negate, UnaryOp::Square];
}

impl Operator for UnaryOp {
    fn name(&self) -> &str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Negate => "neg",
            UnaryOp::Square => "sq",
        }
    }

    fn docstring(&self) -> &str {
        match self {
            UnaryOp::Not => "not x",
            UnaryOp::Negate => "-x",
            UnaryOp::Square => "x * x",
        }
    }

    fn shape(&self, data: &Signature, kind: ValueKind) -> Option<Shape> {
        let supported = match self {
            UnaryOp::Not => kind == ValueKind::Bool,
            UnaryOp::Negate | UnaryOp::Square => {
                matches!(kind, ValueKind::Int | ValueKind::Float)
            }
        };
        supported.then(|| Shape::uniform(data, 1))
    }

    fn apply(&self, procedure: &Signature, inputs: &[DataValue]) -> Result<Vec<Option<DataValue>>> {
        let x = &inputs[0];
        let value = match (self, x.value()) {
            (UnaryOp::Not, Value::Bool(b)) => Value::Bool(!b),
            (UnaryOp::Negate, Value::Int(i)) => {
                Value::Int(i.checked_neg().ok_or_else(|| overflow(procedure))?)
            }
            (UnaryOp::Negate, Value::Float(f)) => Value::Float(-f),
            (UnaryOp::Square, Value::Int(i)) => {
                Value::Int(i.checked_mul(*i).ok_or_else(|| overflow(procedure))?)
            }
            (UnaryOp::Square, Value::Float(f)) => Value::Float(f * f),
            (_, other) => return Err(unsupported(procedure, other)),
        };
        Ok(vec![Some(with_value(x, value)?)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splice_core::SpliceError;

    fn apply(op: UnaryOp, x: DataValue) -> Result<DataValue> {
        let sig = Signature::primitive(x.signature(), op.name());
        let mut out = op.apply(&sig, &[x])?;
        Ok(out.remove(0).expect("unary output present"))
    }

    #[test]
    fn test_not() {
        let out = apply(UnaryOp::Not, DataValue::bool(true)).unwrap();
        assert_eq!(out.value(), &Value::Bool(false));
    }

    #[test]
    fn test_negate_and_square() {
        assert_eq!(
            apply(UnaryOp::Negate, DataValue::int(5)).unwrap().value(),
            &Value::Int(-5)
        );
        assert_eq!(
            apply(UnaryOp::Square, DataValue::float(1.5)).unwrap().value(),
            &Value::Float(2.25)
        );
    }

    #[test]
    fn test_square_overflow() {
        let err = apply(UnaryOp::Square, DataValue::int(i64::MAX)).unwrap_err();
        assert!(matches!(err, SpliceError::Runtime { .. }));
    }

    #[test]
    fn test_shape_support() {
        let int = Signature::from("int");
        assert!(UnaryOp::Not.shape(&int, ValueKind::Int).is_none());
        let shape = UnaryOp::Negate.shape(&int, ValueKind::Int).unwrap();
        assert_eq!(shape.inputs, vec![int.clone()]);
        assert_eq!(shape.outputs, vec![int]);
    }

    #[test]
    fn test_output_is_a_copy() {
        let x = DataValue::int(3);
        let out = apply(UnaryOp::Negate, x.clone()).unwrap();
        assert_eq!(x.value(), &Value::Int(3));
        assert_eq!(out.signature(), x.signature());
    }
}
