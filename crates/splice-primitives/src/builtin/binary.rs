use splice_core::error::{Result, SpliceError};
use splice_core::{DataValue, Signature, Value, ValueKind};

use super::{division_by_zero, overflow, unsupported, with_value};
use crate::operator::{Operator, Shape};

/// `[T, T] -> [T]` operators.
///
/// Integer arithmetic is checked; overflow and zero divisors fail the run.
/// `mod` and `floordiv` round toward negative infinity, so the remainder
/// takes the sign of the divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    FloorDivide,
    Power,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 9] = [
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Add,
        BinaryOp::Subtract,
        BinaryOp::Multiply,
        BinaryOp::Divide,
        BinaryOp::Modulo,
        BinaryOp::FloorDivide,
        BinaryOp::Power,
    ];

    fn supports(&self, kind: ValueKind) -> bool {
        match self {
            BinaryOp::And | BinaryOp::Or => kind == ValueKind::Bool,
            BinaryOp::Add => matches!(
                kind,
                ValueKind::Int | ValueKind::Float | ValueKind::String
            ),
            BinaryOp::Divide => kind == ValueKind::Float,
            BinaryOp::Subtract
            | BinaryOp::Multiply
            | BinaryOp::Modulo
            | BinaryOp::FloorDivide
            | BinaryOp::Power => matches!(kind, ValueKind::Int | ValueKind::Float),
        }
    }

    fn int(&self, procedure: &Signature, a: i64, b: i64) -> Result<i64> {
        let result = match self {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Subtract => a.checked_sub(b),
            BinaryOp::Multiply => a.checked_mul(b),
            BinaryOp::Modulo => {
                if b == 0 {
                    return Err(division_by_zero(procedure));
                }
                if b == -1 {
                    return Ok(0);
                }
                a.checked_rem(b)
                    .map(|r| if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
            }
            BinaryOp::FloorDivide => {
                if b == 0 {
                    return Err(division_by_zero(procedure));
                }
                a.checked_div(b).map(|q| {
                    if a % b != 0 && (a < 0) != (b < 0) {
                        q - 1
                    } else {
                        q
                    }
                })
            }
            BinaryOp::Power => {
                if b < 0 {
                    return Err(SpliceError::runtime(procedure, "negative integer exponent"));
                }
                match a {
                    0 => Some(if b == 0 { 1 } else { 0 }),
                    1 => Some(1),
                    -1 => Some(if b % 2 == 0 { 1 } else { -1 }),
                    _ => u32::try_from(b).ok().and_then(|e| a.checked_pow(e)),
                }
            }
            _ => return Err(unsupported(procedure, &Value::Int(a))),
        };
        result.ok_or_else(|| overflow(procedure))
    }

    fn float(&self, procedure: &Signature, a: f64, b: f64) -> Result<f64> {
        Ok(match self {
            BinaryOp::Add => a + b,
            BinaryOp::Subtract => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide => {
                if b == 0.0 {
                    return Err(division_by_zero(procedure));
                }
                a / b
            }
            BinaryOp::Modulo => {
                if b == 0.0 {
                    return Err(division_by_zero(procedure));
                }
                let r = a % b;
                if r != 0.0 && (r < 0.0) != (b < 0.0) {
                    r + b
                } else {
                    r
                }
            }
            BinaryOp::FloorDivide => {
                if b == 0.0 {
                    return Err(division_by_zero(procedure));
                }
                (a / b).floor()
            }
            BinaryOp::Power => a.powf(b),
            _ => return Err(unsupported(procedure, &Value::Float(a))),
        })
    }
}

impl Operator for BinaryOp {
    fn name(&self) -> &str {
        match self {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Add => "add",
            BinaryOp::Subtract => "sub",
            BinaryOp::Multiply => "mul",
            BinaryOp::Divide => "div",
            BinaryOp::Modulo => "mod",
            BinaryOp::FloorDivide => "floordiv",
            BinaryOp::Power => "pow",
        }
    }

    fn docstring(&self) -> &str {
        match self {
            BinaryOp::And => "x and y",
            BinaryOp::Or => "x or y",
            BinaryOp::Add => "x + y",
            BinaryOp::Subtract => "x - y",
            BinaryOp::Multiply => "x * y",
            BinaryOp::Divide => "x / y",
            BinaryOp::Modulo => "x mod y",
            BinaryOp::FloorDivide => "floor(x / y)",
            BinaryOp::Power => "x ** y",
        }
    }

    fn shape(&self, data: &Signature, kind: ValueKind) -> Option<Shape> {
        self.supports(kind).then(|| Shape::uniform(data, 2))
    }

    fn apply(&self, procedure: &Signature, inputs: &[DataValue]) -> Result<Vec<Option<DataValue>>> {
        let (x, y) = (&inputs[0], &inputs[1]);
        let value = match (self, x.value(), y.value()) {
            (BinaryOp::And, Value::Bool(a), Value::Bool(b)) => Value::Bool(*a && *b),
            (BinaryOp::Or, Value::Bool(a), Value::Bool(b)) => Value::Bool(*a || *b),
            (BinaryOp::Add, Value::String(a), Value::String(b)) => Value::String(format!("{a}{b}")),
            (op, Value::Int(a), Value::Int(b)) => Value::Int(op.int(procedure, *a, *b)?),
            (op, Value::Float(a), Value::Float(b)) => Value::Float(op.float(procedure, *a, *b)?),
            (_, other, _) => return Err(unsupported(procedure, other)),
        };
        Ok(vec![Some(with_value(x, value)?)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(op: BinaryOp, x: DataValue, y: DataValue) -> Result<Value> {
        let sig = Signature::primitive(x.signature(), op.name());
        let mut out = op.apply(&sig, &[x, y])?;
        Ok(out.remove(0).expect("binary output present").into_value())
    }

    #[test]
    fn test_int_arithmetic() {
        let i = DataValue::int;
        assert_eq!(apply(BinaryOp::Add, i(1), i(2)).unwrap(), Value::Int(3));
        assert_eq!(apply(BinaryOp::Subtract, i(1), i(2)).unwrap(), Value::Int(-1));
        assert_eq!(apply(BinaryOp::Multiply, i(4), i(-3)).unwrap(), Value::Int(-12));
        assert_eq!(apply(BinaryOp::Power, i(2), i(10)).unwrap(), Value::Int(1024));
    }

    #[test]
    fn test_floor_semantics() {
        let i = DataValue::int;
        assert_eq!(apply(BinaryOp::Modulo, i(-7), i(3)).unwrap(), Value::Int(2));
        assert_eq!(apply(BinaryOp::Modulo, i(7), i(-3)).unwrap(), Value::Int(-2));
        assert_eq!(apply(BinaryOp::FloorDivide, i(-7), i(2)).unwrap(), Value::Int(-4));
        assert_eq!(apply(BinaryOp::FloorDivide, i(7), i(2)).unwrap(), Value::Int(3));

        let f = DataValue::float;
        assert_eq!(apply(BinaryOp::Modulo, f(-7.0), f(3.0)).unwrap(), Value::Float(2.0));
        assert_eq!(
            apply(BinaryOp::FloorDivide, f(-7.0), f(2.0)).unwrap(),
            Value::Float(-4.0)
        );
    }

    #[test]
    fn test_float_division() {
        let f = DataValue::float;
        assert_eq!(apply(BinaryOp::Divide, f(1.0), f(4.0)).unwrap(), Value::Float(0.25));
    }

    #[test]
    fn test_division_by_zero() {
        let err = apply(BinaryOp::Modulo, DataValue::int(1), DataValue::int(0)).unwrap_err();
        assert!(matches!(err, SpliceError::Runtime { ref message, .. } if message == "division by zero"));
        assert!(apply(BinaryOp::Divide, DataValue::float(1.0), DataValue::float(0.0)).is_err());
    }

    #[test]
    fn test_overflow_and_negative_exponent() {
        let i = DataValue::int;
        assert!(apply(BinaryOp::Add, i(i64::MAX), i(1)).is_err());
        assert!(apply(BinaryOp::Power, i(2), i(-1)).is_err());
    }

    #[test]
    fn test_int_edge_operands() {
        let i = DataValue::int;
        assert_eq!(apply(BinaryOp::Modulo, i(i64::MIN), i(-1)).unwrap(), Value::Int(0));
        assert_eq!(apply(BinaryOp::Modulo, i(7), i(-1)).unwrap(), Value::Int(0));
        assert!(apply(BinaryOp::FloorDivide, i(i64::MIN), i(-1)).is_err());

        let huge = 1i64 << 32;
        assert_eq!(apply(BinaryOp::Power, i(1), i(huge)).unwrap(), Value::Int(1));
        assert_eq!(apply(BinaryOp::Power, i(0), i(huge)).unwrap(), Value::Int(0));
        assert_eq!(apply(BinaryOp::Power, i(0), i(0)).unwrap(), Value::Int(1));
        assert_eq!(apply(BinaryOp::Power, i(-1), i(huge)).unwrap(), Value::Int(1));
        assert_eq!(apply(BinaryOp::Power, i(-1), i(huge + 1)).unwrap(), Value::Int(-1));
        assert!(apply(BinaryOp::Power, i(2), i(huge)).is_err());
    }

    #[test]
    fn test_boolean_and_string() {
        let b = DataValue::bool;
        assert_eq!(apply(BinaryOp::And, b(true), b(false)).unwrap(), Value::Bool(false));
        assert_eq!(apply(BinaryOp::Or, b(true), b(false)).unwrap(), Value::Bool(true));
        assert_eq!(
            apply(BinaryOp::Add, DataValue::string("ab"), DataValue::string("cd")).unwrap(),
            Value::String("abcd".into())
        );
    }

    #[test]
    fn test_shape_support() {
        let int = Signature::from("int");
        assert!(BinaryOp::Divide.shape(&int, ValueKind::Int).is_none());
        assert!(BinaryOp::And.shape(&int, ValueKind::Int).is_none());
        let shape = BinaryOp::Add.shape(&int, ValueKind::Int).unwrap();
        assert_eq!(shape.inputs.len(), 2);
        assert_eq!(shape.outputs, vec![int]);
    }
}
