pub mod binary;
pub mod compare;
pub mod routing;
pub mod unary;

use std::sync::Arc;

use splice_core::error::{Result, SpliceError};
use splice_core::{DataValue, Signature, Value};

use crate::operator::Operator;

/// Every builtin operator, in registration order.
pub fn builtin_operators() -> Vec<Arc<dyn Operator>> {
    let mut ops: Vec<Arc<dyn Operator>> = Vec::new();

    // ── Unary (3) ───────────────────────────────────────────
    for op in unary::UnaryOp::ALL {
        ops.push(Arc::new(op));
    }

    // ── Binary arithmetic / boolean (9) ─────────────────────
    for op in binary::BinaryOp::ALL {
        ops.push(Arc::new(op));
    }

    // ── Comparators (6) ─────────────────────────────────────
    for op in compare::CompareOp::ALL {
        ops.push(Arc::new(op));
    }

    // ── Routing (3) ─────────────────────────────────────────
    ops.push(Arc::new(routing::Switch));
    ops.push(Arc::new(routing::Router::two()));
    ops.push(Arc::new(routing::Router::four()));

    ops
}

/// Clone `input` and store `value` in the copy.
pub(crate) fn with_value(input: &DataValue, value: Value) -> Result<DataValue> {
    let mut out = input.clone();
    out.set_value(value)?;
    Ok(out)
}

pub(crate) fn overflow(procedure: &Signature) -> SpliceError {
    SpliceError::runtime(procedure, "integer overflow")
}

pub(crate) fn division_by_zero(procedure: &Signature) -> SpliceError {
    SpliceError::runtime(procedure, "division by zero")
}

pub(crate) fn unsupported(procedure: &Signature, value: &Value) -> SpliceError {
    SpliceError::runtime(
        procedure,
        format!("unsupported operand kind {}", value.kind()),
    )
}
