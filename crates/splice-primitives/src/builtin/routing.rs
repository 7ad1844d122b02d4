use splice_core::error::Result;
use splice_core::{DataValue, Signature, ValueKind};

use super::unsupported;
use crate::operator::{Operator, Shape};

/// `[bool, T] -> [T, T]`: the value goes to output 0 when the gate is false,
/// to output 1 when it is true. The other output is empty.
#[derive(Debug, Clone, Copy)]
pub struct Switch;

impl Operator for Switch {
    fn name(&self) -> &str {
        "switch"
    }

    fn docstring(&self) -> &str {
        "route x to output 0 if gate is false, else to output 1"
    }

    fn shape(&self, data: &Signature, _kind: ValueKind) -> Option<Shape> {
        Some(Shape::new(
            vec![Signature::from(Signature::BOOL), data.clone()],
            vec![data.clone(), data.clone()],
        ))
    }

    fn apply(&self, procedure: &Signature, inputs: &[DataValue]) -> Result<Vec<Option<DataValue>>> {
        let gate = inputs[0]
            .value()
            .as_bool()
            .ok_or_else(|| unsupported(procedure, inputs[0].value()))?;
        let value = inputs[1].clone();
        Ok(if gate {
            vec![None, Some(value)]
        } else {
            vec![Some(value), None]
        })
    }
}

/// `[int, T] -> [T; width]`: output `k` carries a copy of the value iff bit
/// `k` of the gate is set.
#[derive(Debug, Clone, Copy)]
pub struct Router {
    name: &'static str,
    width: usize,
}

impl Router {
    pub fn two() -> Self {
        Self {
            name: "router2",
            width: 2,
        }
    }

    pub fn four() -> Self {
        Self {
            name: "router4",
            width: 4,
        }
    }
}

impl Operator for Router {
    fn name(&self) -> &str {
        self.name
    }

    fn docstring(&self) -> &str {
        "copy x to every output whose bit is set in gate"
    }

    fn shape(&self, data: &Signature, _kind: ValueKind) -> Option<Shape> {
        Some(Shape::new(
            vec![Signature::from(Signature::INT), data.clone()],
            vec![data.clone(); self.width],
        ))
    }

    fn apply(&self, procedure: &Signature, inputs: &[DataValue]) -> Result<Vec<Option<DataValue>>> {
        let gate = inputs[0]
            .value()
            .as_int()
            .ok_or_else(|| unsupported(procedure, inputs[0].value()))?;
        Ok((0..self.width)
            .map(|k| ((gate >> k) & 1 == 1).then(|| inputs[1].clone()))
            .collect())
    }
}
