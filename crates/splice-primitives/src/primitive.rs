use std::sync::Arc;

use splice_core::data::check_inputs;
use splice_core::error::{Result, SpliceError};
use splice_core::{DataValue, Signature};

use crate::operator::{Operator, Shape};

/// A primitive procedure: one operator bound to one data type.
#[derive(Clone)]
pub struct Primitive {
    signature: Signature,
    data: Signature,
    shape: Shape,
    operator: Arc<dyn Operator>,
}

impl Primitive {
    pub fn new(data: Signature, shape: Shape, operator: Arc<dyn Operator>) -> Self {
        Self {
            signature: Signature::primitive(&data, operator.name()),
            data,
            shape,
            operator,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn data_signature(&self) -> &Signature {
        &self.data
    }

    pub fn operator_name(&self) -> &str {
        self.operator.name()
    }

    pub fn docstring(&self) -> &str {
        self.operator.docstring()
    }

    pub fn input_signatures(&self) -> &[Signature] {
        &self.shape.inputs
    }

    pub fn output_signatures(&self) -> &[Signature] {
        &self.shape.outputs
    }

    /// Validate `inputs` and apply the native function.
    ///
    /// A primitive with any empty input does not fire: every output is empty.
    pub fn run(&self, inputs: Vec<Option<DataValue>>) -> Result<Vec<Option<DataValue>>> {
        check_inputs(&inputs, &self.shape.inputs)?;

        let present: Option<Vec<DataValue>> = inputs.into_iter().collect();
        let Some(present) = present else {
            return Ok(vec![None; self.shape.outputs.len()]);
        };

        let outputs = self.operator.apply(&self.signature, &present)?;
        if outputs.len() != self.shape.outputs.len() {
            return Err(SpliceError::runtime(
                &self.signature,
                format!(
                    "operator produced {} outputs, expected {}",
                    outputs.len(),
                    self.shape.outputs.len()
                ),
            ));
        }
        Ok(outputs)
    }
}

impl std::fmt::Debug for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Primitive")
            .field("signature", &self.signature)
            .field("shape", &self.shape)
            .finish()
    }
}
