use std::collections::HashMap;

use tracing::debug;

use splice_core::data::check_inputs;
use splice_core::error::{Result, SpliceError};
use splice_core::DataValue;

use crate::procedure::{Body, Composite, Joint, Procedure, Wire};

/// Limits for one top-level run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Maximum nesting of composite invocations.
    pub max_depth: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

impl RunOptions {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

/// Pending work while evaluating one composite invocation.
enum Step<'p> {
    /// Push the value a wire carries.
    Resolve(&'p Wire),
    /// Push a joint's outputs, from the cache or by running it.
    Evaluate(usize),
    /// Run a joint on the last `arity` resolved values.
    Apply { index: usize, arity: usize },
    /// Pop the last joint outputs and push the one at this position.
    Take(usize),
}

/// Evaluator for one top-level `run`.
///
/// Joints inside a composite are walked with an explicit work stack, so a
/// long chain costs heap, not call stack. Only nested composites recurse,
/// and `RunOptions::max_depth` bounds that.
pub(crate) struct Evaluator<'o> {
    options: &'o RunOptions,
    depth: usize,
}

impl<'o> Evaluator<'o> {
    pub(crate) fn new(options: &'o RunOptions) -> Self {
        Self { options, depth: 0 }
    }

    pub(crate) fn run(
        &mut self,
        procedure: &Procedure,
        inputs: Vec<Option<DataValue>>,
    ) -> Result<Vec<Option<DataValue>>> {
        match procedure.body() {
            Body::Primitive(primitive) => primitive.run(inputs),
            Body::Composite(composite) => self.run_composite(procedure, composite, inputs),
        }
    }

    fn run_composite(
        &mut self,
        procedure: &Procedure,
        composite: &Composite,
        inputs: Vec<Option<DataValue>>,
    ) -> Result<Vec<Option<DataValue>>> {
        check_inputs(&inputs, procedure.input_signatures())?;

        let outputs = composite.output_wiring().ok_or_else(|| {
            SpliceError::InvalidTopology(format!("outputs of {} are not wired", procedure.signature()))
        })?;

        if self.depth >= self.options.max_depth {
            return Err(SpliceError::DepthExceeded(self.options.max_depth));
        }
        self.depth += 1;
        let result = self.drive(composite.joints(), &inputs, outputs);
        self.depth -= 1;
        result
    }

    /// Resolve `outputs` demand-first. Every consumer of a joint that did not
    /// opt into the cache runs it again; the cache lives only as long as this
    /// invocation.
    fn drive<'p>(
        &mut self,
        joints: &'p [Joint],
        inputs: &[Option<DataValue>],
        outputs: &'p [Wire],
    ) -> Result<Vec<Option<DataValue>>> {
        let mut cache: HashMap<usize, Vec<Option<DataValue>>> = HashMap::new();
        let mut values: Vec<Option<DataValue>> = Vec::with_capacity(outputs.len());
        let mut results: Vec<Vec<Option<DataValue>>> = Vec::new();
        let mut steps: Vec<Step<'p>> = outputs.iter().rev().map(Step::Resolve).collect();

        while let Some(step) = steps.pop() {
            match step {
                Step::Resolve(wire) => match wire.source {
                    None => {
                        let value = inputs.get(wire.index).cloned().ok_or(
                            SpliceError::IndexOutOfRange {
                                index: wire.index,
                                len: inputs.len(),
                            },
                        )?;
                        values.push(value);
                    }
                    Some(id) => {
                        steps.push(Step::Take(wire.index));
                        steps.push(Step::Evaluate(id.index()));
                    }
                },
                Step::Evaluate(index) => {
                    let joint = &joints[index];
                    if joint.use_cache() {
                        if let Some(hit) = cache.get(&index) {
                            debug!(joint = %joint.signature(), "Joint cache hit");
                            results.push(hit.clone());
                            continue;
                        }
                    }
                    let wiring = joint.wiring().ok_or_else(|| {
                        SpliceError::InvalidTopology(format!(
                            "joint {} is not wired",
                            joint.signature()
                        ))
                    })?;
                    steps.push(Step::Apply {
                        index,
                        arity: wiring.len(),
                    });
                    steps.extend(wiring.iter().rev().map(Step::Resolve));
                }
                Step::Apply { index, arity } => {
                    let joint = &joints[index];
                    let resolved = values.split_off(values.len() - arity);
                    debug!(
                        joint = %joint.signature(),
                        procedure = %joint.procedure().signature(),
                        "Evaluating joint"
                    );
                    let produced = self.run(joint.procedure(), resolved)?;
                    if joint.use_cache() {
                        cache.insert(index, produced.clone());
                    }
                    results.push(produced);
                }
                Step::Take(position) => {
                    let produced = results.pop().unwrap_or_default();
                    let len = produced.len();
                    let value = produced
                        .into_iter()
                        .nth(position)
                        .ok_or(SpliceError::IndexOutOfRange {
                            index: position,
                            len,
                        })?;
                    values.push(value);
                }
            }
        }
        Ok(values)
    }
}
