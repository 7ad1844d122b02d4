use tracing::debug;

use splice_core::error::{Result, SpliceError};
use splice_core::{DataFactory, Value};

use crate::evaluator::RunOptions;
use crate::site::Site;

/// Run `signature` on raw JSON values.
///
/// Each raw value is marshaled through the data factory using the declared
/// input signature at its position; `null` is an empty input. Empty outputs
/// come back as `null`. A NaN or infinite float output fails with `Runtime`
/// rather than being confused with an empty one. Every call gets its own
/// per-run cache, so concurrent calls on one site are independent.
pub fn run_raw(
    site: &Site,
    data: &DataFactory,
    signature: &str,
    raw: &[serde_json::Value],
    options: &RunOptions,
) -> Result<Vec<serde_json::Value>> {
    let procedure = site.get_procedure(signature)?;
    let declared = procedure.input_signatures();
    if raw.len() != declared.len() {
        return Err(SpliceError::ArityMismatch {
            expected: declared.len(),
            actual: raw.len(),
        });
    }

    let inputs = declared
        .iter()
        .zip(raw)
        .map(|(sig, value)| match value {
            serde_json::Value::Null => Ok(None),
            value => data.from_json(sig.as_str(), value).map(Some),
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(procedure = %signature, inputs = inputs.len(), "Running procedure");
    let outputs = procedure.run_with(inputs, options)?;
    outputs
        .into_iter()
        .enumerate()
        .map(|(position, output)| match output {
            None => Ok(serde_json::Value::Null),
            Some(data) => match data.value() {
                Value::Float(f) if !f.is_finite() => Err(SpliceError::runtime(
                    procedure.signature(),
                    format!("output {position} is {f}, which has no JSON form"),
                )),
                _ => Ok(data.to_json()),
            },
        })
        .collect()
}
