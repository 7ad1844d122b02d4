use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use splice_core::error::{Result, SpliceError};
use splice_core::Signature;

use crate::description::{load_description, ProcedureDescription, WireDescription};
use crate::procedure::{JointId, Procedure};
use crate::site::{Site, UNLIMITED};

/// Links descriptions into composites and registers them on a site.
///
/// Each definition is linked in two passes: every joint is created first,
/// then every joint is wired. A definition either registers completely or
/// not at all; definitions before a failing one stay registered.
pub struct GraphBuilder<'s> {
    site: &'s mut Site,
    default_cache: bool,
}

impl<'s> GraphBuilder<'s> {
    pub fn new(site: &'s mut Site) -> Self {
        Self {
            site,
            default_cache: false,
        }
    }

    /// Cache setting for joints whose description leaves `use_cache` unset.
    pub fn with_default_cache(mut self, default_cache: bool) -> Self {
        self.default_cache = default_cache;
        self
    }

    /// Build and register `descriptions` in order. Returns the registered
    /// signatures. Stops at the first failure.
    pub fn build(&mut self, descriptions: &[ProcedureDescription]) -> Result<Vec<Signature>> {
        let mut registered = Vec::with_capacity(descriptions.len());
        for description in descriptions {
            let procedure = self.link(description)?;
            let signature = procedure.signature().clone();
            self.site.register_procedure(Arc::new(procedure), false)?;
            info!(procedure = %signature, site = %self.site.name(), "Built procedure");
            registered.push(signature);
        }
        Ok(registered)
    }

    /// Load a description file and build everything in it.
    pub fn build_file(&mut self, path: &Path) -> Result<Vec<Signature>> {
        debug!(path = %path.display(), "Loading descriptions");
        let descriptions = load_description(path)?;
        self.build(&descriptions)
    }

    fn link(&self, description: &ProcedureDescription) -> Result<Procedure> {
        let mut procedure = Procedure::composite(
            Some(description.signature.clone()),
            description.docstring.clone(),
            description.input_signatures.clone(),
            description.output_signatures.clone(),
        );

        // Pass 1: create joints.
        let mut ids: HashMap<&str, JointId> = HashMap::with_capacity(description.joints.len());
        for (key, joint) in &description.joints {
            let inner = self
                .site
                .query_procedure(joint.procedure.as_str(), UNLIMITED)
                .ok_or_else(|| SpliceError::UnresolvedProcedure {
                    joint: key.clone(),
                    procedure: joint.procedure.clone(),
                })?;
            let id = procedure.add_named_joint(key.as_str(), inner)?;
            let handle = procedure.joint_mut(id)?;
            handle.set_use_cache(joint.use_cache.unwrap_or(self.default_cache));
            handle.set_breakpoint(joint.breakpoint);
            ids.insert(key.as_str(), id);
        }

        // Pass 2: wire joints, then outputs.
        for (key, joint) in &description.joints {
            let (sources, indices) = resolve_wiring(&ids, &joint.input_joints)?;
            procedure.set_joints(ids[key.as_str()], &sources, &indices)?;
        }
        let (sources, indices) = resolve_wiring(&ids, &description.output_joints)?;
        procedure.set_outputs(&sources, &indices)?;

        Ok(procedure)
    }
}

fn resolve_wiring(
    ids: &HashMap<&str, JointId>,
    wiring: &[WireDescription],
) -> Result<(Vec<Option<JointId>>, Vec<usize>)> {
    let mut sources = Vec::with_capacity(wiring.len());
    let mut indices = Vec::with_capacity(wiring.len());
    for WireDescription(key, index) in wiring {
        let source = match key {
            None => None,
            Some(key) => Some(
                *ids.get(key.as_str())
                    .ok_or_else(|| SpliceError::UnresolvedJoint(key.clone()))?,
            ),
        };
        sources.push(source);
        indices.push(*index);
    }
    Ok((sources, indices))
}
