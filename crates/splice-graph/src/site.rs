use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use tracing::{debug, warn};

use splice_core::error::{Result, SpliceError};
use splice_core::{DataFactory, Signature};
use splice_primitives::PrimitiveLibrary;

use crate::procedure::Procedure;

/// Lookup depth that never stops delegating.
pub const UNLIMITED: i32 = -1;

/// A namespace of procedures that delegates misses to its base sites.
#[derive(Debug)]
pub struct Site {
    name: String,
    procedures: IndexMap<Signature, Arc<Procedure>>,
    base_sites: Vec<Arc<Site>>,
}

impl Site {
    pub fn new(name: impl Into<String>, base_sites: Vec<Arc<Site>>) -> Self {
        Self {
            name: name.into(),
            procedures: IndexMap::new(),
            base_sites,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up `signature` here, then in each base site in order with one
    /// less level of depth. A negative depth is unlimited.
    pub fn query_procedure(&self, signature: &str, depth: i32) -> Option<Arc<Procedure>> {
        if let Some(procedure) = self.procedures.get(signature) {
            return Some(Arc::clone(procedure));
        }
        if depth == 0 {
            return None;
        }
        let next = if depth < 0 { depth } else { depth - 1 };
        self.base_sites
            .iter()
            .find_map(|base| base.query_procedure(signature, next))
    }

    /// Unlimited lookup that fails with `NotFound` on a miss.
    pub fn get_procedure(&self, signature: &str) -> Result<Arc<Procedure>> {
        self.query_procedure(signature, UNLIMITED)
            .ok_or_else(|| SpliceError::NotFound(Signature::from(signature)))
    }

    /// Register `procedure` locally.
    ///
    /// Without `overwrite`, fails with `AlreadyRegistered` if the signature
    /// is visible here or in any base site.
    pub fn register_procedure(&mut self, procedure: Arc<Procedure>, overwrite: bool) -> Result<()> {
        let signature = procedure.signature().clone();
        if self.query_procedure(signature.as_str(), UNLIMITED).is_some() {
            if !overwrite {
                return Err(SpliceError::AlreadyRegistered(signature));
            }
            warn!(site = %self.name, procedure = %signature, "Overwriting procedure");
        }
        debug!(site = %self.name, procedure = %signature, "Registered procedure");
        self.procedures.insert(signature, procedure);
        Ok(())
    }

    /// Procedures registered on this site, excluding base sites.
    pub fn procedures(&self) -> impl Iterator<Item = &Arc<Procedure>> + '_ {
        self.procedures.values()
    }

    pub fn base_sites(&self) -> &[Arc<Site>] {
        &self.base_sites
    }
}

/// Creates sites on top of a shared builtin site.
///
/// The builtin site holds every primitive of the library instantiated over
/// every data type known to the factory. It is built on first use.
#[derive(Debug)]
pub struct SiteFactory {
    library: Arc<PrimitiveLibrary>,
    builtin: OnceLock<Arc<Site>>,
}

impl SiteFactory {
    pub fn new(library: Arc<PrimitiveLibrary>) -> Self {
        Self {
            library,
            builtin: OnceLock::new(),
        }
    }

    /// Factory over the builtin operators and standard data types.
    pub fn with_builtins() -> Self {
        let data = Arc::new(DataFactory::with_builtins());
        Self::new(Arc::new(PrimitiveLibrary::with_builtins(data)))
    }

    pub fn library(&self) -> &Arc<PrimitiveLibrary> {
        &self.library
    }

    pub fn data_factory(&self) -> &Arc<DataFactory> {
        self.library.data_factory()
    }

    pub fn builtin_site(&self) -> Arc<Site> {
        let site = self.builtin.get_or_init(|| {
            let types: Vec<&str> = self
                .library
                .data_factory()
                .signatures()
                .map(|s| s.as_str())
                .collect();
            let mut site = Site::new("builtin", Vec::new());
            for primitive in self.library.instantiate(&types) {
                let procedure = Procedure::primitive(primitive);
                site.procedures
                    .insert(procedure.signature().clone(), Arc::new(procedure));
            }
            debug!(procedures = site.procedures.len(), "Built builtin site");
            Arc::new(site)
        });
        Arc::clone(site)
    }

    /// Create an empty site. With no bases the builtin site is the only base.
    pub fn create(&self, name: impl Into<String>, base_sites: Vec<Arc<Site>>) -> Site {
        let base_sites = if base_sites.is_empty() {
            vec![self.builtin_site()]
        } else {
            base_sites
        };
        Site::new(name, base_sites)
    }
}
