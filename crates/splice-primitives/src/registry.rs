use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use splice_core::error::{Result, SpliceError};
use splice_core::{DataFactory, Signature};

use crate::operator::Operator;
use crate::primitive::Primitive;

/// Data types the builtin site instantiates every operator over.
pub const STANDARD_TYPES: [&str; 4] = [
    Signature::BOOL,
    Signature::INT,
    Signature::FLOAT,
    Signature::STRING,
];

/// Registry of operators, keyed by name, instantiable over data types.
pub struct PrimitiveLibrary {
    data: Arc<DataFactory>,
    operators: IndexMap<String, Arc<dyn Operator>>,
}

impl PrimitiveLibrary {
    pub fn new(data: Arc<DataFactory>) -> Self {
        Self {
            data,
            operators: IndexMap::new(),
        }
    }

    /// Create a library with all builtin operators registered.
    pub fn with_builtins(data: Arc<DataFactory>) -> Self {
        let mut library = Self::new(data);
        for op in crate::builtin::builtin_operators() {
            let name = op.name().to_string();
            library.operators.insert(name, op);
        }
        library
    }

    /// Register an operator. Fails if the name is taken.
    pub fn register_operator(&mut self, operator: impl Operator) -> Result<()> {
        let name = operator.name().to_string();
        if self.operators.contains_key(&name) {
            return Err(SpliceError::DuplicateSignature(Signature::from(name)));
        }
        debug!(operator = %name, "Registered operator");
        self.operators.insert(name, Arc::new(operator));
        Ok(())
    }

    /// Get an operator by name.
    pub fn operator(&self, name: &str) -> Option<Arc<dyn Operator>> {
        self.operators.get(name).cloned()
    }

    /// Registered operator names, in registration order.
    pub fn operators(&self) -> impl Iterator<Item = &str> + '_ {
        self.operators.keys().map(|s| s.as_str())
    }

    pub fn data_factory(&self) -> &Arc<DataFactory> {
        &self.data
    }

    /// Instantiate `operator` over `data`.
    ///
    /// Returns `None` if either is unknown or the operator does not support
    /// the data type's kind.
    pub fn create(&self, operator: &str, data: &str) -> Option<Primitive> {
        let op = self.operators.get(operator)?;
        let kind = self.data.kind_of(data)?;
        let data = Signature::from(data);
        let shape = op.shape(&data, kind)?;
        Some(Primitive::new(data, shape, Arc::clone(op)))
    }

    /// Every supported (operator, type) pair over `types`.
    pub fn instantiate(&self, types: &[&str]) -> Vec<Primitive> {
        types
            .iter()
            .flat_map(|ty| self.operators().filter_map(move |op| self.create(op, ty)))
            .collect()
    }
}

impl std::fmt::Debug for PrimitiveLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveLibrary")
            .field("operators", &self.operators.keys().collect::<Vec<_>>())
            .finish()
    }
}
