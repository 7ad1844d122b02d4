use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use splice_core::error::{Result, SpliceError};
use splice_core::{DataValue, Signature};
use splice_primitives::Primitive;

use crate::evaluator::{Evaluator, RunOptions};

/// Handle to a joint inside one composite. Carries the owner's id so wiring
/// that crosses composites is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointId {
    owner: Uuid,
    index: usize,
}

impl JointId {
    /// Position of the joint in its composite's arena.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// One wiring entry: output `index` of `source`, or input `index` of the
/// enclosing composite when `source` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wire {
    pub source: Option<JointId>,
    pub index: usize,
}

/// An invocation of an inner procedure inside a composite.
#[derive(Debug)]
pub struct Joint {
    signature: Signature,
    procedure: Arc<Procedure>,
    wiring: Option<Vec<Wire>>,
    use_cache: bool,
    breakpoint: bool,
}

impl Joint {
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The inner procedure. Shared, never mutated through the joint.
    pub fn procedure(&self) -> &Arc<Procedure> {
        &self.procedure
    }

    /// Input wiring, or `None` until `set_joints` succeeds.
    pub fn wiring(&self) -> Option<&[Wire]> {
        self.wiring.as_deref()
    }

    /// Whether this joint's outputs go into the per-run cache.
    pub fn use_cache(&self) -> bool {
        self.use_cache
    }

    pub fn set_use_cache(&mut self, use_cache: bool) {
        self.use_cache = use_cache;
    }

    /// Debugger flag. The evaluator ignores it.
    pub fn has_breakpoint(&self) -> bool {
        self.breakpoint
    }

    pub fn set_breakpoint(&mut self, breakpoint: bool) {
        self.breakpoint = breakpoint;
    }
}

/// Joint arena plus output wiring.
#[derive(Debug)]
pub struct Composite {
    id: Uuid,
    joints: Vec<Joint>,
    outputs: Option<Vec<Wire>>,
}

impl Composite {
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn output_wiring(&self) -> Option<&[Wire]> {
        self.outputs.as_deref()
    }

    /// Handles of every joint, in creation order.
    pub fn joint_ids(&self) -> impl Iterator<Item = JointId> + '_ {
        (0..self.joints.len()).map(|index| JointId {
            owner: self.id,
            index,
        })
    }

    fn find(&self, id: JointId) -> Result<&Joint> {
        if id.owner != self.id {
            return Err(SpliceError::InvalidTopology(
                "joint belongs to a different composite".to_string(),
            ));
        }
        self.joints.get(id.index).ok_or_else(|| {
            SpliceError::InvalidTopology(format!("no joint at index {}", id.index))
        })
    }

    /// Does `from` (transitively) read from `target`?
    fn depends_on(&self, from: usize, target: usize) -> bool {
        let mut stack = vec![from];
        let mut seen = vec![false; self.joints.len()];
        while let Some(index) = stack.pop() {
            if index == target {
                return true;
            }
            if std::mem::replace(&mut seen[index], true) {
                continue;
            }
            if let Some(wiring) = &self.joints[index].wiring {
                stack.extend(wiring.iter().filter_map(|w| w.source.map(|s| s.index)));
            }
        }
        false
    }

    /// Validate `sources`/`indices` against the `targets` they feed.
    ///
    /// All-or-nothing: nothing is stored on failure.
    fn validate(
        &self,
        inputs: &[Signature],
        targets: &[Signature],
        sources: &[Option<JointId>],
        indices: &[usize],
    ) -> Result<Vec<Wire>> {
        if sources.len() != indices.len() {
            return Err(SpliceError::ArityMismatch {
                expected: sources.len(),
                actual: indices.len(),
            });
        }
        if sources.len() != targets.len() {
            return Err(SpliceError::ArityMismatch {
                expected: targets.len(),
                actual: sources.len(),
            });
        }

        let mut wires = Vec::with_capacity(sources.len());
        for (position, ((source, &index), expected)) in
            sources.iter().zip(indices).zip(targets).enumerate()
        {
            let available = match source {
                None => inputs,
                Some(id) => self.find(*id)?.procedure.output_signatures(),
            };
            let actual = available.get(index).ok_or(SpliceError::IndexOutOfRange {
                index,
                len: available.len(),
            })?;
            if actual != expected {
                return Err(SpliceError::SignatureMismatch {
                    position,
                    expected: expected.clone(),
                    actual: actual.clone(),
                });
            }
            wires.push(Wire {
                source: *source,
                index,
            });
        }
        Ok(wires)
    }
}

/// Primitive or composite body of a procedure.
#[derive(Debug)]
pub enum Body {
    Primitive(Primitive),
    Composite(Composite),
}

/// A typed unit of computation.
#[derive(Debug)]
pub struct Procedure {
    signature: Signature,
    docstring: String,
    input_signatures: Vec<Signature>,
    output_signatures: Vec<Signature>,
    body: Body,
}

impl Procedure {
    /// Wrap a primitive. Signatures come from its shape.
    pub fn primitive(primitive: Primitive) -> Self {
        Self {
            signature: primitive.signature().clone(),
            docstring: primitive.docstring().to_string(),
            input_signatures: primitive.input_signatures().to_vec(),
            output_signatures: primitive.output_signatures().to_vec(),
            body: Body::Primitive(primitive),
        }
    }

    /// Create an empty composite. Without a signature a fresh one is
    /// generated.
    pub fn composite(
        signature: Option<Signature>,
        docstring: impl Into<String>,
        input_signatures: Vec<Signature>,
        output_signatures: Vec<Signature>,
    ) -> Self {
        let id = Uuid::new_v4();
        Self {
            signature: signature.unwrap_or_else(|| Signature::new(id.to_string())),
            docstring: docstring.into(),
            input_signatures,
            output_signatures,
            body: Body::Composite(Composite {
                id,
                joints: Vec::new(),
                outputs: None,
            }),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn docstring(&self) -> &str {
        &self.docstring
    }

    pub fn input_signatures(&self) -> &[Signature] {
        &self.input_signatures
    }

    pub fn output_signatures(&self) -> &[Signature] {
        &self.output_signatures
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match &self.body {
            Body::Composite(c) => Some(c),
            Body::Primitive(_) => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.as_composite().is_some()
    }

    fn composite_mut(&mut self) -> Result<&mut Composite> {
        match &mut self.body {
            Body::Composite(c) => Ok(c),
            Body::Primitive(_) => Err(SpliceError::InvalidTopology(format!(
                "primitive {} cannot hold joints",
                self.signature
            ))),
        }
    }

    /// Add a joint running `inner`, with a generated signature.
    pub fn add_joint(&mut self, inner: Arc<Procedure>) -> Result<JointId> {
        self.add_named_joint(Signature::new(Uuid::new_v4().to_string()), inner)
    }

    /// Add a joint running `inner` under `name`.
    ///
    /// Fails with `InvalidTopology` when this procedure is a primitive, when
    /// `inner` is this procedure, or when `name` is taken in this composite.
    pub fn add_named_joint(
        &mut self,
        name: impl Into<Signature>,
        inner: Arc<Procedure>,
    ) -> Result<JointId> {
        let name = name.into();
        if inner.signature == self.signature {
            return Err(SpliceError::InvalidTopology(format!(
                "{} cannot be a joint of itself",
                self.signature
            )));
        }
        let composite = self.composite_mut()?;
        if composite.joints.iter().any(|j| j.signature == name) {
            return Err(SpliceError::InvalidTopology(format!(
                "duplicate joint {name}"
            )));
        }

        let id = JointId {
            owner: composite.id,
            index: composite.joints.len(),
        };
        composite.joints.push(Joint {
            signature: name,
            procedure: inner,
            wiring: None,
            use_cache: false,
            breakpoint: false,
        });
        Ok(id)
    }

    pub fn joint(&self, id: JointId) -> Result<&Joint> {
        match &self.body {
            Body::Composite(c) => c.find(id),
            Body::Primitive(_) => Err(SpliceError::InvalidTopology(format!(
                "primitive {} has no joints",
                self.signature
            ))),
        }
    }

    pub fn joint_mut(&mut self, id: JointId) -> Result<&mut Joint> {
        let composite = self.composite_mut()?;
        composite.find(id)?;
        Ok(&mut composite.joints[id.index])
    }

    /// Wire the inputs of `joint`.
    ///
    /// `sources[i]` is `None` for input `indices[i]` of this composite, or a
    /// joint of this composite whose output `indices[i]` feeds input `i`.
    /// Rejects wiring that would make `joint` read from itself.
    pub fn set_joints(
        &mut self,
        joint: JointId,
        sources: &[Option<JointId>],
        indices: &[usize],
    ) -> Result<()> {
        let inputs = self.input_signatures.clone();
        let composite = self.composite_mut()?;
        let targets = composite.find(joint)?.procedure.input_signatures().to_vec();
        let wires = composite.validate(&inputs, &targets, sources, indices)?;

        for source in wires.iter().filter_map(|w| w.source) {
            if composite.depends_on(source.index, joint.index) {
                return Err(SpliceError::InvalidTopology(format!(
                    "wiring {} would create a cycle",
                    composite.joints[joint.index].signature
                )));
            }
        }

        debug!(joint = %composite.joints[joint.index].signature, inputs = wires.len(), "Wired joint");
        composite.joints[joint.index].wiring = Some(wires);
        Ok(())
    }

    /// Wire this composite's outputs, one entry per output signature.
    pub fn set_outputs(&mut self, sources: &[Option<JointId>], indices: &[usize]) -> Result<()> {
        let inputs = self.input_signatures.clone();
        let targets = self.output_signatures.clone();
        let composite = self.composite_mut()?;
        let wires = composite.validate(&inputs, &targets, sources, indices)?;
        composite.outputs = Some(wires);
        Ok(())
    }

    /// Run with default options.
    pub fn run(&self, inputs: Vec<Option<DataValue>>) -> Result<Vec<Option<DataValue>>> {
        self.run_with(inputs, &RunOptions::default())
    }

    /// Run with a fresh per-run cache.
    pub fn run_with(
        &self,
        inputs: Vec<Option<DataValue>>,
        options: &RunOptions,
    ) -> Result<Vec<Option<DataValue>>> {
        Evaluator::new(options).run(self, inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splice_core::DataFactory;
    use splice_primitives::PrimitiveLibrary;

    fn primitive(op: &str, data: &str) -> Arc<Procedure> {
        let lib = PrimitiveLibrary::with_builtins(Arc::new(DataFactory::with_builtins()));
        Arc::new(Procedure::primitive(lib.create(op, data).unwrap()))
    }

    fn ints(n: usize) -> Vec<Signature> {
        vec![Signature::from("int"); n]
    }

    #[test]
    fn test_primitive_cannot_host_joints() {
        let mut add = Procedure::primitive(
            PrimitiveLibrary::with_builtins(Arc::new(DataFactory::with_builtins()))
                .create("add", "int")
                .unwrap(),
        );
        let err = add.add_joint(primitive("neg", "int")).unwrap_err();
        assert!(matches!(err, SpliceError::InvalidTopology(_)));
    }

    #[test]
    fn test_joint_of_itself_rejected() {
        let mut outer = Procedure::composite(Some("outer".into()), "", ints(1), ints(1));
        let same = Arc::new(Procedure::composite(Some("outer".into()), "", ints(1), ints(1)));
        let err = outer.add_joint(same).unwrap_err();
        assert!(matches!(err, SpliceError::InvalidTopology(_)));
    }

    #[test]
    fn test_generated_signature() {
        let a = Procedure::composite(None, "", vec![], vec![]);
        let b = Procedure::composite(None, "", vec![], vec![]);
        assert!(!a.signature().as_str().is_empty());
        assert_ne!(a.signature(), b.signature());
    }

    #[test]
    fn test_set_joints_arity_mismatch() {
        let mut outer = Procedure::composite(None, "", ints(2), ints(1));
        let j = outer.add_joint(primitive("add", "int")).unwrap();

        let err = outer.set_joints(j, &[None, None], &[0]).unwrap_err();
        assert!(matches!(err, SpliceError::ArityMismatch { .. }));

        // one source for a two-input procedure
        let err = outer.set_joints(j, &[None], &[0]).unwrap_err();
        assert!(matches!(err, SpliceError::ArityMismatch { expected: 2, actual: 1 }));
        assert!(outer.joint(j).unwrap().wiring().is_none());
    }

    #[test]
    fn test_set_joints_index_out_of_range() {
        let mut outer = Procedure::composite(None, "", ints(2), ints(1));
        let j = outer.add_joint(primitive("add", "int")).unwrap();
        let err = outer.set_joints(j, &[None, None], &[0, 2]).unwrap_err();
        assert!(matches!(err, SpliceError::IndexOutOfRange { index: 2, len: 2 }));
    }

    #[test]
    fn test_set_joints_signature_mismatch() {
        let mut outer = Procedure::composite(
            None,
            "",
            vec![Signature::from("int"), Signature::from("float")],
            ints(1),
        );
        let j = outer.add_joint(primitive("add", "int")).unwrap();
        let err = outer.set_joints(j, &[None, None], &[0, 1]).unwrap_err();
        assert!(matches!(err, SpliceError::SignatureMismatch { position: 1, .. }));

        // comparator output is bool, not int
        let lt = outer.add_joint(primitive("lt", "int")).unwrap();
        outer.set_joints(lt, &[None, None], &[0, 0]).unwrap();
        let err = outer.set_joints(j, &[Some(lt), None], &[0, 0]).unwrap_err();
        assert!(matches!(err, SpliceError::SignatureMismatch { position: 0, .. }));
    }

    #[test]
    fn test_foreign_joint_rejected() {
        let mut first = Procedure::composite(None, "", ints(2), ints(1));
        let mut second = Procedure::composite(None, "", ints(2), ints(1));
        let foreign = first.add_joint(primitive("add", "int")).unwrap();
        let local = second.add_joint(primitive("neg", "int")).unwrap();

        let err = second.set_joints(local, &[Some(foreign)], &[0]).unwrap_err();
        assert!(matches!(err, SpliceError::InvalidTopology(_)));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut outer = Procedure::composite(None, "", ints(1), ints(1));
        let a = outer.add_joint(primitive("neg", "int")).unwrap();
        let b = outer.add_joint(primitive("neg", "int")).unwrap();

        outer.set_joints(a, &[Some(b)], &[0]).unwrap();
        let err = outer.set_joints(b, &[Some(a)], &[0]).unwrap_err();
        assert!(matches!(err, SpliceError::InvalidTopology(_)));

        let err = outer.set_joints(a, &[Some(a)], &[0]).unwrap_err();
        assert!(matches!(err, SpliceError::InvalidTopology(_)));
    }

    #[test]
    fn test_set_outputs_checks_output_signatures() {
        let mut outer = Procedure::composite(None, "", ints(2), ints(1));
        let eq = outer.add_joint(primitive("eq", "int")).unwrap();
        outer.set_joints(eq, &[None, None], &[0, 1]).unwrap();

        let err = outer.set_outputs(&[Some(eq)], &[0]).unwrap_err();
        assert!(matches!(err, SpliceError::SignatureMismatch { .. }));

        outer.set_outputs(&[None], &[1]).unwrap();
        let wiring = outer.as_composite().unwrap().output_wiring().unwrap();
        assert_eq!(wiring, &[Wire { source: None, index: 1 }]);
    }

    #[test]
    fn test_joint_flags() {
        let mut outer = Procedure::composite(None, "", ints(1), ints(1));
        let j = outer.add_named_joint("neg", primitive("neg", "int")).unwrap();
        {
            let joint = outer.joint_mut(j).unwrap();
            joint.set_use_cache(true);
            joint.set_breakpoint(true);
        }
        let joint = outer.joint(j).unwrap();
        assert_eq!(joint.signature(), "neg");
        assert!(joint.use_cache());
        assert!(joint.has_breakpoint());

        let err = outer.add_named_joint("neg", primitive("sq", "int")).unwrap_err();
        assert!(matches!(err, SpliceError::InvalidTopology(_)));
    }
}
