use std::fmt;

use crate::{
    foundation::{core::FrameIndex, error::EdlResult},
    graph::{
        node::{DEFAULT_IO_NAME, Dependency, EvalPolicy, InputSlot, Node, NodeArgs, NodeOutputs},
        value::{BuiltinType, Value},
    },
};

type ProcessFn = Box<dyn FnMut(FrameIndex, &NodeArgs) -> EdlResult<Value>>;

/// A node backed by a closure, with a single typed output.
pub struct ProcessorNode {
    kind: &'static str,
    inputs: Vec<InputSlot>,
    output: BuiltinType,
    policy: EvalPolicy,
    process: ProcessFn,
}

impl ProcessorNode {
    /// An eager processor producing `output`.
    pub fn new(
        kind: &'static str,
        output: BuiltinType,
        process: impl FnMut(FrameIndex, &NodeArgs) -> EdlResult<Value> + 'static,
    ) -> Self {
        Self {
            kind,
            inputs: Vec::new(),
            output,
            policy: EvalPolicy::Eager,
            process: Box::new(process),
        }
    }

    /// Add an input slot.
    #[must_use]
    pub fn with_input(
        mut self,
        name: impl Into<String>,
        dependency: Dependency,
        ty: BuiltinType,
    ) -> Self {
        self.inputs.push(InputSlot::new(name, dependency, ty));
        self
    }

    /// Change the evaluation policy.
    #[must_use]
    pub fn with_policy(mut self, policy: EvalPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl fmt::Debug for ProcessorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorNode")
            .field("kind", &self.kind)
            .field("inputs", &self.inputs)
            .field("output", &self.output)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Node for ProcessorNode {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn inputs(&self) -> &[InputSlot] {
        &self.inputs
    }

    fn outputs(&self) -> Vec<(&'static str, BuiltinType)> {
        vec![(DEFAULT_IO_NAME, self.output)]
    }

    fn policy(&self) -> EvalPolicy {
        self.policy
    }

    fn evaluate(&mut self, frame: FrameIndex, args: &NodeArgs) -> EdlResult<NodeOutputs> {
        (self.process)(frame, args).map(NodeOutputs::single)
    }
}
