use crate::{
    foundation::{core::FrameIndex, error::EdlResult},
    graph::{
        node::{DEFAULT_IO_NAME, InputSlot, Node, NodeArgs, NodeOutputs},
        value::{BuiltinType, Value},
    },
};

/// A constant the host can replace between frames. Its type is fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct InputNode {
    value: Value,
}

impl InputNode {
    /// A constant holding `value`.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Current value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Declared output type.
    pub fn ty(&self) -> BuiltinType {
        self.value.ty()
    }

    /// Replace the value; returns the previous one.
    ///
    /// The caller checks the type; [`crate::graph::Graph::set_input`] does.
    pub(crate) fn replace(&mut self, value: Value) -> Value {
        std::mem::replace(&mut self.value, value)
    }
}

impl Node for InputNode {
    fn kind(&self) -> &'static str {
        "Input"
    }

    fn inputs(&self) -> &[InputSlot] {
        &[]
    }

    fn outputs(&self) -> Vec<(&'static str, BuiltinType)> {
        vec![(DEFAULT_IO_NAME, self.ty())]
    }

    fn evaluate(&mut self, _frame: FrameIndex, _args: &NodeArgs) -> EdlResult<NodeOutputs> {
        Ok(NodeOutputs::single(self.value.clone()))
    }

    fn as_input(&self) -> Option<&InputNode> {
        Some(self)
    }

    fn as_input_mut(&mut self) -> Option<&mut InputNode> {
        Some(self)
    }
}
