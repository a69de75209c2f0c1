use std::{collections::BTreeMap, fmt, rc::Rc};

use crate::{
    camera::Camera,
    foundation::{
        core::FrameIndex,
        error::{EdlError, EdlResult},
    },
    graph::{
        input::InputNode,
        value::{BuiltinType, RendererHandle, Value},
    },
    kernel::{Kernel, KernelType},
    render::texture::{ColorTexture, RenderTarget},
};

/// Name of the single output (and input) most nodes expose.
pub const DEFAULT_IO_NAME: &str = "value";

/// Handle of a node inside a [`crate::graph::Graph`]. Stable across replacement by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position in insertion order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A reference to one output of another node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dependency {
    /// Producing node.
    pub node: NodeId,
    /// Output name on the producing node.
    pub output: String,
}

impl Dependency {
    /// The default output of `node`.
    pub fn new(node: NodeId) -> Self {
        Self::named(node, DEFAULT_IO_NAME)
    }

    /// A named output of `node`.
    pub fn named(node: NodeId, output: impl Into<String>) -> Self {
        Self {
            node,
            output: output.into(),
        }
    }
}

/// A named, typed input of a node and where its value comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputSlot {
    /// Slot name, as seen in [`NodeArgs`].
    pub name: String,
    /// Producing output.
    pub dependency: Dependency,
    /// Declared type; must equal the producing output's type.
    pub ty: BuiltinType,
}

impl InputSlot {
    /// Slot `name` fed by `dependency`, declared as `ty`.
    pub fn new(name: impl Into<String>, dependency: Dependency, ty: BuiltinType) -> Self {
        Self {
            name: name.into(),
            dependency,
            ty,
        }
    }
}

/// When a node re-evaluates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EvalPolicy {
    /// Once per requested frame.
    Eager,
    /// Once per requested frame, and only when the resolved arguments changed.
    LazyStatic,
}

/// Resolved input values, keyed by slot name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeArgs {
    values: BTreeMap<String, Value>,
}

impl NodeArgs {
    /// No arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the argument for slot `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// The argument for slot `name`, if resolved.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether slot `name` was resolved.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Arguments in slot-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no argument was resolved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A required `Number` argument.
    pub fn number(&self, name: &str) -> EdlResult<f64> {
        self.typed(name, BuiltinType::Number, Value::as_number)
    }

    /// A required `KernelType` argument.
    pub fn kernel_type(&self, name: &str) -> EdlResult<KernelType> {
        self.typed(name, BuiltinType::KernelType, Value::as_kernel_type)
    }

    /// A required kernel argument of either layout.
    pub fn kernel(&self, name: &str) -> EdlResult<Rc<Kernel>> {
        self.typed(name, "a kernel", |v| v.as_kernel().cloned())
    }

    /// A required `Camera` argument.
    pub fn camera(&self, name: &str) -> EdlResult<Camera> {
        self.typed(name, BuiltinType::Camera, Value::as_camera)
    }

    /// A required `RenderTarget` argument.
    pub fn render_target(&self, name: &str) -> EdlResult<Rc<RenderTarget>> {
        self.typed(name, BuiltinType::RenderTarget, |v| {
            v.as_render_target().cloned()
        })
    }

    /// A required `Renderer` argument.
    pub fn renderer(&self, name: &str) -> EdlResult<RendererHandle> {
        self.typed(name, BuiltinType::Renderer, |v| v.as_renderer().cloned())
    }

    /// A required `Texture` argument.
    pub fn texture(&self, name: &str) -> EdlResult<Rc<ColorTexture>> {
        self.typed(name, BuiltinType::Texture, |v| v.as_texture().cloned())
    }

    fn typed<T>(
        &self,
        name: &str,
        expected: impl fmt::Display,
        extract: impl FnOnce(&Value) -> Option<T>,
    ) -> EdlResult<T> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| EdlError::evaluation(format!("missing argument `{name}`")))?;
        extract(value).ok_or_else(|| {
            EdlError::evaluation(format!(
                "argument `{name}` expects {expected}, got {}",
                value.ty()
            ))
        })
    }
}

/// Values produced by one evaluation, keyed by output name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeOutputs {
    values: BTreeMap<String, Value>,
}

impl NodeOutputs {
    /// Outputs holding only the default `"value"` output.
    pub fn single(value: Value) -> Self {
        let mut out = Self::default();
        out.insert(DEFAULT_IO_NAME, value);
        out
    }

    /// Set output `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Output `name`, if produced.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// A unit of computation in the dataflow graph.
pub trait Node: fmt::Debug {
    /// Short type label used in logs and DOT dumps.
    fn kind(&self) -> &'static str;

    /// Input slots, each bound to another node's output.
    fn inputs(&self) -> &[InputSlot];

    /// Declared outputs.
    fn outputs(&self) -> Vec<(&'static str, BuiltinType)>;

    /// Re-evaluation policy.
    fn policy(&self) -> EvalPolicy {
        EvalPolicy::Eager
    }

    /// Compute the outputs from resolved arguments.
    fn evaluate(&mut self, frame: FrameIndex, args: &NodeArgs) -> EdlResult<NodeOutputs>;

    /// Check a value for slot `slot` beyond its edge type.
    ///
    /// The graph calls this with the current value of input-node dependencies when the node
    /// is inserted and whenever such an input is replaced.
    fn check_argument(&self, _slot: &str, _value: &Value) -> EdlResult<()> {
        Ok(())
    }

    /// Settable constant nodes return themselves here.
    fn as_input(&self) -> Option<&InputNode> {
        None
    }

    /// Mutable counterpart of [`Node::as_input`].
    fn as_input_mut(&mut self) -> Option<&mut InputNode> {
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/node.rs"]
mod tests;
