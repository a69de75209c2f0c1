//! A small pull-based dataflow graph.
//!
//! Nodes declare typed inputs bound to other nodes' outputs. The [`Graph`] checks every edge
//! when a node is inserted and evaluates the dependency closure of a requested output once per
//! frame.

pub(crate) mod dot;
pub(crate) mod edl_pass_node;
pub(crate) mod input;
pub(crate) mod kernel_node;
pub(crate) mod node;
pub(crate) mod processor;
pub(crate) mod scheduler;
pub(crate) mod screen_shader;
pub(crate) mod value;

pub use edl_pass_node::{EdlPassNode, KERNEL_SLOT};
pub use input::InputNode;
pub use kernel_node::{KERNEL_SIZE_SLOT, KERNEL_TYPE_SLOT, KernelNode};
pub use node::{
    DEFAULT_IO_NAME, Dependency, EvalPolicy, InputSlot, Node, NodeArgs, NodeId, NodeOutputs,
};
pub use processor::ProcessorNode;
pub use scheduler::{Graph, NodeStats};
pub use screen_shader::{CAMERA_SLOT, RENDERER_SLOT, ScreenShaderNode, TARGET_SLOT};
pub use value::{BuiltinType, RendererHandle, Value};

#[cfg(test)]
#[path = "../tests/unit/graph/nodes.rs"]
mod tests;
