use std::rc::Rc;

use crate::{
    foundation::{
        core::FrameIndex,
        error::{EdlError, EdlResult},
    },
    graph::{
        node::{DEFAULT_IO_NAME, Dependency, EvalPolicy, InputSlot, Node, NodeArgs, NodeOutputs},
        value::{BuiltinType, Value},
    },
    kernel::{KernelType, generate_kernel, kernel_size_from_number},
};

/// Slot carrying the number of kernel elements.
pub const KERNEL_SIZE_SLOT: &str = "kernelSize";
/// Slot carrying the kernel family.
pub const KERNEL_TYPE_SLOT: &str = "kernelType";

/// Generates a sampling kernel from a size and a type.
///
/// The node declares the layout it produces, EDL unless [`KernelNode::producing`] says
/// otherwise, so consumers type-check against it when the graph is built. A `kernelType`
/// of another layout is refused. The lazy-static variant keeps its kernel, same `Rc`, until
/// either argument changes.
#[derive(Debug)]
pub struct KernelNode {
    inputs: [InputSlot; 2],
    policy: EvalPolicy,
    layout: KernelType,
}

impl KernelNode {
    /// Regenerates every frame.
    pub fn eager(kernel_size: Dependency, kernel_type: Dependency) -> Self {
        Self::with_policy(kernel_size, kernel_type, EvalPolicy::Eager)
    }

    /// Regenerates only when `kernelSize` or `kernelType` change.
    pub fn lazy_static(kernel_size: Dependency, kernel_type: Dependency) -> Self {
        Self::with_policy(kernel_size, kernel_type, EvalPolicy::LazyStatic)
    }

    fn with_policy(kernel_size: Dependency, kernel_type: Dependency, policy: EvalPolicy) -> Self {
        Self {
            inputs: [
                InputSlot::new(KERNEL_SIZE_SLOT, kernel_size, BuiltinType::Number),
                InputSlot::new(KERNEL_TYPE_SLOT, kernel_type, BuiltinType::KernelType),
            ],
            policy,
            layout: KernelType::Edl,
        }
    }

    /// Declare the kernel layout this node outputs.
    #[must_use]
    pub fn producing(mut self, layout: KernelType) -> Self {
        self.layout = layout;
        self
    }

    /// Declared kernel layout.
    pub fn layout(&self) -> KernelType {
        self.layout
    }

    fn check_kernel_type(&self, kernel_type: KernelType) -> EdlResult<()> {
        if kernel_type != self.layout {
            return Err(EdlError::GraphTypeMismatch {
                node: self.kind().to_string(),
                slot: KERNEL_TYPE_SLOT.to_string(),
                expected: BuiltinType::kernel(self.layout),
                found: BuiltinType::kernel(kernel_type),
            });
        }
        Ok(())
    }
}

impl Node for KernelNode {
    fn kind(&self) -> &'static str {
        match self.policy {
            EvalPolicy::Eager => "Kernel",
            EvalPolicy::LazyStatic => "LazyStaticKernel",
        }
    }

    fn inputs(&self) -> &[InputSlot] {
        &self.inputs
    }

    fn outputs(&self) -> Vec<(&'static str, BuiltinType)> {
        vec![(DEFAULT_IO_NAME, BuiltinType::kernel(self.layout))]
    }

    fn policy(&self) -> EvalPolicy {
        self.policy
    }

    fn check_argument(&self, slot: &str, value: &Value) -> EdlResult<()> {
        match value.as_kernel_type() {
            Some(kernel_type) if slot == KERNEL_TYPE_SLOT => self.check_kernel_type(kernel_type),
            _ => Ok(()),
        }
    }

    fn evaluate(&mut self, _frame: FrameIndex, args: &NodeArgs) -> EdlResult<NodeOutputs> {
        let size = kernel_size_from_number(args.number(KERNEL_SIZE_SLOT)?)?;
        let kernel_type = args.kernel_type(KERNEL_TYPE_SLOT)?;
        self.check_kernel_type(kernel_type)?;
        let kernel = generate_kernel(kernel_type, size)?;
        tracing::debug!(%kernel_type, size, "kernel generated");
        Ok(NodeOutputs::single(Value::Kernel(Rc::new(kernel))))
    }
}
