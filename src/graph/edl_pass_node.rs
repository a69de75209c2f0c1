use crate::{
    edl::{EdlParams, EdlPass, edl_fragment_parts},
    foundation::{
        core::FrameIndex,
        error::{EdlError, EdlResult},
    },
    graph::{
        node::{Dependency, InputSlot, Node, NodeArgs, NodeOutputs},
        screen_shader::{CAMERA_SLOT, ScreenShaderNode},
        value::BuiltinType,
    },
    render::backend::FragmentKind,
};

/// Slot and uniform carrying the sampling kernel.
pub const KERNEL_SLOT: &str = "kernel";

/// Eye-dome lighting as a graph node.
///
/// The kernel arrives through an `EdlKernel` dependency, typically a lazy-static
/// [`KernelNode`], and must hold exactly the compiled `KERNEL_SIZE` offsets.
///
/// [`KernelNode`]: crate::graph::KernelNode
#[derive(Debug)]
pub struct EdlPassNode {
    inner: ScreenShaderNode,
    kernel_size: usize,
}

impl EdlPassNode {
    /// A node with the default falloff.
    pub fn new(
        target: Dependency,
        renderer: Dependency,
        camera: Dependency,
        kernel: Dependency,
        kernel_size: usize,
    ) -> EdlResult<Self> {
        Self::with_params(
            target,
            renderer,
            camera,
            kernel,
            kernel_size,
            EdlParams::default(),
        )
    }

    /// A node with explicit falloff parameters.
    pub fn with_params(
        target: Dependency,
        renderer: Dependency,
        camera: Dependency,
        kernel: Dependency,
        kernel_size: usize,
        params: EdlParams,
    ) -> EdlResult<Self> {
        if !(1..=EdlPass::MAX_KERNEL_SIZE).contains(&kernel_size) {
            return Err(EdlError::InvalidKernelSize(kernel_size as f64));
        }
        params.validate()?;
        let inner = ScreenShaderNode::new(
            "EDLPass",
            FragmentKind::EyeDomeLighting,
            edl_fragment_parts(kernel_size, params),
            target,
            renderer,
        )
        .with_camera(camera)
        .with_uniform(KERNEL_SLOT, kernel, BuiltinType::EdlKernel)?;
        Ok(Self { inner, kernel_size })
    }

    /// Present to the renderer's screen.
    #[must_use]
    pub fn render_to_screen(mut self, render_to_screen: bool) -> Self {
        self.inner = self.inner.render_to_screen(render_to_screen);
        self
    }

    /// Compiled `KERNEL_SIZE`.
    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }
}

impl Node for EdlPassNode {
    fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    fn inputs(&self) -> &[InputSlot] {
        self.inner.inputs()
    }

    fn outputs(&self) -> Vec<(&'static str, BuiltinType)> {
        self.inner.outputs()
    }

    fn evaluate(&mut self, frame: FrameIndex, args: &NodeArgs) -> EdlResult<NodeOutputs> {
        args.camera(CAMERA_SLOT)?.require_perspective()?;

        let kernel = args.kernel(KERNEL_SLOT)?;
        if kernel.size() != self.kernel_size {
            return Err(EdlError::evaluation(format!(
                "EDL pass compiled for {} kernel offsets, got {}",
                self.kernel_size,
                kernel.size()
            )));
        }
        self.inner.evaluate(frame, args)
    }
}
