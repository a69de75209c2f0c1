use std::rc::Rc;

use crate::{
    camera::Camera,
    config::EdlConfig,
    edl::{shade::EdlParams, shader::edl_fragment_parts},
    foundation::{
        core::Viewport,
        error::{EdlError, EdlResult},
    },
    kernel::{Kernel, KernelType, generate_kernel},
    render::{
        backend::{Destination, FragmentKind, FullScreenQuad, RenderBackend, ShaderProgram},
        texture::RenderTarget,
    },
    shader::{UniformBindings, UniformValue},
};

/// Eye-dome lighting as a standalone post-processing pass.
///
/// The pass owns its program, kernel and fullscreen geometry. It reads color and depth from
/// a render target and writes either to another target or to the backend's screen.
#[derive(Debug)]
pub struct EdlPass {
    viewport: Viewport,
    camera: Camera,
    kernel: Rc<Kernel>,
    program: Rc<ShaderProgram>,
    uniforms: UniformBindings,
    quad: Option<FullScreenQuad>,
    render_to_screen: bool,
}

impl EdlPass {
    /// Kernel size used when none is configured.
    pub const DEFAULT_KERNEL_SIZE: usize = 16;
    /// Largest kernel a fragment shader array is allowed to hold.
    pub const MAX_KERNEL_SIZE: usize = 64;

    /// A pass with the default falloff.
    pub fn new(camera: Camera, viewport: Viewport, kernel_size: usize) -> EdlResult<Self> {
        Self::with_params(camera, viewport, kernel_size, EdlParams::default())
    }

    /// A pass with explicit falloff parameters.
    #[tracing::instrument(level = "debug", skip(camera))]
    pub fn with_params(
        camera: Camera,
        viewport: Viewport,
        kernel_size: usize,
        params: EdlParams,
    ) -> EdlResult<Self> {
        camera.validate()?;
        camera.require_perspective()?;
        viewport.validate()?;
        params.validate()?;
        if !(1..=Self::MAX_KERNEL_SIZE).contains(&kernel_size) {
            return Err(EdlError::InvalidKernelSize(kernel_size as f64));
        }

        let kernel = Rc::new(generate_kernel(KernelType::Edl, kernel_size)?);
        let program = Rc::new(ShaderProgram::from_parts(
            "EDLPass",
            FragmentKind::EyeDomeLighting,
            &edl_fragment_parts(kernel_size, params),
        ));

        let mut uniforms = UniformBindings::new();
        uniforms.set("kernel", UniformValue::from(kernel.as_ref()));
        uniforms.set("resolution", UniformValue::Vec2(viewport.resolution()));
        uniforms.set("cameraNear", UniformValue::Float(camera.near));
        uniforms.set("cameraFar", UniformValue::Float(camera.far));

        Ok(Self {
            viewport,
            camera,
            kernel,
            program,
            uniforms,
            quad: Some(FullScreenQuad::new()),
            render_to_screen: false,
        })
    }

    /// A pass built from a validated configuration.
    pub fn from_config(config: &EdlConfig, camera: Camera, viewport: Viewport) -> EdlResult<Self> {
        config.validate()?;
        if config.kernel_type != KernelType::Edl {
            return Err(EdlError::validation(format!(
                "EDL pass needs an edl kernel, configured {}",
                config.kernel_type
            )));
        }
        let mut pass = Self::with_params(camera, viewport, config.kernel_size, config.params())?;
        pass.render_to_screen = config.render_to_screen;
        Ok(pass)
    }

    /// Track a new output size. Only `resolution` changes.
    pub fn set_size(&mut self, viewport: Viewport) -> EdlResult<()> {
        viewport.validate()?;
        self.viewport = viewport;
        self.uniforms
            .set("resolution", UniformValue::Vec2(viewport.resolution()));
        Ok(())
    }

    /// [`EdlPass::set_size`] from raw dimensions.
    pub fn resize(&mut self, width: u32, height: u32) -> EdlResult<()> {
        self.set_size(Viewport::new(width, height)?)
    }

    /// Follow a camera whose clip planes changed.
    pub fn set_camera(&mut self, camera: Camera) -> EdlResult<()> {
        camera.validate()?;
        camera.require_perspective()?;
        self.camera = camera;
        self.uniforms
            .set("cameraNear", UniformValue::Float(camera.near));
        self.uniforms
            .set("cameraFar", UniformValue::Float(camera.far));
        Ok(())
    }

    /// Present to the backend's screen instead of a write target.
    pub fn set_render_to_screen(&mut self, render_to_screen: bool) {
        self.render_to_screen = render_to_screen;
    }

    /// Whether the pass presents to the screen.
    pub fn render_to_screen(&self) -> bool {
        self.render_to_screen
    }

    /// Shade `read` into `write`, or into the screen when presenting.
    ///
    /// `read` must carry a depth attachment.
    #[tracing::instrument(skip_all, fields(to_screen = self.render_to_screen))]
    pub fn render(
        &mut self,
        backend: &mut dyn RenderBackend,
        read: &RenderTarget,
        write: Option<&mut RenderTarget>,
    ) -> EdlResult<()> {
        let Some(quad) = self.quad.as_ref() else {
            return Err(EdlError::UseAfterDispose("EDLPass"));
        };
        read.viewport().validate()?;
        let depth = read
            .depth_texture()
            .ok_or_else(|| EdlError::evaluation("EDL read target has no depth attachment"))?;

        self.uniforms
            .set("tDepth", UniformValue::Depth(Rc::clone(depth)));
        self.uniforms
            .set("tDiffuse", UniformValue::Color(Rc::clone(read.texture())));

        let destination = if self.render_to_screen {
            Destination::Screen
        } else {
            let write = write.ok_or_else(|| {
                EdlError::evaluation("EDL pass needs a write target when not rendering to screen")
            })?;
            Destination::Target(write)
        };
        let result = backend.draw_fullscreen(&self.program, &self.uniforms, quad, destination);

        // Drop the texture references so the pass does not keep frames alive.
        self.uniforms.remove("tDepth");
        self.uniforms.remove("tDiffuse");
        result
    }

    /// Release the fullscreen geometry. The pass cannot render afterwards.
    pub fn dispose(&mut self) -> EdlResult<()> {
        if self.quad.take().is_none() {
            return Err(EdlError::UseAfterDispose("EDLPass"));
        }
        tracing::debug!("EDL pass disposed");
        Ok(())
    }

    /// Whether [`EdlPass::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.quad.is_none()
    }

    /// The bound sampling kernel.
    pub fn kernel(&self) -> &Rc<Kernel> {
        &self.kernel
    }

    /// The compiled program.
    pub fn program(&self) -> &Rc<ShaderProgram> {
        &self.program
    }

    /// Current uniform bindings.
    pub fn uniforms(&self) -> &UniformBindings {
        &self.uniforms
    }

    /// Current output size.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current camera.
    pub fn camera(&self) -> Camera {
        self.camera
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edl/pass.rs"]
mod tests;
