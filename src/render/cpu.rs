use std::rc::Rc;

use crate::{
    edl::shade::{EdlInputs, shade_image},
    foundation::{
        core::Viewport,
        error::{EdlError, EdlResult},
    },
    render::{
        backend::{Destination, FragmentKind, FullScreenQuad, RenderBackend, ShaderProgram},
        texture::ColorTexture,
    },
    shader::UniformBindings,
};

/// Headless reference backend: evaluates fragment programs pixel by pixel on the CPU.
#[derive(Debug)]
pub struct CpuBackend {
    screen_viewport: Viewport,
    screen: Option<Rc<ColorTexture>>,
    draw_calls: u64,
}

impl CpuBackend {
    /// A backend whose display surface has the given size.
    pub fn new(screen_viewport: Viewport) -> Self {
        Self {
            screen_viewport,
            screen: None,
            draw_calls: 0,
        }
    }

    /// Size of the display surface.
    pub fn screen_viewport(&self) -> Viewport {
        self.screen_viewport
    }

    /// Resize the display surface; the presented image is dropped.
    pub fn set_screen_viewport(&mut self, viewport: Viewport) {
        if viewport != self.screen_viewport {
            self.screen_viewport = viewport;
            self.screen = None;
        }
    }

    fn run_fragment(
        &self,
        program: &ShaderProgram,
        uniforms: &UniformBindings,
        viewport: Viewport,
    ) -> EdlResult<ColorTexture> {
        match program.kind() {
            FragmentKind::Copy => {
                let src = uniforms.color("tDiffuse")?;
                src.viewport().validate()?;
                let mut out = ColorTexture::new(viewport);
                for y in 0..viewport.height {
                    for x in 0..viewport.width {
                        out.set_texel(x, y, src.sample(viewport.pixel_center_uv(x, y)));
                    }
                }
                Ok(out)
            }
            FragmentKind::EyeDomeLighting => {
                let inputs = EdlInputs::from_bindings(uniforms, program.defines())?;
                Ok(shade_image(&inputs, viewport))
            }
        }
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(skip_all, fields(program = program.label()))]
    fn draw_fullscreen(
        &mut self,
        program: &ShaderProgram,
        uniforms: &UniformBindings,
        _quad: &FullScreenQuad,
        destination: Destination<'_>,
    ) -> EdlResult<()> {
        let viewport = match &destination {
            Destination::Target(target) => target.viewport(),
            Destination::Screen => self.screen_viewport,
        };
        viewport
            .validate()
            .map_err(|e| EdlError::evaluation(format!("cannot draw: {e}")))?;

        let out = Rc::new(self.run_fragment(program, uniforms, viewport)?);
        match destination {
            Destination::Target(target) => target.set_texture(out)?,
            Destination::Screen => self.screen = Some(out),
        }
        self.draw_calls += 1;
        tracing::trace!(
            width = viewport.width,
            height = viewport.height,
            "fullscreen draw"
        );
        Ok(())
    }

    fn screen(&self) -> Option<Rc<ColorTexture>> {
        self.screen.clone()
    }

    fn draw_calls(&self) -> u64 {
        self.draw_calls
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
