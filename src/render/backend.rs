use std::rc::Rc;

use crate::{
    foundation::error::EdlResult,
    render::texture::{ColorTexture, RenderTarget},
    shader::{
        FULLSCREEN_VERTEX_SHADER, FragmentShaderParts, ShaderDefines, UniformBindings,
        build_fragment_shader,
    },
};

/// Which fragment algorithm a program runs. GPU backends use the source text; the CPU
/// backend dispatches on this tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// Pass `tDiffuse` through unchanged.
    Copy,
    /// Eye-dome lighting over `tDepth`.
    EyeDomeLighting,
}

/// A compiled screen-space program: defines are fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderProgram {
    label: String,
    kind: FragmentKind,
    defines: ShaderDefines,
    vertex_source: String,
    fragment_source: String,
}

impl ShaderProgram {
    /// Build a program from fragment parts.
    pub fn from_parts(
        label: impl Into<String>,
        kind: FragmentKind,
        parts: &FragmentShaderParts,
    ) -> Self {
        Self {
            label: label.into(),
            kind,
            defines: parts.defines.clone(),
            vertex_source: FULLSCREEN_VERTEX_SHADER.to_string(),
            fragment_source: build_fragment_shader(parts),
        }
    }

    /// Debug label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Fragment algorithm.
    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    /// Compile-time constants.
    pub fn defines(&self) -> &ShaderDefines {
        &self.defines
    }

    /// Vertex stage source.
    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    /// Fragment stage source.
    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }
}

/// Geometry of a fullscreen draw: one triangle covering clip space.
#[derive(Clone, Debug, PartialEq)]
pub struct FullScreenQuad {
    vertices: [[f32; 2]; 3],
}

impl FullScreenQuad {
    /// The fullscreen triangle.
    pub fn new() -> Self {
        Self {
            vertices: [[-1.0, -1.0], [3.0, -1.0], [-1.0, 3.0]],
        }
    }

    /// Clip-space vertex positions.
    pub fn vertices(&self) -> &[[f32; 2]; 3] {
        &self.vertices
    }
}

impl Default for FullScreenQuad {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a draw writes its color output.
#[derive(Debug)]
pub enum Destination<'a> {
    /// An off-screen target; its color attachment is replaced.
    Target(&'a mut RenderTarget),
    /// The backend's display surface.
    Screen,
}

/// Drawing capability consumed by passes and screen-shader nodes.
pub trait RenderBackend {
    /// Run `program` over every pixel of `destination`.
    fn draw_fullscreen(
        &mut self,
        program: &ShaderProgram,
        uniforms: &UniformBindings,
        quad: &FullScreenQuad,
        destination: Destination<'_>,
    ) -> EdlResult<()>;

    /// The last image presented to the display surface.
    fn screen(&self) -> Option<Rc<ColorTexture>>;

    /// Number of draws executed so far.
    fn draw_calls(&self) -> u64;
}
