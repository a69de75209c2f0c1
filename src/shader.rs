//! Shader program description: compile-time defines, GLSL source assembly and uniform values.
//!
//! GPU hosts consume the assembled source text; the CPU backend consumes the same defines and
//! uniform bindings directly.

pub(crate) mod defines;
pub(crate) mod source;
pub(crate) mod uniforms;

pub use defines::ShaderDefines;
pub use source::{
    FULLSCREEN_VERTEX_SHADER, FragmentShaderParts, GlslType, UniformDecl, build_fragment_shader,
};
pub use uniforms::{UniformBindings, UniformValue};
