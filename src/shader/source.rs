use std::fmt::Write as _;

use crate::shader::defines::ShaderDefines;

/// Vertex stage shared by every screen-space program: a fullscreen primitive forwarding `vUv`.
pub const FULLSCREEN_VERTEX_SHADER: &str = "varying vec2 vUv;

void main() {
    vUv = uv;
    gl_Position = projectionMatrix * modelViewMatrix * vec4(position, 1.0);
}
";

/// GLSL type of a declared uniform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlslType {
    /// `float`
    Float,
    /// `vec2`
    Vec2,
    /// `vec4`
    Vec4,
    /// `sampler2D`
    Sampler2D,
}

impl GlslType {
    /// GLSL spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec4 => "vec4",
            Self::Sampler2D => "sampler2D",
        }
    }
}

/// A `uniform` declaration, optionally an array sized by a define or literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformDecl {
    /// Uniform name.
    pub name: String,
    /// Element type.
    pub ty: GlslType,
    /// Array length expression, e.g. `KERNEL_SIZE`.
    pub array_len: Option<String>,
}

impl UniformDecl {
    /// A scalar (non-array) uniform.
    pub fn new(name: impl Into<String>, ty: GlslType) -> Self {
        Self {
            name: name.into(),
            ty,
            array_len: None,
        }
    }

    /// An array uniform of length `len`.
    pub fn array(name: impl Into<String>, ty: GlslType, len: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            array_len: Some(len.into()),
        }
    }

    /// The declaration line, without a trailing newline.
    pub fn to_glsl(&self) -> String {
        match &self.array_len {
            Some(len) => format!("uniform {} {}[{}];", self.ty.as_str(), self.name, len),
            None => format!("uniform {} {};", self.ty.as_str(), self.name),
        }
    }
}

/// Pieces a screen-space fragment shader is assembled from.
///
/// `main` is the body of `vec4 shade(vec4 tex)`, where `tex` is the `tDiffuse` sample at
/// `vUv`; it must `return` the output color. `aux_code` holds helper functions and is
/// emitted before it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FragmentShaderParts {
    /// Chunk names emitted as `#include <name>`.
    pub includes: Vec<String>,
    /// Compile-time constants.
    pub defines: ShaderDefines,
    /// Uniforms declared in addition to `tDiffuse`.
    pub uniforms: Vec<UniformDecl>,
    /// Helper definitions.
    pub aux_code: String,
    /// Body of the shading function.
    pub main: String,
}

impl FragmentShaderParts {
    /// Whether a uniform of this name is declared.
    pub fn declares(&self, name: &str) -> bool {
        name == "tDiffuse" || self.uniforms.iter().any(|u| u.name == name)
    }

    /// The declaration of uniform `name`, other than the implicit `tDiffuse`.
    pub fn uniform(&self, name: &str) -> Option<&UniformDecl> {
        self.uniforms.iter().find(|u| u.name == name)
    }
}

/// Assemble the full fragment source from its parts.
pub fn build_fragment_shader(parts: &FragmentShaderParts) -> String {
    let mut out = parts.defines.to_glsl();
    if !out.is_empty() {
        out.push('\n');
    }
    for include in &parts.includes {
        let _ = writeln!(out, "#include <{include}>");
    }
    out.push_str("\nvarying vec2 vUv;\n\nuniform sampler2D tDiffuse;\n");
    for uniform in &parts.uniforms {
        out.push_str(&uniform.to_glsl());
        out.push('\n');
    }

    let aux = parts.aux_code.trim();
    if !aux.is_empty() {
        out.push('\n');
        out.push_str(aux);
        out.push('\n');
    }

    out.push_str("\nvec4 shade(vec4 tex) {\n");
    for line in parts.main.trim().lines() {
        let _ = writeln!(out, "    {}", line.trim_end());
    }
    out.push_str("}\n\nvoid main() {\n    vec4 tex = texture2D(tDiffuse, vUv);\n    gl_FragColor = shade(tex);\n}\n");
    out
}

#[cfg(test)]
#[path = "../../tests/unit/shader/source.rs"]
mod tests;
