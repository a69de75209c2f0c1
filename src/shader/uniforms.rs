use std::{collections::BTreeMap, rc::Rc};

use crate::{
    foundation::error::{EdlError, EdlResult},
    kernel::Kernel,
    render::texture::{ColorTexture, DepthTexture},
};

/// Value bound to a named uniform.
#[derive(Clone, Debug, PartialEq)]
pub enum UniformValue {
    /// `float`
    Float(f32),
    /// `vec2`
    Vec2([f32; 2]),
    /// `float[N]`
    FloatArray(Vec<f32>),
    /// `vec2[N]`
    Vec2Array(Vec<[f32; 2]>),
    /// `sampler2D` over a color attachment.
    Color(Rc<ColorTexture>),
    /// `sampler2D` over a depth attachment.
    Depth(Rc<DepthTexture>),
}

impl UniformValue {
    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Vec2(_) => "vec2",
            Self::FloatArray(_) => "float[]",
            Self::Vec2Array(_) => "vec2[]",
            Self::Color(_) => "color texture",
            Self::Depth(_) => "depth texture",
        }
    }
}

/// Kernels bind by arity: box weights as `float[N]`, EDL offsets as `vec2[N]`.
impl From<&Kernel> for UniformValue {
    fn from(kernel: &Kernel) -> Self {
        match kernel {
            Kernel::Box(k) => Self::FloatArray(k.as_slice().to_vec()),
            Kernel::Edl(k) => Self::Vec2Array(k.pairs().collect()),
        }
    }
}

/// Named uniform values of one program.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UniformBindings {
    values: BTreeMap<String, UniformValue>,
}

impl UniformBindings {
    /// No bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind or rebind a uniform.
    pub fn set(&mut self, name: impl Into<String>, value: UniformValue) {
        self.values.insert(name.into(), value);
    }

    /// Remove a binding.
    pub fn remove(&mut self, name: &str) -> Option<UniformValue> {
        self.values.remove(name)
    }

    /// A binding, if present.
    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    /// Bound uniform names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// A `float` binding.
    pub fn float(&self, name: &str) -> EdlResult<f32> {
        match self.require(name)? {
            UniformValue::Float(v) => Ok(*v),
            other => Err(wrong_kind(name, "float", other)),
        }
    }

    /// A `vec2` binding.
    pub fn vec2(&self, name: &str) -> EdlResult<[f32; 2]> {
        match self.require(name)? {
            UniformValue::Vec2(v) => Ok(*v),
            other => Err(wrong_kind(name, "vec2", other)),
        }
    }

    /// A `vec2[N]` binding.
    pub fn vec2_array(&self, name: &str) -> EdlResult<&[[f32; 2]]> {
        match self.require(name)? {
            UniformValue::Vec2Array(v) => Ok(v),
            other => Err(wrong_kind(name, "vec2[]", other)),
        }
    }

    /// A color texture binding.
    pub fn color(&self, name: &str) -> EdlResult<&Rc<ColorTexture>> {
        match self.require(name)? {
            UniformValue::Color(t) => Ok(t),
            other => Err(wrong_kind(name, "color texture", other)),
        }
    }

    /// A depth texture binding.
    pub fn depth(&self, name: &str) -> EdlResult<&Rc<DepthTexture>> {
        match self.require(name)? {
            UniformValue::Depth(t) => Ok(t),
            other => Err(wrong_kind(name, "depth texture", other)),
        }
    }

    fn require(&self, name: &str) -> EdlResult<&UniformValue> {
        self.values
            .get(name)
            .ok_or_else(|| EdlError::evaluation(format!("uniform `{name}` is not bound")))
    }
}

fn wrong_kind(name: &str, expected: &str, found: &UniformValue) -> EdlError {
    EdlError::evaluation(format!(
        "uniform `{name}` expects {expected}, bound to {}",
        found.kind()
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/shader/uniforms.rs"]
mod tests;
