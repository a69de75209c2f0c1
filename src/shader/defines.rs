use std::{collections::BTreeMap, fmt::Display};

use crate::foundation::error::{EdlError, EdlResult};

/// Compile-time `#define` constants of a shader program.
///
/// Kept ordered by name so identical sets always emit identical source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderDefines {
    defines: BTreeMap<String, String>,
}

impl ShaderDefines {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a define.
    pub fn set(&mut self, name: impl Into<String>, value: impl Display) {
        self.defines.insert(name.into(), value.to_string());
    }

    /// Builder-style [`ShaderDefines::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.set(name, value);
        self
    }

    /// Raw value of a define.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.defines.get(name).map(String::as_str)
    }

    /// A define parsed as an unsigned integer, e.g. `KERNEL_SIZE`.
    pub fn get_usize(&self, name: &str) -> EdlResult<usize> {
        let raw = self.require(name)?;
        raw.parse()
            .map_err(|_| EdlError::evaluation(format!("define {name}={raw} is not an integer")))
    }

    /// A define parsed as a float, e.g. `EDL_STRENGTH`.
    pub fn get_f32(&self, name: &str) -> EdlResult<f32> {
        let raw = self.require(name)?;
        raw.parse()
            .map_err(|_| EdlError::evaluation(format!("define {name}={raw} is not a number")))
    }

    /// Defines in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defines.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of defines.
    pub fn len(&self) -> usize {
        self.defines.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    /// `#define NAME VALUE` lines.
    pub fn to_glsl(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.iter() {
            out.push_str("#define ");
            out.push_str(name);
            out.push(' ');
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    fn require(&self, name: &str) -> EdlResult<&str> {
        self.get(name)
            .ok_or_else(|| EdlError::evaluation(format!("missing shader define {name}")))
    }
}

/// Format a float so it parses as a GLSL float literal (`300` becomes `300.0`).
pub(crate) fn glsl_float(v: f32) -> String {
    let s = v.to_string();
    if s.contains(['.', 'e', 'E']) || !v.is_finite() {
        s
    } else {
        format!("{s}.0")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/defines.rs"]
mod tests;
