//! Sampling kernels for screen-space passes.
//!
//! Two layouts exist and they are not interchangeable:
//!
//! - a box kernel holds `n` scalar weights (arity 1),
//! - an EDL kernel holds `n` unit 2D offsets flattened as `x0, y0, x1, y1, ...` (arity 2).
//!
//! [`Kernel`] keeps the layout in its tag so a consumer expecting offsets never reads weights.
//! Generation is pure and deterministic: the EDL pattern advances 2 radians per sample from a
//! `π / n` start, so two calls with the same arguments return bit-identical buffers.

use std::{f64::consts::PI, fmt, str::FromStr};

use crate::foundation::{
    core::Vec2,
    error::{EdlError, EdlResult},
};

/// Kernel family requested from [`generate_kernel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelType {
    /// Uniform scalar weights summing to one.
    Box,
    /// Unit-length 2D offsets for eye-dome lighting.
    Edl,
}

impl KernelType {
    /// Number of floats per kernel element.
    pub fn arity(self) -> usize {
        match self {
            Self::Box => 1,
            Self::Edl => 2,
        }
    }

    /// Canonical lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Edl => "edl",
        }
    }
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KernelType {
    type Err = EdlError;

    fn from_str(s: &str) -> EdlResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "box" => Ok(Self::Box),
            "edl" => Ok(Self::Edl),
            _ => Err(EdlError::UnsupportedKernelType(s.to_string())),
        }
    }
}

/// Numeric tags as stored by graph hosts: `0` is box, `1` is EDL.
impl TryFrom<u32> for KernelType {
    type Error = EdlError;

    fn try_from(tag: u32) -> EdlResult<Self> {
        match tag {
            0 => Ok(Self::Box),
            1 => Ok(Self::Edl),
            other => Err(EdlError::UnsupportedKernelType(format!("tag {other}"))),
        }
    }
}

impl<'de> serde::Deserialize<'de> for KernelType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Scalar weights, one per sample.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxKernel {
    weights: Vec<f32>,
}

impl BoxKernel {
    /// Number of samples.
    pub fn size(&self) -> usize {
        self.weights.len()
    }

    /// The weights.
    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }
}

/// Unit 2D offsets, flattened as `x, y` pairs.
#[derive(Clone, Debug, PartialEq)]
pub struct EdlKernel {
    data: Vec<f32>,
}

impl EdlKernel {
    /// Number of offsets (`KERNEL_SIZE`).
    pub fn size(&self) -> usize {
        self.data.len() / 2
    }

    /// The flat buffer of length `2 * size()`.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Offsets as `[x, y]` pairs, the layout of a `vec2[KERNEL_SIZE]` uniform.
    pub fn pairs(&self) -> impl Iterator<Item = [f32; 2]> + '_ {
        self.data.chunks_exact(2).map(|p| [p[0], p[1]])
    }

    /// Offsets as geometry vectors.
    pub fn offsets(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.pairs()
            .map(|[x, y]| Vec2::new(f64::from(x), f64::from(y)))
    }
}

/// A generated kernel, tagged with its layout.
#[derive(Clone, Debug, PartialEq)]
pub enum Kernel {
    /// Scalar weights.
    Box(BoxKernel),
    /// 2D offsets.
    Edl(EdlKernel),
}

impl Kernel {
    /// The family this kernel was generated for.
    pub fn kernel_type(&self) -> KernelType {
        match self {
            Self::Box(_) => KernelType::Box,
            Self::Edl(_) => KernelType::Edl,
        }
    }

    /// Number of elements (`KERNEL_SIZE`), independent of arity.
    pub fn size(&self) -> usize {
        match self {
            Self::Box(k) => k.size(),
            Self::Edl(k) => k.size(),
        }
    }

    /// Floats per element.
    pub fn arity(&self) -> usize {
        self.kernel_type().arity()
    }

    /// The flat numeric buffer.
    pub fn as_slice(&self) -> &[f32] {
        match self {
            Self::Box(k) => k.as_slice(),
            Self::Edl(k) => k.as_slice(),
        }
    }

    /// The offsets, if this is an EDL kernel.
    pub fn as_edl(&self) -> Option<&EdlKernel> {
        match self {
            Self::Edl(k) => Some(k),
            Self::Box(_) => None,
        }
    }
}

/// Generate a kernel of `kernel_size` elements.
///
/// Fails with [`EdlError::InvalidKernelSize`] for a zero size; never falls back to a default.
#[tracing::instrument(level = "debug")]
pub fn generate_kernel(kernel_type: KernelType, kernel_size: usize) -> EdlResult<Kernel> {
    match kernel_type {
        KernelType::Box => generate_box_kernel(kernel_size).map(Kernel::Box),
        KernelType::Edl => generate_edl_kernel(kernel_size).map(Kernel::Edl),
    }
}

/// Generate a kernel from a textual type name such as `"edl"`.
pub fn generate_kernel_named(kernel_type: &str, kernel_size: usize) -> EdlResult<Kernel> {
    generate_kernel(kernel_type.parse()?, kernel_size)
}

/// `kernel_size` weights equal to `1 / kernel_size`.
pub fn generate_box_kernel(kernel_size: usize) -> EdlResult<BoxKernel> {
    ensure_non_zero(kernel_size)?;
    let w = (1.0f64 / kernel_size as f64) as f32;
    Ok(BoxKernel {
        weights: vec![w; kernel_size],
    })
}

/// `kernel_size` unit offsets at angles `2i + π / kernel_size`.
pub fn generate_edl_kernel(kernel_size: usize) -> EdlResult<EdlKernel> {
    ensure_non_zero(kernel_size)?;
    let mut data = Vec::with_capacity(kernel_size * 2);
    for i in 0..kernel_size {
        // Computed in f64 and narrowed per component to stay bit-compatible with
        // Float32Array-filled kernels.
        let rotation = 2.0 * i as f64 + PI / kernel_size as f64;
        data.push(rotation.cos() as f32);
        data.push(rotation.sin() as f32);
    }
    Ok(EdlKernel { data })
}

/// Convert a graph number into a kernel size: a positive integer.
pub fn kernel_size_from_number(n: f64) -> EdlResult<usize> {
    if !n.is_finite() || n < 1.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
        return Err(EdlError::InvalidKernelSize(n));
    }
    Ok(n as usize)
}

fn ensure_non_zero(kernel_size: usize) -> EdlResult<()> {
    if kernel_size == 0 {
        return Err(EdlError::InvalidKernelSize(0.0));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/kernel.rs"]
mod tests;
