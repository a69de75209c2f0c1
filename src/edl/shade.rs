//! Per-pixel eye-dome lighting, as plain functions over sampled depth.
//!
//! For a pixel at `uv` the pass computes the linear depth `d`, then
//! `shadow = mean_i(max(0, d - depth(uv + kernel[i] / resolution)))` and scales the color
//! by `exp(-strength * shadow * depth_scale)`. Alpha is preserved.

use crate::{
    foundation::{
        core::{Rgba, Viewport},
        error::{EdlError, EdlResult},
    },
    render::texture::{ColorTexture, DepthTexture},
    shader::{ShaderDefines, UniformBindings},
};

/// Exponential falloff parameters. The defaults are the reference tuning; changing them
/// changes the rendered image.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EdlParams {
    /// Multiplier applied to the averaged depth difference.
    pub strength: f32,
    /// Second multiplier, scaling linear depth differences into a useful range.
    pub depth_scale: f32,
}

impl EdlParams {
    /// Reference strength.
    pub const DEFAULT_STRENGTH: f32 = 300.0;
    /// Reference depth scale.
    pub const DEFAULT_DEPTH_SCALE: f32 = 6000.0;

    /// Both multipliers must be finite and non-negative.
    pub fn validate(&self) -> EdlResult<()> {
        for (name, v) in [("strength", self.strength), ("depth_scale", self.depth_scale)] {
            if !v.is_finite() || v < 0.0 {
                return Err(EdlError::validation(format!(
                    "EDL {name} must be finite and >= 0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for EdlParams {
    fn default() -> Self {
        Self {
            strength: Self::DEFAULT_STRENGTH,
            depth_scale: Self::DEFAULT_DEPTH_SCALE,
        }
    }
}

/// View-space Z (negative in front of the camera) of a perspective depth-buffer value.
pub fn perspective_depth_to_view_z(device_depth: f32, near: f32, far: f32) -> f32 {
    (near * far) / ((far - near) * device_depth - far)
}

/// Map view-space Z to `[0, 1]` between the near and far planes.
pub fn view_z_to_orthographic_depth(view_z: f32, near: f32, far: f32) -> f32 {
    (view_z + near) / (near - far)
}

/// Linear depth of a perspective depth-buffer value.
pub fn linear_depth(device_depth: f32, near: f32, far: f32) -> f32 {
    view_z_to_orthographic_depth(
        perspective_depth_to_view_z(device_depth, near, far),
        near,
        far,
    )
}

/// Mean positive depth difference between the center and its neighbours.
///
/// Neighbours farther away than the center contribute nothing. An empty neighbourhood
/// casts no shadow.
pub fn shadow(center: f32, neighbours: impl IntoIterator<Item = f32>) -> f32 {
    let (sum, count) = neighbours
        .into_iter()
        .fold((0.0f32, 0u32), |(sum, count), n| {
            (sum + (center - n).max(0.0), count + 1)
        });
    if count == 0 {
        return 0.0;
    }
    sum / count as f32
}

/// Light attenuation for a shadow term; `1.0` means unshaded.
pub fn attenuation(shadow: f32, params: EdlParams) -> f32 {
    (-params.strength * shadow * params.depth_scale).exp()
}

/// Scale the color channels by `edl`, keeping alpha.
pub fn shade_pixel(color: Rgba, edl: f32) -> Rgba {
    [color[0] * edl, color[1] * edl, color[2] * edl, color[3]]
}

/// Everything one EDL draw reads.
#[derive(Clone, Copy, Debug)]
pub struct EdlInputs<'a> {
    /// Color to shade (`tDiffuse`).
    pub color: &'a ColorTexture,
    /// Perspective device depth (`tDepth`).
    pub depth: &'a DepthTexture,
    /// Sampling offsets in pixels (`kernel`).
    pub kernel: &'a [[f32; 2]],
    /// `cameraNear`
    pub camera_near: f32,
    /// `cameraFar`
    pub camera_far: f32,
    /// `resolution`
    pub resolution: [f32; 2],
    /// Falloff tuning.
    pub params: EdlParams,
}

impl<'a> EdlInputs<'a> {
    /// Resolve the inputs from a program's uniforms and defines.
    ///
    /// The bound kernel must hold exactly `KERNEL_SIZE` offsets.
    pub fn from_bindings(
        uniforms: &'a UniformBindings,
        defines: &ShaderDefines,
    ) -> EdlResult<Self> {
        let kernel = uniforms.vec2_array("kernel")?;
        let kernel_size = defines.get_usize("KERNEL_SIZE")?;
        if kernel.len() != kernel_size {
            return Err(EdlError::evaluation(format!(
                "kernel has {} offsets but KERNEL_SIZE is {kernel_size}",
                kernel.len()
            )));
        }
        let params = EdlParams {
            strength: defines.get_f32("EDL_STRENGTH")?,
            depth_scale: defines.get_f32("EDL_DEPTH_SCALE")?,
        };
        let color: &ColorTexture = uniforms.color("tDiffuse")?;
        let depth: &DepthTexture = uniforms.depth("tDepth")?;
        color.viewport().validate()?;
        depth.viewport().validate()?;
        Ok(Self {
            color,
            depth,
            kernel,
            camera_near: uniforms.float("cameraNear")?,
            camera_far: uniforms.float("cameraFar")?,
            resolution: uniforms.vec2("resolution")?,
            params,
        })
    }

    fn linear_depth_at(&self, uv: [f32; 2]) -> f32 {
        linear_depth(self.depth.sample(uv), self.camera_near, self.camera_far)
    }

    /// The shadow term at `uv`.
    pub fn shadow_at(&self, uv: [f32; 2]) -> f32 {
        let center = self.linear_depth_at(uv);
        let radius = [1.0 / self.resolution[0], 1.0 / self.resolution[1]];
        shadow(
            center,
            self.kernel.iter().map(|k| {
                self.linear_depth_at([uv[0] + radius[0] * k[0], uv[1] + radius[1] * k[1]])
            }),
        )
    }

    /// The shaded color at `uv`.
    pub fn shade_at(&self, uv: [f32; 2]) -> Rgba {
        let edl = attenuation(self.shadow_at(uv), self.params);
        shade_pixel(self.color.sample(uv), edl)
    }
}

/// Shade every pixel of a `viewport`-sized output.
pub fn shade_image(inputs: &EdlInputs<'_>, viewport: Viewport) -> ColorTexture {
    let mut out = ColorTexture::new(viewport);
    for y in 0..viewport.height {
        for x in 0..viewport.width {
            out.set_texel(x, y, inputs.shade_at(viewport.pixel_center_uv(x, y)));
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/edl/shade.rs"]
mod tests;
