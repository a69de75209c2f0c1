use std::rc::Rc;

use crate::foundation::{
    core::{Rgba, Viewport},
    error::{EdlError, EdlResult},
};

/// Index of the texel a normalized coordinate falls into, clamped to the edge.
fn nearest_texel(u: f32, size: u32) -> usize {
    let max = i64::from(size) - 1;
    ((u * size as f32).floor() as i64).clamp(0, max) as usize
}

fn expected_len(width: u32, height: u32, per_texel: usize) -> EdlResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(per_texel))
        .ok_or_else(|| EdlError::validation("texture size overflow"))
}

/// RGBA color attachment with float channels.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorTexture {
    width: u32,
    height: u32,
    data: Vec<Rgba>,
}

impl ColorTexture {
    /// A texture filled with transparent black.
    pub fn new(viewport: Viewport) -> Self {
        Self::filled(viewport, [0.0; 4])
    }

    /// A texture filled with one color.
    pub fn filled(viewport: Viewport, color: Rgba) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            data: vec![color; viewport.pixel_count()],
        }
    }

    /// Wrap row-major texels.
    pub fn from_texels(viewport: Viewport, data: Vec<Rgba>) -> EdlResult<Self> {
        viewport.validate()?;
        if data.len() != viewport.pixel_count() {
            return Err(EdlError::validation(format!(
                "color texture expects {} texels, got {}",
                viewport.pixel_count(),
                data.len()
            )));
        }
        Ok(Self {
            width: viewport.width,
            height: viewport.height,
            data,
        })
    }

    /// Decode straight-alpha RGBA8 bytes.
    pub fn from_rgba8(viewport: Viewport, bytes: &[u8]) -> EdlResult<Self> {
        if bytes.len() != expected_len(viewport.width, viewport.height, 4)? {
            return Err(EdlError::validation(
                "rgba8 buffer must be width*height*4 bytes",
            ));
        }
        let data = bytes
            .chunks_exact(4)
            .map(|px| {
                [
                    f32::from(px[0]) / 255.0,
                    f32::from(px[1]) / 255.0,
                    f32::from(px[2]) / 255.0,
                    f32::from(px[3]) / 255.0,
                ]
            })
            .collect();
        Self::from_texels(viewport, data)
    }

    /// Encode as straight-alpha RGBA8 bytes, clamping to `[0, 1]`.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.data
            .iter()
            .flat_map(|px| (*px).map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect()
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a viewport.
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
        }
    }

    /// Row-major texels.
    pub fn texels(&self) -> &[Rgba] {
        &self.data
    }

    /// Texel at `(x, y)`; panics when out of bounds.
    pub fn texel(&self, x: u32, y: u32) -> Rgba {
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Overwrite the texel at `(x, y)`; panics when out of bounds.
    pub fn set_texel(&mut self, x: u32, y: u32, color: Rgba) {
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.data[idx] = color;
    }

    /// Nearest-filtered, clamp-to-edge lookup at a normalized coordinate.
    pub fn sample(&self, uv: [f32; 2]) -> Rgba {
        let x = nearest_texel(uv[0], self.width);
        let y = nearest_texel(uv[1], self.height);
        self.data[y * (self.width as usize) + x]
    }
}

/// Depth attachment holding non-linear device depth in `[0, 1]` (`1` is the far plane).
#[derive(Clone, Debug, PartialEq)]
pub struct DepthTexture {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DepthTexture {
    /// A texture cleared to the far plane.
    pub fn cleared(viewport: Viewport) -> Self {
        Self::filled(viewport, 1.0)
    }

    /// A texture filled with one depth value.
    pub fn filled(viewport: Viewport, depth: f32) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            data: vec![depth; viewport.pixel_count()],
        }
    }

    /// Wrap row-major depth values; each must lie in `[0, 1]`.
    pub fn from_values(viewport: Viewport, data: Vec<f32>) -> EdlResult<Self> {
        viewport.validate()?;
        if data.len() != viewport.pixel_count() {
            return Err(EdlError::validation(format!(
                "depth texture expects {} values, got {}",
                viewport.pixel_count(),
                data.len()
            )));
        }
        if let Some(bad) = data.iter().find(|d| !(0.0..=1.0).contains(*d)) {
            return Err(EdlError::validation(format!(
                "device depth must lie in [0, 1], got {bad}"
            )));
        }
        Ok(Self {
            width: viewport.width,
            height: viewport.height,
            data,
        })
    }

    /// Decode 16-bit grayscale, `65535` mapping to the far plane.
    pub fn from_luma16(viewport: Viewport, values: &[u16]) -> EdlResult<Self> {
        let data = values
            .iter()
            .map(|&v| f32::from(v) / f32::from(u16::MAX))
            .collect();
        Self::from_values(viewport, data)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a viewport.
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
        }
    }

    /// Row-major depth values.
    pub fn values(&self) -> &[f32] {
        &self.data
    }

    /// Overwrite the depth at `(x, y)`; panics when out of bounds.
    pub fn set_depth(&mut self, x: u32, y: u32, depth: f32) {
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.data[idx] = depth;
    }

    /// Nearest-filtered, clamp-to-edge lookup at a normalized coordinate.
    pub fn sample(&self, uv: [f32; 2]) -> f32 {
        let x = nearest_texel(uv[0], self.width);
        let y = nearest_texel(uv[1], self.height);
        self.data[y * (self.width as usize) + x]
    }
}

/// Off-screen target with a color attachment and an optional depth attachment.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderTarget {
    color: Rc<ColorTexture>,
    depth: Option<Rc<DepthTexture>>,
}

impl RenderTarget {
    /// A target with both attachments; they must be non-empty and of matching size.
    pub fn new(color: ColorTexture, depth: DepthTexture) -> EdlResult<Self> {
        color.viewport().validate()?;
        if color.viewport() != depth.viewport() {
            return Err(EdlError::validation(format!(
                "attachment sizes differ: color {}x{}, depth {}x{}",
                color.width, color.height, depth.width, depth.height
            )));
        }
        Ok(Self {
            color: Rc::new(color),
            depth: Some(Rc::new(depth)),
        })
    }

    /// A target without depth attachment.
    pub fn color_only(color: ColorTexture) -> Self {
        Self {
            color: Rc::new(color),
            depth: None,
        }
    }

    /// The color attachment.
    pub fn texture(&self) -> &Rc<ColorTexture> {
        &self.color
    }

    /// The depth attachment, if any.
    pub fn depth_texture(&self) -> Option<&Rc<DepthTexture>> {
        self.depth.as_ref()
    }

    /// Size of the color attachment.
    pub fn viewport(&self) -> Viewport {
        self.color.viewport()
    }

    /// Replace the color attachment with a freshly rendered one of the same size.
    pub fn set_texture(&mut self, color: Rc<ColorTexture>) -> EdlResult<()> {
        if color.viewport() != self.viewport() {
            return Err(EdlError::evaluation(
                "rendered texture does not match the target size",
            ));
        }
        self.color = color;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/texture.rs"]
mod tests;
