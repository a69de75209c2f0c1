use crate::foundation::error::{EdlError, EdlResult};

pub use kurbo::Vec2;

/// Linear RGBA color with straight (non-premultiplied) alpha.
pub type Rgba = [f32; 4];

/// Index of a rendered frame, as counted by the host's render loop.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// The frame after this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Size in pixels of a render surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Build a viewport; both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> EdlResult<Self> {
        let vp = Self { width, height };
        vp.validate()?;
        Ok(vp)
    }

    /// Check that both dimensions are non-zero.
    pub fn validate(self) -> EdlResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(EdlError::validation(format!(
                "viewport must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Number of pixels covered by the viewport.
    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// The `resolution` uniform value.
    pub fn resolution(self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }

    /// Normalized coordinate of the center of pixel `(x, y)`.
    pub fn pixel_center_uv(self, x: u32, y: u32) -> [f32; 2] {
        [
            (x as f32 + 0.5) / self.width as f32,
            (y as f32 + 0.5) / self.height as f32,
        ]
    }
}
