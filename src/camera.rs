use std::fmt;

use crate::foundation::error::{EdlError, EdlResult};

/// Projection family of a camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    /// Perspective projection; depth buffer values are non-linear in view depth.
    Perspective,
    /// Orthographic projection.
    Orthographic,
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Perspective => "perspective",
            Self::Orthographic => "orthographic",
        })
    }
}

/// The part of a viewer camera the shading pass consumes: its projection kind and clip planes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Camera {
    /// Projection family.
    pub projection: ProjectionKind,
    /// Near clip distance, > 0.
    pub near: f32,
    /// Far clip distance, > `near`.
    pub far: f32,
}

impl Camera {
    /// A perspective camera with the given clip planes.
    pub fn perspective(near: f32, far: f32) -> EdlResult<Self> {
        let camera = Self {
            projection: ProjectionKind::Perspective,
            near,
            far,
        };
        camera.validate()?;
        Ok(camera)
    }

    /// An orthographic camera with the given clip planes.
    pub fn orthographic(near: f32, far: f32) -> EdlResult<Self> {
        let camera = Self {
            projection: ProjectionKind::Orthographic,
            near,
            far,
        };
        camera.validate()?;
        Ok(camera)
    }

    /// Check the clip planes: finite and `0 < near < far`.
    pub fn validate(&self) -> EdlResult<()> {
        if !self.near.is_finite() || !self.far.is_finite() {
            return Err(EdlError::validation("camera clip planes must be finite"));
        }
        if self.near <= 0.0 {
            return Err(EdlError::validation("camera near must be > 0"));
        }
        if self.far <= self.near {
            return Err(EdlError::validation("camera far must be > near"));
        }
        Ok(())
    }

    /// Fail with [`EdlError::UnsupportedProjection`] unless this is a perspective camera.
    ///
    /// Only perspective depth linearization is implemented; orthographic depth is rejected
    /// rather than shaded with the wrong formula.
    pub fn require_perspective(&self) -> EdlResult<()> {
        match self.projection {
            ProjectionKind::Perspective => Ok(()),
            other => Err(EdlError::UnsupportedProjection(other)),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::Perspective,
            near: 0.1,
            far: 1000.0,
        }
    }
}
