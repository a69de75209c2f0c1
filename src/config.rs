use std::{fs::File, io::BufReader, path::Path};

use crate::{
    camera::Camera,
    edl::{EdlParams, EdlPass},
    foundation::{
        core::Viewport,
        error::{EdlError, EdlResult},
    },
    kernel::KernelType,
};

/// Tuning of the EDL pass.
///
/// Every field is optional in JSON; missing fields take the reference values.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EdlConfig {
    /// Number of kernel offsets, `1..=64`.
    pub kernel_size: usize,
    /// Kernel family; the pass only accepts `edl`.
    pub kernel_type: KernelType,
    /// Falloff strength.
    pub strength: f32,
    /// Depth difference scale.
    pub depth_scale: f32,
    /// Present to the screen instead of a write target.
    pub render_to_screen: bool,
}

impl Default for EdlConfig {
    fn default() -> Self {
        Self {
            kernel_size: EdlPass::DEFAULT_KERNEL_SIZE,
            kernel_type: KernelType::Edl,
            strength: EdlParams::DEFAULT_STRENGTH,
            depth_scale: EdlParams::DEFAULT_DEPTH_SCALE,
            render_to_screen: false,
        }
    }
}

impl EdlConfig {
    /// Check sizes and falloff parameters.
    pub fn validate(&self) -> EdlResult<()> {
        if !(1..=EdlPass::MAX_KERNEL_SIZE).contains(&self.kernel_size) {
            return Err(EdlError::InvalidKernelSize(self.kernel_size as f64));
        }
        self.params().validate()
    }

    /// The falloff parameters.
    pub fn params(&self) -> EdlParams {
        EdlParams {
            strength: self.strength,
            depth_scale: self.depth_scale,
        }
    }

    /// Parse and validate from JSON text.
    pub fn from_json_str(s: &str) -> EdlResult<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| EdlError::serde(format!("parse EDL config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> EdlResult<Self> {
        let config: Self = read_json(path.as_ref(), "EDL config")?;
        config.validate()?;
        Ok(config)
    }
}

/// Everything a viewer session needs to set up the pass.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Output size.
    pub viewport: Viewport,
    /// Camera clip planes and projection.
    pub camera: Camera,
    /// Pass tuning.
    pub edl: EdlConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport {
                width: 640,
                height: 480,
            },
            camera: Camera::default(),
            edl: EdlConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Check every section.
    ///
    /// The camera projection is not checked here; the pass rejects unsupported ones.
    pub fn validate(&self) -> EdlResult<()> {
        self.viewport.validate()?;
        self.camera.validate()?;
        self.edl.validate()
    }

    /// Parse and validate from JSON text.
    pub fn from_json_str(s: &str) -> EdlResult<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| EdlError::serde(format!("parse viewer config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> EdlResult<Self> {
        let config: Self = read_json(path.as_ref(), "viewer config")?;
        config.validate()?;
        Ok(config)
    }

    /// Build the pass this configuration describes.
    pub fn build_pass(&self) -> EdlResult<EdlPass> {
        EdlPass::from_config(&self.edl, self.camera, self.viewport)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> EdlResult<T> {
    let f = File::open(path)
        .map_err(|e| EdlError::validation(format!("open {what} '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| EdlError::serde(format!("parse {what} JSON '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
