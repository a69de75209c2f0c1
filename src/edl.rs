//! Eye-dome lighting: a screen-space pass that darkens pixels whose neighbours are closer
//! to the camera, outlining depth discontinuities in unlit point clouds.

pub(crate) mod pass;
pub(crate) mod shade;
pub(crate) mod shader;

pub use pass::EdlPass;
pub use shade::{
    EdlInputs, EdlParams, attenuation, linear_depth, perspective_depth_to_view_z, shade_image,
    shade_pixel, shadow, view_z_to_orthographic_depth,
};
pub use shader::edl_fragment_parts;
