//! Eye-dome lighting for point-cloud viewers.
//!
//! The crate provides the pieces of an EDL post-processing stage:
//!
//! - [`generate_kernel`]: deterministic box and EDL sampling kernels,
//! - [`EdlPass`]: a self-contained post-processing pass over a color and depth target,
//! - [`graph`]: a pull-based dataflow graph with eager and lazy-static nodes, including
//!   [`graph::KernelNode`] and [`graph::EdlPassNode`].
//!
//! Drawing goes through the [`RenderBackend`] trait. [`CpuBackend`] evaluates the shading
//! per pixel and is what the tests and the `copc-edl` binary run on.

#![forbid(unsafe_code)]

mod camera;
mod config;
mod edl;
mod foundation;
pub mod graph;
mod kernel;
mod render;
mod shader;

pub use camera::{Camera, ProjectionKind};
pub use config::{EdlConfig, ViewerConfig};
pub use edl::{
    EdlInputs, EdlParams, EdlPass, attenuation, edl_fragment_parts, linear_depth,
    perspective_depth_to_view_z, shade_image, shade_pixel, shadow, view_z_to_orthographic_depth,
};
pub use foundation::core::{FrameIndex, Rgba, Vec2, Viewport};
pub use foundation::error::{EdlError, EdlResult};
pub use kernel::{
    BoxKernel, EdlKernel, Kernel, KernelType, generate_box_kernel, generate_edl_kernel,
    generate_kernel, generate_kernel_named, kernel_size_from_number,
};
pub use render::{
    ColorTexture, CpuBackend, DepthTexture, Destination, FragmentKind, FullScreenQuad,
    RenderBackend, RenderTarget, ShaderProgram,
};
pub use shader::{
    FULLSCREEN_VERTEX_SHADER, FragmentShaderParts, GlslType, ShaderDefines, UniformBindings,
    UniformDecl, UniformValue, build_fragment_shader,
};
