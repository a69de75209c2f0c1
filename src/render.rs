pub(crate) mod backend;
pub(crate) mod cpu;
pub(crate) mod texture;

pub use backend::{Destination, FragmentKind, FullScreenQuad, RenderBackend, ShaderProgram};
pub use cpu::CpuBackend;
pub use texture::{ColorTexture, DepthTexture, RenderTarget};
