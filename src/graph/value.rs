use std::{
    cell::{RefCell, RefMut},
    fmt,
    rc::Rc,
};

use crate::{
    camera::Camera,
    foundation::error::{EdlError, EdlResult},
    kernel::{Kernel, KernelType},
    render::{
        backend::RenderBackend,
        texture::{ColorTexture, RenderTarget},
    },
};

/// Type tag of a value flowing along a graph edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuiltinType {
    /// A scalar.
    Number,
    /// A kernel family.
    KernelType,
    /// A box kernel: one scalar weight per sample.
    BoxKernel,
    /// An EDL kernel: one `vec2` offset per sample.
    EdlKernel,
    /// A camera.
    Camera,
    /// A render target with color and depth.
    RenderTarget,
    /// A drawing backend.
    Renderer,
    /// A color texture.
    Texture,
}

impl BuiltinType {
    /// The kernel type whose values have the layout of `kernel_type`.
    pub fn kernel(kernel_type: KernelType) -> Self {
        match kernel_type {
            KernelType::Box => Self::BoxKernel,
            KernelType::Edl => Self::EdlKernel,
        }
    }

    /// Variant name, as shown in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "Number",
            Self::KernelType => "KernelType",
            Self::BoxKernel => "BoxKernel",
            Self::EdlKernel => "EdlKernel",
            Self::Camera => "Camera",
            Self::RenderTarget => "RenderTarget",
            Self::Renderer => "Renderer",
            Self::Texture => "Texture",
        }
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared handle to a drawing backend. Equality is identity.
#[derive(Clone)]
pub struct RendererHandle(Rc<RefCell<dyn RenderBackend>>);

impl RendererHandle {
    /// Wrap a backend.
    pub fn new<B: RenderBackend + 'static>(backend: B) -> Self {
        Self(Rc::new(RefCell::new(backend)))
    }

    /// Share a backend the caller keeps a typed handle to.
    pub fn from_rc(backend: Rc<RefCell<dyn RenderBackend>>) -> Self {
        Self(backend)
    }

    /// Exclusive access for one draw.
    pub fn borrow_mut(&self) -> EdlResult<RefMut<'_, dyn RenderBackend + 'static>> {
        self.0
            .try_borrow_mut()
            .map_err(|_| EdlError::evaluation("renderer is already in use"))
    }
}

impl PartialEq for RendererHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for RendererHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RendererHandle")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// A value flowing along a graph edge.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// See [`BuiltinType::Number`].
    Number(f64),
    /// See [`BuiltinType::KernelType`].
    KernelType(KernelType),
    /// A generated kernel; its type is [`BuiltinType::BoxKernel`] or
    /// [`BuiltinType::EdlKernel`] depending on the layout.
    Kernel(Rc<Kernel>),
    /// See [`BuiltinType::Camera`].
    Camera(Camera),
    /// See [`BuiltinType::RenderTarget`].
    RenderTarget(Rc<RenderTarget>),
    /// See [`BuiltinType::Renderer`].
    Renderer(RendererHandle),
    /// See [`BuiltinType::Texture`].
    Texture(Rc<ColorTexture>),
}

impl Value {
    /// The type tag.
    pub fn ty(&self) -> BuiltinType {
        match self {
            Self::Number(_) => BuiltinType::Number,
            Self::KernelType(_) => BuiltinType::KernelType,
            Self::Kernel(k) => BuiltinType::kernel(k.kernel_type()),
            Self::Camera(_) => BuiltinType::Camera,
            Self::RenderTarget(_) => BuiltinType::RenderTarget,
            Self::Renderer(_) => BuiltinType::Renderer,
            Self::Texture(_) => BuiltinType::Texture,
        }
    }

    /// The scalar, if this is a `Number`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// The kernel family, if this is a `KernelType`.
    pub fn as_kernel_type(&self) -> Option<KernelType> {
        match self {
            Self::KernelType(v) => Some(*v),
            _ => None,
        }
    }

    /// The kernel, of either layout.
    pub fn as_kernel(&self) -> Option<&Rc<Kernel>> {
        match self {
            Self::Kernel(v) => Some(v),
            _ => None,
        }
    }

    /// The camera, if this is a `Camera`.
    pub fn as_camera(&self) -> Option<Camera> {
        match self {
            Self::Camera(v) => Some(*v),
            _ => None,
        }
    }

    /// The render target, if this is a `RenderTarget`.
    pub fn as_render_target(&self) -> Option<&Rc<RenderTarget>> {
        match self {
            Self::RenderTarget(v) => Some(v),
            _ => None,
        }
    }

    /// The backend handle, if this is a `Renderer`.
    pub fn as_renderer(&self) -> Option<&RendererHandle> {
        match self {
            Self::Renderer(v) => Some(v),
            _ => None,
        }
    }

    /// The color texture, if this is a `Texture`.
    pub fn as_texture(&self) -> Option<&Rc<ColorTexture>> {
        match self {
            Self::Texture(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<KernelType> for Value {
    fn from(v: KernelType) -> Self {
        Self::KernelType(v)
    }
}

impl From<Kernel> for Value {
    fn from(v: Kernel) -> Self {
        Self::Kernel(Rc::new(v))
    }
}

impl From<Camera> for Value {
    fn from(v: Camera) -> Self {
        Self::Camera(v)
    }
}

impl From<RenderTarget> for Value {
    fn from(v: RenderTarget) -> Self {
        Self::RenderTarget(Rc::new(v))
    }
}

impl From<RendererHandle> for Value {
    fn from(v: RendererHandle) -> Self {
        Self::Renderer(v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/value.rs"]
mod tests;
