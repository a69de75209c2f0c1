use super::*;
use crate::{foundation::core::Viewport, kernel::generate_kernel, render::CpuBackend};

#[test]
fn builtin_type_displays_variant_name() {
    assert_eq!(BuiltinType::EdlKernel.to_string(), "EdlKernel");
    assert_eq!(BuiltinType::RenderTarget.to_string(), "RenderTarget");
}

#[test]
fn values_report_their_type() {
    assert_eq!(Value::from(16.0).ty(), BuiltinType::Number);
    assert_eq!(Value::from(KernelType::Edl).ty(), BuiltinType::KernelType);
    assert_eq!(Value::from(Camera::default()).ty(), BuiltinType::Camera);
    let boxed = generate_kernel(KernelType::Box, 4).unwrap();
    assert_eq!(Value::from(boxed).ty(), BuiltinType::BoxKernel);
    let edl = generate_kernel(KernelType::Edl, 4).unwrap();
    assert_eq!(Value::from(edl).ty(), BuiltinType::EdlKernel);
    assert_eq!(BuiltinType::kernel(KernelType::Edl), BuiltinType::EdlKernel);
}

#[test]
fn accessors_only_match_their_variant() {
    let v = Value::Number(2.0);
    assert_eq!(v.as_number(), Some(2.0));
    assert!(v.as_kernel().is_none());
    assert!(v.as_camera().is_none());
}

#[test]
fn renderer_handles_compare_by_identity() {
    let vp = Viewport::new(2, 2).unwrap();
    let a = RendererHandle::new(CpuBackend::new(vp));
    let b = RendererHandle::new(CpuBackend::new(vp));
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
}

#[test]
fn renderer_borrow_is_exclusive() {
    let handle = RendererHandle::new(CpuBackend::new(Viewport::new(2, 2).unwrap()));
    let first = handle.borrow_mut().unwrap();
    assert!(handle.borrow_mut().is_err());
    drop(first);
    assert!(handle.borrow_mut().is_ok());
}
