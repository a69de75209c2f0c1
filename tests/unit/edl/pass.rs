use super::*;
use crate::render::{
    CpuBackend,
    texture::{ColorTexture, DepthTexture},
};

fn vp(w: u32, h: u32) -> Viewport {
    Viewport::new(w, h).unwrap()
}

fn read_target(viewport: Viewport) -> RenderTarget {
    RenderTarget::new(
        ColorTexture::filled(viewport, [0.5, 0.5, 0.5, 1.0]),
        DepthTexture::cleared(viewport),
    )
    .unwrap()
}

#[test]
fn construction_binds_kernel_and_camera() {
    let pass = EdlPass::new(Camera::default(), vp(8, 4), 16).unwrap();
    assert_eq!(pass.kernel().size(), 16);
    assert_eq!(pass.kernel().kernel_type(), KernelType::Edl);
    assert_eq!(pass.uniforms().vec2("resolution").unwrap(), [8.0, 4.0]);
    assert_eq!(pass.uniforms().float("cameraNear").unwrap(), 0.1);
    assert_eq!(pass.uniforms().float("cameraFar").unwrap(), 1000.0);
    assert_eq!(pass.uniforms().vec2_array("kernel").unwrap().len(), 16);
    assert_eq!(pass.program().defines().get("KERNEL_SIZE"), Some("16"));
    assert!(!pass.render_to_screen());
}

#[test]
fn kernel_size_bounds_are_enforced() {
    let cam = Camera::default();
    assert!(matches!(
        EdlPass::new(cam, vp(4, 4), 0),
        Err(EdlError::InvalidKernelSize(_))
    ));
    assert!(matches!(
        EdlPass::new(cam, vp(4, 4), EdlPass::MAX_KERNEL_SIZE + 1),
        Err(EdlError::InvalidKernelSize(_))
    ));
    assert!(EdlPass::new(cam, vp(4, 4), EdlPass::MAX_KERNEL_SIZE).is_ok());
    assert!(EdlPass::new(cam, vp(4, 4), 1).is_ok());
}

#[test]
fn orthographic_camera_is_rejected() {
    let ortho = Camera::orthographic(0.1, 100.0).unwrap();
    assert!(matches!(
        EdlPass::new(ortho, vp(4, 4), 16),
        Err(EdlError::UnsupportedProjection(_))
    ));

    let mut pass = EdlPass::new(Camera::default(), vp(4, 4), 16).unwrap();
    assert!(pass.set_camera(ortho).is_err());
    assert_eq!(pass.camera(), Camera::default());
}

#[test]
fn set_size_only_touches_resolution() {
    let mut pass = EdlPass::new(Camera::default(), vp(8, 8), 16).unwrap();
    let kernel = Rc::clone(pass.kernel());
    let program = Rc::clone(pass.program());

    pass.set_size(vp(100, 50)).unwrap();
    assert_eq!(pass.uniforms().vec2("resolution").unwrap(), [100.0, 50.0]);
    assert!(Rc::ptr_eq(pass.kernel(), &kernel));
    assert!(Rc::ptr_eq(pass.program(), &program));

    pass.resize(3, 2).unwrap();
    assert_eq!(pass.viewport(), vp(3, 2));
    assert!(pass.resize(0, 2).is_err());
    assert_eq!(pass.viewport(), vp(3, 2));
}

#[test]
fn set_camera_updates_clip_uniforms() {
    let mut pass = EdlPass::new(Camera::default(), vp(4, 4), 8).unwrap();
    pass.set_camera(Camera::perspective(1.0, 50.0).unwrap())
        .unwrap();
    assert_eq!(pass.uniforms().float("cameraNear").unwrap(), 1.0);
    assert_eq!(pass.uniforms().float("cameraFar").unwrap(), 50.0);
}

#[test]
fn render_into_write_target() {
    let viewport = vp(5, 5);
    let mut backend = CpuBackend::new(viewport);
    let mut pass = EdlPass::new(Camera::default(), viewport, 16).unwrap();
    let read = read_target(viewport);
    let mut write = RenderTarget::color_only(ColorTexture::new(viewport));

    pass.render(&mut backend, &read, Some(&mut write)).unwrap();
    assert_eq!(**write.texture(), **read.texture());
    assert_eq!(backend.draw_calls(), 1);
    assert!(backend.screen().is_none());
    assert!(pass.uniforms().get("tDepth").is_none());
}

#[test]
fn render_to_screen_ignores_write_target() {
    let viewport = vp(4, 3);
    let mut backend = CpuBackend::new(viewport);
    let mut pass = EdlPass::new(Camera::default(), viewport, 16).unwrap();
    pass.set_render_to_screen(true);

    pass.render(&mut backend, &read_target(viewport), None)
        .unwrap();
    let screen = backend.screen().unwrap();
    assert_eq!(screen.viewport(), viewport);
    assert_eq!(screen.texel(1, 1), [0.5, 0.5, 0.5, 1.0]);
}

#[test]
fn render_requires_depth_and_write_target() {
    let viewport = vp(4, 4);
    let mut backend = CpuBackend::new(viewport);
    let mut pass = EdlPass::new(Camera::default(), viewport, 16).unwrap();

    let no_depth = RenderTarget::color_only(ColorTexture::new(viewport));
    let mut write = RenderTarget::color_only(ColorTexture::new(viewport));
    assert!(pass.render(&mut backend, &no_depth, Some(&mut write)).is_err());
    assert!(pass.render(&mut backend, &read_target(viewport), None).is_err());
    assert_eq!(backend.draw_calls(), 0);
}

#[test]
fn dispose_is_terminal() {
    let viewport = vp(4, 4);
    let mut backend = CpuBackend::new(viewport);
    let mut pass = EdlPass::new(Camera::default(), viewport, 16).unwrap();

    pass.dispose().unwrap();
    assert!(pass.is_disposed());
    assert!(matches!(pass.dispose(), Err(EdlError::UseAfterDispose(_))));

    let mut write = RenderTarget::color_only(ColorTexture::new(viewport));
    assert!(matches!(
        pass.render(&mut backend, &read_target(viewport), Some(&mut write)),
        Err(EdlError::UseAfterDispose(_))
    ));
}

#[test]
fn from_config_applies_screen_flag_and_params() {
    let config = EdlConfig {
        kernel_size: 8,
        render_to_screen: true,
        strength: 10.0,
        ..EdlConfig::default()
    };
    let pass = EdlPass::from_config(&config, Camera::default(), vp(4, 4)).unwrap();
    assert!(pass.render_to_screen());
    assert_eq!(pass.kernel().size(), 8);
    assert_eq!(pass.program().defines().get("EDL_STRENGTH"), Some("10.0"));

    let boxed = EdlConfig {
        kernel_type: KernelType::Box,
        ..EdlConfig::default()
    };
    assert!(EdlPass::from_config(&boxed, Camera::default(), vp(4, 4)).is_err());
}

#[test]
fn render_refuses_empty_read_target() {
    let empty = Viewport {
        width: 0,
        height: 0,
    };
    assert!(matches!(
        RenderTarget::new(ColorTexture::filled(empty, [0.5; 4]), DepthTexture::cleared(empty)),
        Err(EdlError::Validation(_))
    ));

    let mut backend = CpuBackend::new(vp(4, 4));
    let mut pass = EdlPass::new(Camera::default(), vp(4, 4), 16).unwrap();
    let read = RenderTarget::color_only(ColorTexture::new(empty));
    let mut write = RenderTarget::color_only(ColorTexture::new(vp(4, 4)));
    assert!(matches!(
        pass.render(&mut backend, &read, Some(&mut write)),
        Err(EdlError::Validation(_))
    ));
    assert_eq!(backend.draw_calls(), 0);
}
