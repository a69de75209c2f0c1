use std::rc::Rc;

use super::*;
use crate::{
    camera::Camera,
    foundation::{core::FrameIndex, core::Viewport, error::EdlError},
    kernel::{Kernel, KernelType},
    render::{
        CpuBackend, FragmentKind, RenderBackend,
        texture::{ColorTexture, DepthTexture, RenderTarget},
    },
    shader::FragmentShaderParts,
};

fn kernel_graph(lazy: bool) -> (Graph, NodeId) {
    let mut g = Graph::new();
    g.set("kernelSize", InputNode::new(16.0)).unwrap();
    g.set("kernelType", InputNode::new(KernelType::Edl)).unwrap();
    let size = g.dep("kernelSize").unwrap();
    let ty = g.dep("kernelType").unwrap();
    let node = if lazy {
        KernelNode::lazy_static(size, ty)
    } else {
        KernelNode::eager(size, ty)
    };
    let id = g.set("kernel", node).unwrap();
    (g, id)
}

fn kernel_at(g: &mut Graph, frame: u64, id: NodeId) -> Rc<Kernel> {
    g.get_output(FrameIndex(frame), id)
        .unwrap()
        .as_kernel()
        .cloned()
        .unwrap()
}

struct Scene {
    graph: Graph,
    backend: Rc<std::cell::RefCell<CpuBackend>>,
    edl: NodeId,
}

fn edl_scene(viewport: Viewport, depth: DepthTexture, to_screen: bool) -> Scene {
    let backend = Rc::new(std::cell::RefCell::new(CpuBackend::new(viewport)));
    let mut g = Graph::new();
    g.set("kernelSize", InputNode::new(16.0)).unwrap();
    g.set("kernelType", InputNode::new(KernelType::Edl)).unwrap();
    g.set("camera", InputNode::new(Camera::default())).unwrap();
    let target = RenderTarget::new(
        ColorTexture::filled(viewport, [0.5, 0.5, 0.5, 1.0]),
        depth,
    )
    .unwrap();
    g.set("renderView", InputNode::new(target)).unwrap();
    let handle = RendererHandle::from_rc(backend.clone());
    g.set("renderer", InputNode::new(handle)).unwrap();
    let kernel = KernelNode::lazy_static(g.dep("kernelSize").unwrap(), g.dep("kernelType").unwrap());
    g.set("kernel", kernel).unwrap();

    let node = EdlPassNode::new(
        g.dep("renderView").unwrap(),
        g.dep("renderer").unwrap(),
        g.dep("camera").unwrap(),
        g.dep("kernel").unwrap(),
        16,
    )
    .unwrap()
    .render_to_screen(to_screen);
    let edl = g.set("edlPass", node).unwrap();
    Scene {
        graph: g,
        backend,
        edl,
    }
}

#[test]
fn eager_kernel_node_regenerates_each_frame() {
    let (mut g, id) = kernel_graph(false);
    let a = kernel_at(&mut g, 0, id);
    let b = kernel_at(&mut g, 1, id);
    assert_eq!(a, b);
    assert!(!Rc::ptr_eq(&a, &b));
    assert_eq!(g.stats(id).unwrap().evaluations, 2);
}

#[test]
fn lazy_kernel_node_returns_identical_kernel_until_inputs_change() {
    let (mut g, id) = kernel_graph(true);
    let first = kernel_at(&mut g, 0, id);
    for frame in 1..100 {
        assert!(Rc::ptr_eq(&first, &kernel_at(&mut g, frame, id)));
    }
    assert_eq!(g.stats(id).unwrap().evaluations, 1);

    g.set_input("kernelSize", 8.0).unwrap();
    let resized = kernel_at(&mut g, 100, id);
    assert_eq!(resized.size(), 8);
    assert_eq!(resized.kernel_type(), KernelType::Edl);

    assert!(matches!(
        g.set_input("kernelType", KernelType::Box),
        Err(EdlError::GraphTypeMismatch { .. })
    ));
    assert!(Rc::ptr_eq(&resized, &kernel_at(&mut g, 101, id)));
    assert_eq!(g.stats(id).unwrap().evaluations, 2);
}

#[test]
fn kernel_node_declares_its_layout() {
    let mut g = Graph::new();
    g.set("kernelSize", InputNode::new(8.0)).unwrap();
    g.set("kernelType", InputNode::new(KernelType::Box)).unwrap();
    let size = g.dep("kernelSize").unwrap();
    let ty = g.dep("kernelType").unwrap();

    let err = g
        .set("edl", KernelNode::lazy_static(size.clone(), ty.clone()))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "graph type mismatch on `LazyStaticKernel.kernelType`: expected EdlKernel, found BoxKernel"
    );

    let node = KernelNode::lazy_static(size, ty).producing(KernelType::Box);
    assert_eq!(node.layout(), KernelType::Box);
    assert_eq!(node.outputs(), vec![(DEFAULT_IO_NAME, BuiltinType::BoxKernel)]);
    let id = g.set("box", node).unwrap();
    assert_eq!(kernel_at(&mut g, 0, id).as_slice(), &[0.125; 8]);
}

#[test]
fn kernel_node_rejects_bad_sizes() {
    let (mut g, id) = kernel_graph(true);
    for bad in [0.0, -3.0, 2.5, f64::NAN] {
        g.set_input("kernelSize", bad).unwrap();
        assert!(matches!(
            g.get_output(FrameIndex(0), id),
            Err(EdlError::InvalidKernelSize(_))
        ));
    }
}

#[test]
fn kernel_node_slots_are_typed() {
    let mut g = Graph::new();
    g.set("kernelSize", InputNode::new(16.0)).unwrap();
    let size = g.dep("kernelSize").unwrap();
    let err = g
        .set("kernel", KernelNode::eager(size.clone(), size))
        .unwrap_err();
    assert!(matches!(err, EdlError::GraphTypeMismatch { .. }));
}

#[test]
fn edl_pass_node_rejects_non_kernel_dependency() {
    let viewport = Viewport::new(4, 4).unwrap();
    let mut scene = edl_scene(viewport, DepthTexture::cleared(viewport), false);
    let g = &mut scene.graph;
    let node = EdlPassNode::new(
        g.dep("renderView").unwrap(),
        g.dep("renderer").unwrap(),
        g.dep("camera").unwrap(),
        g.dep("kernelSize").unwrap(),
        16,
    )
    .unwrap();
    let err = g.set("edlPass2", node).unwrap_err();
    assert_eq!(
        err.to_string(),
        "graph type mismatch on `edlPass2.kernel`: expected EdlKernel, found Number"
    );
}

#[test]
fn edl_pass_node_checks_kernel_layout_and_size() {
    let viewport = Viewport::new(4, 4).unwrap();
    let mut scene = edl_scene(viewport, DepthTexture::cleared(viewport), false);

    scene.graph.set_input("kernelSize", 8.0).unwrap();
    assert!(matches!(
        scene.graph.get_output(FrameIndex(0), scene.edl),
        Err(EdlError::Evaluation(_))
    ));

    scene.graph.set_input("kernelSize", 16.0).unwrap();
    assert!(matches!(
        scene.graph.set_input("kernelType", KernelType::Box),
        Err(EdlError::GraphTypeMismatch { .. })
    ));
    assert!(scene.graph.get_output(FrameIndex(1), scene.edl).is_ok());
}

#[test]
fn edl_pass_node_rejects_orthographic_camera() {
    let viewport = Viewport::new(4, 4).unwrap();
    let mut scene = edl_scene(viewport, DepthTexture::cleared(viewport), false);
    scene
        .graph
        .set_input("camera", Camera::orthographic(0.1, 10.0).unwrap())
        .unwrap();
    assert!(matches!(
        scene.graph.get_output(FrameIndex(0), scene.edl),
        Err(EdlError::UnsupportedProjection(_))
    ));
    assert_eq!(scene.backend.borrow().draw_calls(), 0);
}

#[test]
fn edl_pass_node_renders_offscreen() {
    let viewport = Viewport::new(5, 5).unwrap();
    let mut depth = DepthTexture::cleared(viewport);
    depth.set_depth(3, 2, 0.5);
    let mut scene = edl_scene(viewport, depth, false);

    let out = scene.graph.get_output(FrameIndex(0), scene.edl).unwrap();
    let texture = out.as_texture().unwrap();
    assert!(texture.texel(2, 2)[0] < 0.5);
    assert_eq!(texture.texel(0, 4), [0.5, 0.5, 0.5, 1.0]);
    assert!(scene.backend.borrow().screen().is_none());
}

#[test]
fn edl_pass_node_presents_to_screen_each_frame() {
    let viewport = Viewport::new(3, 3).unwrap();
    let mut scene = edl_scene(viewport, DepthTexture::cleared(viewport), true);

    for frame in 0..3 {
        scene
            .graph
            .get_output(FrameIndex(frame), scene.edl)
            .unwrap();
    }
    let backend = scene.backend.borrow();
    assert_eq!(backend.draw_calls(), 3);
    assert_eq!(
        backend.screen().unwrap().texel(1, 1),
        [0.5, 0.5, 0.5, 1.0]
    );

    let kernel = scene.graph.get("kernel").unwrap();
    assert_eq!(scene.graph.stats(kernel).unwrap().evaluations, 1);
}

#[test]
fn edl_pass_node_validates_construction() {
    let dep = Dependency::new(NodeId(0));
    assert!(matches!(
        EdlPassNode::new(dep.clone(), dep.clone(), dep.clone(), dep.clone(), 0),
        Err(EdlError::InvalidKernelSize(_))
    ));
    assert!(matches!(
        EdlPassNode::new(dep.clone(), dep.clone(), dep.clone(), dep, 65),
        Err(EdlError::InvalidKernelSize(_))
    ));
}

#[test]
fn screen_shader_node_only_binds_declared_uniforms() {
    let viewport = Viewport::new(2, 2).unwrap();
    let mut g = Graph::new();
    g.set("scale", InputNode::new(2.0)).unwrap();
    let dep = g.dep("scale").unwrap();

    let node = ScreenShaderNode::new(
        "Copy",
        FragmentKind::Copy,
        FragmentShaderParts::default(),
        dep.clone(),
        dep.clone(),
    );
    assert!(node.with_uniform("scale", dep, BuiltinType::Number).is_err());

    let backend = RendererHandle::new(CpuBackend::new(viewport));
    g.set("renderer", InputNode::new(backend)).unwrap();
    g.set(
        "view",
        InputNode::new(RenderTarget::color_only(ColorTexture::filled(
            viewport,
            [1.0, 0.0, 0.0, 1.0],
        ))),
    )
    .unwrap();
    let copy = ScreenShaderNode::new(
        "Copy",
        FragmentKind::Copy,
        FragmentShaderParts::default(),
        g.dep("view").unwrap(),
        g.dep("renderer").unwrap(),
    );
    let id = g.set("copy", copy).unwrap();
    let out = g.get_output(FrameIndex(0), id).unwrap();
    assert_eq!(out.as_texture().unwrap().texel(1, 0), [1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn edl_pass_node_refuses_box_kernel_when_built() {
    let viewport = Viewport::new(4, 4).unwrap();
    let mut scene = edl_scene(viewport, DepthTexture::cleared(viewport), false);
    let g = &mut scene.graph;
    g.set("boxType", InputNode::new(KernelType::Box)).unwrap();
    let boxed = KernelNode::lazy_static(g.dep("kernelSize").unwrap(), g.dep("boxType").unwrap())
        .producing(KernelType::Box);
    g.set("boxKernel", boxed).unwrap();

    let node = EdlPassNode::new(
        g.dep("renderView").unwrap(),
        g.dep("renderer").unwrap(),
        g.dep("camera").unwrap(),
        g.dep("boxKernel").unwrap(),
        16,
    )
    .unwrap();
    let err = g.set("boxedPass", node).unwrap_err();
    assert_eq!(
        err.to_string(),
        "graph type mismatch on `boxedPass.kernel`: expected EdlKernel, found BoxKernel"
    );
    assert_eq!(scene.backend.borrow().draw_calls(), 0);
}

#[test]
fn screen_shader_uniforms_match_their_declaration() {
    let mut g = Graph::new();
    g.set("kernelSize", InputNode::new(16.0)).unwrap();
    let size = g.dep("kernelSize").unwrap();
    let parts = crate::edl::edl_fragment_parts(16, crate::edl::EdlParams::default());
    let node = || {
        ScreenShaderNode::new(
            "EDLPass",
            FragmentKind::EyeDomeLighting,
            parts.clone(),
            size.clone(),
            size.clone(),
        )
    };

    let err = node()
        .with_uniform("kernel", size.clone(), BuiltinType::Number)
        .unwrap_err();
    assert!(matches!(
        err,
        EdlError::GraphTypeMismatch {
            expected: BuiltinType::EdlKernel,
            found: BuiltinType::Number,
            ..
        }
    ));
    assert!(
        node()
            .with_uniform("kernel", size.clone(), BuiltinType::EdlKernel)
            .is_ok()
    );
    assert!(
        node()
            .with_uniform("cameraNear", size.clone(), BuiltinType::Number)
            .is_ok()
    );
    for reserved in ["tDiffuse", "tDepth", "resolution"] {
        assert!(matches!(
            node().with_uniform(reserved, size.clone(), BuiltinType::Texture),
            Err(EdlError::Graph(_))
        ));
    }
}

#[test]
fn screen_shader_node_refuses_empty_target() {
    let viewport = Viewport::new(2, 2).unwrap();
    let mut g = Graph::new();
    g.set(
        "renderer",
        InputNode::new(RendererHandle::new(CpuBackend::new(viewport))),
    )
    .unwrap();
    let empty = Viewport {
        width: 0,
        height: 0,
    };
    g.set(
        "view",
        InputNode::new(RenderTarget::color_only(ColorTexture::new(empty))),
    )
    .unwrap();
    let copy = ScreenShaderNode::new(
        "Copy",
        FragmentKind::Copy,
        FragmentShaderParts::default(),
        g.dep("view").unwrap(),
        g.dep("renderer").unwrap(),
    );
    let id = g.set("copy", copy).unwrap();
    assert!(matches!(
        g.get_output(FrameIndex(0), id),
        Err(EdlError::Validation(_))
    ));
}
