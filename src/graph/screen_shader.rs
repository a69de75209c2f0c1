use std::rc::Rc;

use crate::{
    foundation::{
        core::FrameIndex,
        error::{EdlError, EdlResult},
    },
    graph::{
        node::{DEFAULT_IO_NAME, Dependency, InputSlot, Node, NodeArgs, NodeOutputs},
        value::{BuiltinType, Value},
    },
    render::{
        backend::{Destination, FragmentKind, FullScreenQuad, ShaderProgram},
        texture::{ColorTexture, RenderTarget},
    },
    shader::{FragmentShaderParts, GlslType, UniformBindings, UniformDecl, UniformValue},
};

/// Slot carrying the render target to read color and depth from.
pub const TARGET_SLOT: &str = "target";
/// Slot carrying the backend to draw with.
pub const RENDERER_SLOT: &str = "renderer";
/// Slot carrying the camera whose clip planes feed `cameraNear` / `cameraFar`.
pub const CAMERA_SLOT: &str = "camera";

const BUILTIN_SLOTS: [&str; 3] = [TARGET_SLOT, RENDERER_SLOT, CAMERA_SLOT];
/// Uniforms bound from the target, never from a slot.
const BUILTIN_UNIFORMS: [&str; 3] = ["tDiffuse", "tDepth", "resolution"];

/// The edge type a declared uniform can be fed from, if any.
fn accepted_type(decl: &UniformDecl) -> Option<BuiltinType> {
    match (decl.ty, decl.array_len.is_some()) {
        (GlslType::Float, false) => Some(BuiltinType::Number),
        (GlslType::Float, true) => Some(BuiltinType::BoxKernel),
        (GlslType::Vec2, true) => Some(BuiltinType::EdlKernel),
        (GlslType::Sampler2D, false) => Some(BuiltinType::Texture),
        _ => None,
    }
}

/// Convert a graph value into the uniform it binds as.
pub(crate) fn uniform_from_value(value: &Value) -> EdlResult<UniformValue> {
    match value {
        Value::Number(v) => Ok(UniformValue::Float(*v as f32)),
        Value::Kernel(k) => Ok(UniformValue::from(k.as_ref())),
        Value::Texture(t) => Ok(UniformValue::Color(Rc::clone(t))),
        other => Err(EdlError::evaluation(format!(
            "{} values cannot be bound as uniforms",
            other.ty()
        ))),
    }
}

/// A fullscreen fragment program applied to a render target's color and depth.
///
/// Binds `tDiffuse`, and when the program declares them `tDepth`, `resolution`,
/// `cameraNear` and `cameraFar`. Extra uniform slots bind their value under the slot name.
/// The output is the rendered texture: the screen image when presenting, otherwise a fresh
/// target the size of the input.
#[derive(Debug)]
pub struct ScreenShaderNode {
    kind: &'static str,
    parts: FragmentShaderParts,
    program: Rc<ShaderProgram>,
    inputs: Vec<InputSlot>,
    quad: FullScreenQuad,
    render_to_screen: bool,
}

impl ScreenShaderNode {
    /// A node running `parts` over `target` with `renderer`.
    pub fn new(
        kind: &'static str,
        fragment: FragmentKind,
        parts: FragmentShaderParts,
        target: Dependency,
        renderer: Dependency,
    ) -> Self {
        let program = Rc::new(ShaderProgram::from_parts(kind, fragment, &parts));
        Self {
            kind,
            parts,
            program,
            inputs: vec![
                InputSlot::new(TARGET_SLOT, target, BuiltinType::RenderTarget),
                InputSlot::new(RENDERER_SLOT, renderer, BuiltinType::Renderer),
            ],
            quad: FullScreenQuad::new(),
            render_to_screen: false,
        }
    }

    /// Take `cameraNear` / `cameraFar` from a camera dependency.
    #[must_use]
    pub fn with_camera(mut self, camera: Dependency) -> Self {
        self.inputs.retain(|s| s.name != CAMERA_SLOT);
        self.inputs
            .push(InputSlot::new(CAMERA_SLOT, camera, BuiltinType::Camera));
        self
    }

    /// Bind a dependency to the uniform `name`.
    ///
    /// The program must declare the uniform, and `ty` must be the edge type its declaration
    /// accepts: `float` takes a `Number`, `float[N]` a `BoxKernel`, `vec2[N]` an `EdlKernel`
    /// and `sampler2D` a `Texture`. `tDiffuse`, `tDepth` and `resolution` come from the
    /// target and cannot be rebound.
    pub fn with_uniform(
        mut self,
        name: &str,
        dependency: Dependency,
        ty: BuiltinType,
    ) -> EdlResult<Self> {
        if BUILTIN_SLOTS.contains(&name) || BUILTIN_UNIFORMS.contains(&name) {
            return Err(EdlError::graph(format!("`{name}` is a reserved slot")));
        }
        let decl = self.parts.uniform(name).ok_or_else(|| {
            EdlError::graph(format!("{} does not declare uniform `{name}`", self.kind))
        })?;
        let expected = accepted_type(decl).ok_or_else(|| {
            EdlError::graph(format!(
                "uniform `{name}` of type {} cannot be fed from the graph",
                decl.ty.as_str()
            ))
        })?;
        if ty != expected {
            return Err(EdlError::GraphTypeMismatch {
                node: self.kind.to_string(),
                slot: name.to_string(),
                expected,
                found: ty,
            });
        }
        self.inputs.retain(|s| s.name != name);
        self.inputs.push(InputSlot::new(name, dependency, ty));
        Ok(self)
    }

    /// Present to the renderer's screen instead of an off-screen target.
    #[must_use]
    pub fn render_to_screen(mut self, render_to_screen: bool) -> Self {
        self.render_to_screen = render_to_screen;
        self
    }

    /// The compiled program.
    pub fn program(&self) -> &Rc<ShaderProgram> {
        &self.program
    }

    fn bindings(&self, target: &RenderTarget, args: &NodeArgs) -> EdlResult<UniformBindings> {
        target.viewport().validate()?;
        let mut uniforms = UniformBindings::new();
        uniforms.set("tDiffuse", UniformValue::Color(Rc::clone(target.texture())));

        if self.parts.declares("tDepth") {
            let depth = target.depth_texture().ok_or_else(|| {
                EdlError::evaluation(format!("{} target has no depth attachment", self.kind))
            })?;
            uniforms.set("tDepth", UniformValue::Depth(Rc::clone(depth)));
        }
        if self.parts.declares("resolution") {
            uniforms.set(
                "resolution",
                UniformValue::Vec2(target.viewport().resolution()),
            );
        }
        if args.contains(CAMERA_SLOT) {
            let camera = args.camera(CAMERA_SLOT)?;
            uniforms.set("cameraNear", UniformValue::Float(camera.near));
            uniforms.set("cameraFar", UniformValue::Float(camera.far));
        }

        for slot in &self.inputs {
            if BUILTIN_SLOTS.contains(&slot.name.as_str()) {
                continue;
            }
            let value = args
                .get(&slot.name)
                .ok_or_else(|| EdlError::evaluation(format!("missing argument `{}`", slot.name)))?;
            uniforms.set(slot.name.clone(), uniform_from_value(value)?);
        }
        Ok(uniforms)
    }
}

impl Node for ScreenShaderNode {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn inputs(&self) -> &[InputSlot] {
        &self.inputs
    }

    fn outputs(&self) -> Vec<(&'static str, BuiltinType)> {
        vec![(DEFAULT_IO_NAME, BuiltinType::Texture)]
    }

    fn evaluate(&mut self, frame: FrameIndex, args: &NodeArgs) -> EdlResult<NodeOutputs> {
        let target = args.render_target(TARGET_SLOT)?;
        let renderer = args.renderer(RENDERER_SLOT)?;
        let uniforms = self.bindings(&target, args)?;

        let mut backend = renderer.borrow_mut()?;
        let texture = if self.render_to_screen {
            backend.draw_fullscreen(&self.program, &uniforms, &self.quad, Destination::Screen)?;
            backend.screen().ok_or_else(|| {
                EdlError::evaluation(format!("{} drew nothing to the screen", self.kind))
            })?
        } else {
            let mut out = RenderTarget::color_only(ColorTexture::new(target.viewport()));
            backend.draw_fullscreen(
                &self.program,
                &uniforms,
                &self.quad,
                Destination::Target(&mut out),
            )?;
            Rc::clone(out.texture())
        };
        tracing::trace!(frame = frame.0, kind = self.kind, "screen shader rendered");
        Ok(NodeOutputs::single(Value::Texture(texture)))
    }
}
