use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use copc_edl::{
    Camera, ColorTexture, CpuBackend, DepthTexture, EdlConfig, EdlPass, FrameIndex, KernelType,
    RenderBackend, RenderTarget, Viewport, generate_kernel,
    graph::{EdlPassNode, Graph, InputNode, KernelNode, RendererHandle},
};

#[derive(Parser, Debug)]
#[command(name = "copc-edl", version)]
struct Cli {
    /// Log level for diagnostics on stderr.
    #[arg(long, global = true, default_value = "warn")]
    log: tracing::Level,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a generated kernel as JSON.
    Kernel(KernelArgs),
    /// Apply eye-dome lighting to a color PNG using a 16-bit depth PNG.
    Shade(ShadeArgs),
    /// Run the demo dataflow graph over a synthetic scene.
    Graph(GraphArgs),
}

#[derive(Parser, Debug)]
struct KernelArgs {
    /// Kernel family: `box` or `edl`.
    #[arg(long = "type", default_value = "edl")]
    kernel_type: String,

    /// Number of elements.
    #[arg(long, default_value_t = 16)]
    size: usize,
}

#[derive(Parser, Debug)]
struct ShadeArgs {
    /// Input color PNG.
    #[arg(long)]
    color: PathBuf,

    /// Input depth PNG (16-bit grayscale, white is the far plane).
    #[arg(long)]
    depth: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// EDL config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera near plane.
    #[arg(long, default_value_t = 0.1)]
    near: f32,

    /// Camera far plane.
    #[arg(long, default_value_t = 1000.0)]
    far: f32,
}

#[derive(Parser, Debug)]
struct GraphArgs {
    /// Frames to evaluate.
    #[arg(long, default_value_t = 100)]
    frames: u64,

    /// Output width.
    #[arg(long, default_value_t = 160)]
    width: u32,

    /// Output height.
    #[arg(long, default_value_t = 120)]
    height: u32,

    /// Write the Graphviz topology here instead of stdout.
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Write the last presented frame as PNG.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Kernel(args) => cmd_kernel(args),
        Command::Shade(args) => cmd_shade(args),
        Command::Graph(args) => cmd_graph(args),
    }
}

fn cmd_kernel(args: KernelArgs) -> anyhow::Result<()> {
    let kernel_type: KernelType = args.kernel_type.parse()?;
    let kernel = generate_kernel(kernel_type, args.size)?;
    let doc = serde_json::json!({
        "type": kernel_type,
        "size": kernel.size(),
        "arity": kernel.arity(),
        "data": kernel.as_slice(),
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn cmd_shade(args: ShadeArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(p) => EdlConfig::from_path(p)?,
        None => EdlConfig::default(),
    };
    let camera = Camera::perspective(args.near, args.far)?;

    let color = image::open(&args.color)
        .with_context(|| format!("read color png '{}'", args.color.display()))?
        .to_rgba8();
    let depth = image::open(&args.depth)
        .with_context(|| format!("read depth png '{}'", args.depth.display()))?
        .to_luma16();
    if color.dimensions() != depth.dimensions() {
        anyhow::bail!(
            "color is {:?} but depth is {:?}",
            color.dimensions(),
            depth.dimensions()
        );
    }

    let (width, height) = color.dimensions();
    let viewport = Viewport::new(width, height)?;
    let read = RenderTarget::new(
        ColorTexture::from_rgba8(viewport, color.as_raw())?,
        DepthTexture::from_luma16(viewport, depth.as_raw())?,
    )?;

    let mut backend = CpuBackend::new(viewport);
    let mut pass = EdlPass::from_config(&config, camera, viewport)?;
    let mut write = RenderTarget::color_only(ColorTexture::new(viewport));
    pass.render(&mut backend, &read, Some(&mut write))?;
    let shaded = if pass.render_to_screen() {
        backend
            .screen()
            .context("pass presented nothing to the screen")?
    } else {
        Rc::clone(write.texture())
    };
    pass.dispose()?;

    write_png(&args.out, &shaded)
}

fn cmd_graph(args: GraphArgs) -> anyhow::Result<()> {
    let viewport = Viewport::new(args.width, args.height)?;
    let backend = Rc::new(RefCell::new(CpuBackend::new(viewport)));

    let mut graph = Graph::new();
    graph.set("kernelSize", InputNode::new(16.0))?;
    graph.set("kernelType", InputNode::new(KernelType::Edl))?;
    graph.set("camera", InputNode::new(Camera::default()))?;
    graph.set("renderView", InputNode::new(terraced_scene(viewport)?))?;
    graph.set(
        "renderer",
        InputNode::new(RendererHandle::from_rc(backend.clone())),
    )?;
    graph.set(
        "kernel",
        KernelNode::lazy_static(graph.dep("kernelSize")?, graph.dep("kernelType")?),
    )?;
    let edl = graph.set(
        "edlPass",
        EdlPassNode::new(
            graph.dep("renderView")?,
            graph.dep("renderer")?,
            graph.dep("camera")?,
            graph.dep("kernel")?,
            16,
        )?
        .render_to_screen(true),
    )?;

    let mut frame = FrameIndex(0);
    for _ in 0..args.frames {
        graph.get_output(frame, edl)?;
        frame = frame.next();
    }
    tracing::info!(frames = args.frames, "graph evaluated");

    let dot = graph.dump_dot();
    match &args.dot {
        Some(p) => {
            std::fs::write(p, dot).with_context(|| format!("write dot '{}'", p.display()))?
        }
        None => print!("{dot}"),
    }

    if let Some(out) = &args.out {
        let screen = backend
            .borrow()
            .screen()
            .context("no frame was presented")?;
        write_png(out, &screen)?;
    }
    Ok(())
}

/// Gray ground receding in four terraces, with a raised block in the middle.
fn terraced_scene(viewport: Viewport) -> anyhow::Result<RenderTarget> {
    let mut depth = DepthTexture::cleared(viewport);
    let mut color = ColorTexture::new(viewport);
    for y in 0..viewport.height {
        for x in 0..viewport.width {
            let band = (y * 4 / viewport.height) as f32;
            let mut d = 0.9990 - 0.0015 * band;
            let in_block = (viewport.width / 3..2 * viewport.width / 3).contains(&x)
                && (viewport.height / 3..2 * viewport.height / 3).contains(&y);
            if in_block {
                d -= 0.002;
            }
            depth.set_depth(x, y, d);
            let shade = 0.55 + 0.1 * band / 3.0;
            color.set_texel(x, y, [shade, shade, shade * 0.9, 1.0]);
        }
    }
    Ok(RenderTarget::new(color, depth)?)
}

fn write_png(path: &Path, texture: &ColorTexture) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &texture.to_rgba8(),
        texture.width(),
        texture.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
