use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use vgraster::{
    BoxConstraints, ColorFilter, CpuCanvas, ImagePaint, PaintContext, Point, RasterImage,
    RasterOutcome, RasterResult, RasterizerOpts, Rect, RenderHost, Size, ThreadPoolRasterizer,
    VectorDrawable, VectorGraphicNode,
};

#[derive(Parser, Debug)]
#[command(name = "vgraster", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rasterize an SVG through the raster cache and write a PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input SVG.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Logical width (defaults to the SVG's intrinsic width).
    #[arg(long)]
    width: Option<f64>,

    /// Logical height (defaults to the SVG's intrinsic height).
    #[arg(long)]
    height: Option<f64>,

    /// Physical pixels per logical unit.
    #[arg(long, default_value_t = 1.0)]
    density: f64,

    /// Opacity applied while compositing.
    #[arg(long, default_value_t = 1.0)]
    opacity: f32,

    /// Color filter as JSON, e.g. '{"kind":"tint","color":{"r":0,"g":0,"b":255,"a":255}}'.
    #[arg(long)]
    filter: Option<String>,

    /// Override rasterizer worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
    }
}

struct LogHost;

impl RenderHost for LogHost {
    fn mark_needs_paint(&self) {
        tracing::debug!("repaint requested");
    }
}

// Logical units -> output pixels.
struct DensityCanvas {
    inner: CpuCanvas,
    density: f64,
}

impl PaintContext for DensityCanvas {
    fn draw_image(
        &mut self,
        image: &RasterImage,
        dst: Rect,
        paint: &ImagePaint<'_>,
    ) -> RasterResult<()> {
        let d = self.density;
        let dst = Rect::new(dst.x0 * d, dst.y0 * d, dst.x1 * d, dst.y1 * d);
        self.inner.draw_image(image, dst, paint)
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read svg '{}'", args.in_path.display()))?;
    let drawable = Arc::new(VectorDrawable::from_svg_data(&bytes)?);

    let mut opts = RasterizerOpts::from_env();
    if args.threads.is_some() {
        opts = opts.with_threads(args.threads);
    }
    let rasterizer = Arc::new(ThreadPoolRasterizer::new(opts)?);

    let mut node = VectorGraphicNode::new(drawable, rasterizer);
    node.attach(Arc::new(LogHost))?;
    node.set_pixel_density(args.density)?;
    node.set_opacity(args.opacity);
    if let Some(json) = &args.filter {
        let filter: ColorFilter = serde_json::from_str(json).context("parse --filter json")?;
        node.set_color_filter(Some(filter));
    }

    let constraints = BoxConstraints {
        min: Size::new(args.width.unwrap_or(0.0), args.height.unwrap_or(0.0)),
        max: Size::new(
            args.width.unwrap_or(f64::INFINITY),
            args.height.unwrap_or(f64::INFINITY),
        ),
    };
    let size = node.layout(constraints);
    let (w, h) = node.candidate_key().pixel_size();
    anyhow::ensure!(
        w > 0 && h > 0,
        "nothing to render: laid out at {}x{}",
        size.width,
        size.height
    );

    let mut canvas = DensityCanvas {
        inner: CpuCanvas::new(w, h)?,
        density: args.density,
    };
    if node.effective_opacity() > 0.0 {
        node.paint(&mut canvas, Point::ZERO)?;
        if let Some(request) = node.last_request()
            && let RasterOutcome::Failed(msg) = request.wait()
        {
            anyhow::bail!("rasterization failed: {msg}");
        }
        anyhow::ensure!(
            node.cached_key() == Some(node.candidate_key()),
            "rasterization did not produce a bitmap"
        );
        node.paint(&mut canvas, Point::ZERO)?;
    }

    let mut frame = canvas.inner.finish();
    node.dispose();
    vgraster::unpremultiply_rgba8_in_place(&mut frame.data);

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
