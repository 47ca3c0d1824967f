use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use darkroom::{
    AssetStore, ColorConfig, ColorPatch, ConfigManifest, ExportArchive, ExportSettings,
    GeometryConfig, GeometryPatch, JobHandle, Lut3d, OutputFormat, OverlaySource, PhotoAsset,
    Rgb8,
    assets::{manifest::PersistedConfig, store::AssetConfig},
    export::pipeline::{spawn_filter_export, spawn_frame_export},
};

#[derive(Parser, Debug)]
#[command(name = "darkroom", version, about = "Batch photo framing and color grading")]
struct Cli {
    /// More log output (repeat for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors and suppress progress lines.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite photos with an overlay and export them as a ZIP.
    Frame(FrameArgs),
    /// Color grade photos and export them as a ZIP.
    Filter(FilterArgs),
    /// Parse `.cube` files and report their size and title.
    LutCheck(LutCheckArgs),
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output ZIP path.
    #[arg(long)]
    out: PathBuf,

    /// Export settings JSON. Flags below override its fields.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Output image format.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// JPEG quality in (0, 1].
    #[arg(long)]
    quality: Option<f32>,

    /// Canvas and JPEG flatten color as `#rrggbb`.
    #[arg(long, value_parser = parse_color)]
    background: Option<Rgb8>,

    /// Per-photo config manifest to apply after the flags, matched by file name.
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Write the final per-photo configs to this manifest path.
    #[arg(long)]
    save_manifest: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Input photos, exported in the given order.
    #[arg(required = true)]
    photos: Vec<PathBuf>,

    /// Overlay image shared by every photo.
    #[arg(long)]
    overlay: Option<PathBuf>,

    #[arg(long, value_enum)]
    fit: Option<FitChoice>,

    #[arg(long, value_enum)]
    canvas: Option<CanvasChoice>,

    /// Overlay scale multiplier.
    #[arg(long)]
    scale: Option<f64>,

    /// Overlay horizontal offset, percent of canvas width.
    #[arg(long, allow_negative_numbers = true)]
    offset_x: Option<f64>,

    /// Overlay vertical offset, percent of canvas height.
    #[arg(long, allow_negative_numbers = true)]
    offset_y: Option<f64>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Input photos, exported in the given order.
    #[arg(required = true)]
    photos: Vec<PathBuf>,

    /// `.cube` LUT applied to every photo.
    #[arg(long)]
    lut: Option<PathBuf>,

    #[command(flatten)]
    grade: GradeArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct GradeArgs {
    /// Exposure in EV stops.
    #[arg(long, allow_negative_numbers = true)]
    exposure: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    temperature: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    tint: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    highlights: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    shadows: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    contrast: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    saturation: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    vibrance: Option<f32>,
}

impl GradeArgs {
    fn patch(&self) -> ColorPatch {
        let params = [
            ("exposure", self.exposure),
            ("temperature", self.temperature),
            ("tint", self.tint),
            ("highlights", self.highlights),
            ("shadows", self.shadows),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
            ("vibrance", self.vibrance),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.map(|v| (name.to_string(), v)))
        .collect();
        ColorPatch { params, lut: None }
    }
}

#[derive(Args, Debug)]
struct LutCheckArgs {
    #[arg(required = true)]
    cubes: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Jpeg,
    Png,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FitChoice {
    Cover,
    Contain,
    Fill,
}

impl From<FitChoice> for darkroom::FitMode {
    fn from(v: FitChoice) -> Self {
        match v {
            FitChoice::Cover => Self::Cover,
            FitChoice::Contain => Self::Contain,
            FitChoice::Fill => Self::Fill,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CanvasChoice {
    Square,
    Original,
    Portrait,
    Landscape,
    Story,
}

impl From<CanvasChoice> for darkroom::CanvasMode {
    fn from(v: CanvasChoice) -> Self {
        match v {
            CanvasChoice::Square => Self::Square,
            CanvasChoice::Original => Self::Original,
            CanvasChoice::Portrait => Self::Portrait,
            CanvasChoice::Landscape => Self::Landscape,
            CanvasChoice::Story => Self::Story,
        }
    }
}

fn parse_color(s: &str) -> Result<Rgb8, String> {
    Rgb8::parse_hex(s).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args, cli.quiet),
        Command::Filter(args) => cmd_filter(args, cli.quiet),
        Command::LutCheck(args) => cmd_lut_check(args),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, 2) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(args: &OutputArgs, default: ExportSettings) -> anyhow::Result<ExportSettings> {
    let mut settings = match &args.settings {
        Some(path) => ExportSettings::read(path)?,
        None => default,
    };
    let (format, quality) = match settings.output {
        OutputFormat::Jpeg { quality } => (FormatChoice::Jpeg, quality),
        OutputFormat::Png => (FormatChoice::Png, default_quality(default)),
    };
    settings.output = match args.format.unwrap_or(format) {
        FormatChoice::Png => OutputFormat::Png,
        FormatChoice::Jpeg => OutputFormat::Jpeg {
            quality: args.quality.unwrap_or(quality),
        },
    };
    if let Some(bg) = args.background {
        settings.background = bg;
    }
    settings.validate()?;
    Ok(settings)
}

fn default_quality(settings: ExportSettings) -> f32 {
    match settings.output {
        OutputFormat::Jpeg { quality } => quality,
        OutputFormat::Png => 0.9,
    }
}

fn load_photos<C: AssetConfig>(paths: &[PathBuf]) -> anyhow::Result<AssetStore<C>> {
    let photos = paths
        .iter()
        .map(|p| PhotoAsset::from_path(p))
        .collect::<Result<Vec<_>, _>>()?;
    let mut store = AssetStore::new();
    store.add(photos);
    Ok(store)
}

/// Patch every photo, then let a manifest override individual ones.
fn configure<C: PersistedConfig>(
    store: &mut AssetStore<C>,
    patch: &C::Patch,
    args: &OutputArgs,
) -> anyhow::Result<()> {
    for id in store.ids() {
        store.update_config(id, patch)?;
    }
    if let Some(path) = &args.manifest {
        let manifest = ConfigManifest::<C>::read(path)?;
        let applied = store.apply_manifest(&manifest)?;
        tracing::info!(path = %path.display(), applied, "manifest applied");
    }
    if let Some(path) = &args.save_manifest {
        let json = store.to_manifest().to_json_pretty()?;
        std::fs::write(path, json)
            .with_context(|| format!("write manifest '{}'", path.display()))?;
    }
    Ok(())
}

fn finish_export(
    job: JobHandle<ExportArchive>,
    requested: usize,
    out: &Path,
    quiet: bool,
) -> anyhow::Result<()> {
    let archive = job.wait(|current, total| {
        if !quiet {
            eprintln!("[{current}/{total}]");
        }
    })?;

    for skipped in &archive.skipped {
        eprintln!("skipped {}: {}", skipped.name, skipped.reason);
    }
    if archive.entries.is_empty() && requested > 0 {
        anyhow::bail!("none of the {requested} photos could be exported");
    }

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(out, &archive.bytes)
        .with_context(|| format!("write archive '{}'", out.display()))?;

    eprintln!(
        "wrote {} ({} of {} photos)",
        out.display(),
        archive.entries.len(),
        requested
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs, quiet: bool) -> anyhow::Result<()> {
    let settings = load_settings(&args.output, ExportSettings::frame())?;
    let mut store = load_photos::<GeometryConfig>(&args.photos)?;

    let patch = GeometryPatch {
        scale: args.scale,
        offset_x: args.offset_x,
        offset_y: args.offset_y,
        fit_mode: args.fit.map(Into::into),
        canvas_mode: args.canvas.map(Into::into),
    };
    configure(&mut store, &patch, &args.output)?;

    let overlay = match &args.overlay {
        Some(path) => OverlaySource::Encoded {
            name: path.display().to_string(),
            bytes: Arc::from(
                std::fs::read(path)
                    .with_context(|| format!("read overlay '{}'", path.display()))?,
            ),
        },
        None => OverlaySource::None,
    };

    let job = spawn_frame_export(store.snapshot(), overlay, settings)?;
    finish_export(job, store.len(), &args.output.out, quiet)
}

fn cmd_filter(args: FilterArgs, quiet: bool) -> anyhow::Result<()> {
    let settings = load_settings(&args.output, ExportSettings::filter())?;
    let mut store = load_photos::<ColorConfig>(&args.photos)?;

    let mut patch = args.grade.patch();
    if let Some(path) = &args.lut {
        let lut = Lut3d::read(path)?;
        tracing::info!(path = %path.display(), size = lut.size(), "lut loaded");
        patch = patch.with_lut(Some(Arc::new(lut)));
    }
    configure(&mut store, &patch, &args.output)?;

    let job = spawn_filter_export(store.snapshot(), settings)?;
    finish_export(job, store.len(), &args.output.out, quiet)
}

fn cmd_lut_check(args: LutCheckArgs) -> anyhow::Result<()> {
    let mut failed = 0usize;
    for path in &args.cubes {
        match Lut3d::read(path) {
            Ok(lut) => println!(
                "{}: ok, size {}, title {:?}",
                path.display(),
                lut.size(),
                lut.title().unwrap_or("")
            ),
            Err(err) => {
                failed += 1;
                println!("{}: {err}", path.display());
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} LUT files failed to parse", args.cubes.len());
    }
    Ok(())
}
