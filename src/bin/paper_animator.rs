use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use paper_animator::{
    CancelToken, ExportOutcome, FrameIndex, FrameScene, GenerationController, ManifestFeed,
    OccurrenceFeed as _, Resolution, RunOpts, Settings, Timeline,
};

#[derive(Parser, Debug)]
#[command(name = "paper-animator", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the reveal schedule and cue offsets as JSON.
    Timeline(TimelineArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct InputArgs {
    /// Occurrence manifest JSON.
    #[arg(long)]
    manifest: PathBuf,

    /// Settings JSON; missing keys use defaults.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Override the words-per-second rate.
    #[arg(long)]
    wps: Option<f64>,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Include every frame, not only word transitions.
    #[arg(long)]
    all_frames: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Render at preview resolution (first document only).
    #[arg(long)]
    preview: bool,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Sound cue played on every word transition.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Compute frames on a thread pool.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for `--parallel`.
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Timeline(args) => cmd_timeline(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn load_inputs(args: &InputArgs) -> anyhow::Result<(ManifestFeed, Settings)> {
    let feed = ManifestFeed::from_path(&args.manifest)
        .with_context(|| format!("load manifest '{}'", args.manifest.display()))?;
    let mut settings = match &args.settings {
        Some(p) => Settings::from_path(p)
            .with_context(|| format!("load settings '{}'", p.display()))?,
        None => Settings::default(),
    };
    if let Some(wps) = args.wps {
        settings.wps = wps;
    }
    settings.validate()?;
    Ok((feed, settings))
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let (feed, settings) = load_inputs(&args.input)?;
    let timeline = Timeline::build(feed.documents(), settings.wps, settings.timeline_fps()?)?;

    let frames: Vec<_> = if args.all_frames {
        timeline.frames().iter().collect()
    } else {
        timeline.transitions().collect()
    };
    let out = serde_json::json!({
        "wps": timeline.wps(),
        "fps": timeline.fps().as_f64(),
        "frame_count": timeline.len(),
        "duration_secs": timeline.duration_secs(),
        "estimated_size": paper_animator::estimate_file_size(timeline.duration_secs()),
        "words": timeline.words(),
        "cues": paper_animator::cue_offsets(&timeline),
        "frames": frames,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (feed, settings) = load_inputs(&args.input)?;
    let (docs, resolution) = if args.preview {
        (&feed.documents()[..feed.documents().len().min(1)], Resolution::Preview)
    } else {
        (feed.documents(), Resolution::Export)
    };
    let timeline = Timeline::build(docs, settings.wps, settings.timeline_fps()?)?;
    let spec = timeline
        .frame(FrameIndex(args.frame))
        .with_context(|| format!("frame {} is outside 0..{}", args.frame, timeline.len()))?;

    let scene = FrameScene::resolve(&timeline, spec)?;
    let record = timeline
        .record_of(spec.current_word())
        .context("frame has no occurrence record")?;
    let page = record.load_page()?;
    let frame = paper_animator::compose_frame(&page, &scene, &settings.effects_config(resolution))?;

    ensure_parent(&args.out)?;
    frame
        .to_image()?
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let (feed, mut settings) = load_inputs(&args.input)?;
    if args.audio.is_some() {
        settings.audio_path = args.audio.clone();
    }

    let controller = GenerationController::new()?;
    let opts = RunOpts {
        parallel: args.parallel,
        threads: args.threads,
        ..RunOpts::default()
    };

    ensure_parent(&args.out)?;
    match controller.export_mp4(feed.documents(), &settings, &args.out, &opts, CancelToken::new()) {
        ExportOutcome::Completed { path, report } => {
            eprintln!(
                "wrote {} ({} frames, {} from cache)",
                path.display(),
                report.frames_completed,
                report.frames_from_cache
            );
            Ok(())
        }
        ExportOutcome::Cancelled(_) => anyhow::bail!("export cancelled"),
        ExportOutcome::Failed(e) => {
            Err(anyhow::Error::new(e).context(format!("export '{}'", args.out.display())))
        }
    }
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
