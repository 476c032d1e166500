use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use slidecast::config::resolution::ResolutionSelector;
use slidecast::relay::{LogEvent, init_tracing_with};
use slidecast::{
    FitMode, OutputFormat, Pipeline, PipelineOpts, Resolution, SlideshowConfig, failure_message,
};

#[derive(Parser, Debug)]
#[command(name = "slidecast", version, about = "Assemble slideshow videos from image folders")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the video for one execution folder.
    Folder(FolderArgs),
    /// Build videos for every subfolder of an execution folder.
    Batch(BatchArgs),
    /// List the subfolders of an execution folder.
    List(ListArgs),
}

#[derive(Args, Debug)]
struct FolderArgs {
    /// Folder containing `imagenes/`, `<name>.wav` and `music_<name>.mp3`.
    dir: PathBuf,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Parent folder whose subfolders are processed in name order.
    parent: PathBuf,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Parent folder to inspect.
    parent: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Resolution selector: 1920x1080, 786x480, Vertical or Personalizado.
    #[arg(long)]
    resolution: Option<String>,

    /// Custom width (selects Personalizado unless --resolution is given).
    #[arg(long)]
    width: Option<String>,

    /// Custom height (selects Personalizado unless --resolution is given).
    #[arg(long)]
    height: Option<String>,

    /// Image fit mode: fill-crop or letterbox.
    #[arg(long)]
    fit: Option<FitMode>,

    /// Output frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Output container: mp4, mov or mkv.
    #[arg(long)]
    format: Option<OutputFormat>,

    /// JSON config file; command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep an existing output video instead of replacing it.
    #[arg(long)]
    no_overwrite: bool,

    /// Do not print progress events.
    #[arg(long, short)]
    quiet: bool,
}

fn main() -> ExitCode {
    // Relay events are printed by the CLI itself; keep their tracing mirror quiet by default.
    init_tracing_with("info,slidecast::relay=off");

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Folder(args) => cmd_folder(args),
        Command::Batch(args) => cmd_batch(args),
        Command::List(args) => cmd_list(&args.parent),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &RunArgs) -> anyhow::Result<SlideshowConfig> {
    let mut cfg = match &args.config {
        Some(path) => SlideshowConfig::from_path(path)?,
        None => SlideshowConfig::default(),
    };

    let custom_given = args.width.is_some() || args.height.is_some();
    match &args.resolution {
        Some(sel) => cfg.resolution = sel.clone(),
        None if custom_given => cfg.resolution = ResolutionSelector::Custom.to_string(),
        None => {}
    }

    let width = args
        .width
        .clone()
        .or_else(|| cfg.custom_width.map(|w| w.to_string()));
    let height = args
        .height
        .clone()
        .or_else(|| cfg.custom_height.map(|h| h.to_string()));
    let resolution = Resolution::resolve(&cfg.resolution, width.as_deref(), height.as_deref())?;
    if cfg.selector()? == ResolutionSelector::Custom {
        cfg.custom_width = Some(resolution.width);
        cfg.custom_height = Some(resolution.height);
    }

    if let Some(fit) = args.fit {
        cfg.fit = fit;
    }
    if let Some(fps) = args.fps {
        cfg.fps = fps;
    }
    if let Some(format) = args.format {
        cfg.format = format;
    }
    if args.no_overwrite {
        cfg.overwrite = false;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn make_pipeline(args: &RunArgs) -> anyhow::Result<Pipeline> {
    let cfg = load_config(args)?;
    let opts = PipelineOpts::from_config(&cfg)?;
    tracing::debug!(
        resolution = %opts.resolution,
        fps = opts.fps.num,
        format = %opts.format,
        fit = opts.fit.as_str(),
        "pipeline configured"
    );
    Ok(Pipeline::new(opts))
}

fn printer(quiet: bool) -> impl FnMut(LogEvent) {
    move |event| {
        if !quiet {
            eprintln!("{event}");
        }
    }
}

fn cmd_folder(args: FolderArgs) -> anyhow::Result<ExitCode> {
    let pipeline = make_pipeline(&args.run)?;
    let job = slidecast::session::spawn_folder(pipeline, args.dir)?;
    match job.follow(printer(args.run.quiet)) {
        Ok(out) => {
            println!("{}", out.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", failure_message(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<ExitCode> {
    let pipeline = make_pipeline(&args.run)?;
    let job = slidecast::session::spawn_batch(pipeline, args.parent)?;
    let result = job.follow(printer(args.run.quiet))?;

    for (name, out) in &result.outputs {
        println!("{name} -> {}", out.display());
    }
    for (name, msg) in &result.failures {
        println!("{name} FAILED: {msg}");
    }
    println!(
        "{} succeeded, {} failed",
        result.succeeded(),
        result.failed()
    );
    Ok(if result.failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_list(parent: &Path) -> anyhow::Result<ExitCode> {
    let names = slidecast::list_subfolders(parent)
        .with_context(|| format!("list subfolders of '{}'", parent.display()))?;
    for name in names {
        println!("{}", name.to_string_lossy());
    }
    Ok(ExitCode::SUCCESS)
}
