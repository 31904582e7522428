use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chipvis::{
    EncodingMode, PlacedLayout, SvgTextBackend, VcdWaveform, VisConfig, VisSession,
    WaveformSource as _, YosysDesign,
};

#[derive(Parser, Debug)]
#[command(name = "chipvis", version, about = "Animate gate-level chip activity as a GIF")]
struct Cli {
    /// Increase log verbosity (`-v` debug, `-vv` trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the activity animation(s).
    Render(Box<RenderArgs>),
    /// List every signal name of a VCD file.
    Signals(SignalsArgs),
}

#[derive(Args, Debug)]
struct SignalsArgs {
    /// Input VCD file.
    vcd: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Yosys JSON netlist.
    #[arg(long)]
    netlist: PathBuf,

    /// Simulation VCD.
    #[arg(long)]
    vcd: PathBuf,

    /// Placed layout JSON.
    #[arg(long)]
    layout: PathBuf,

    /// Output GIF; with several modes each is written as `<stem>_<mode>.gif`.
    #[arg(long, short = 'o')]
    outfile: PathBuf,

    /// JSON configuration file; flags given on the command line override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated encoding modes (0-5).
    #[arg(long)]
    mode: Option<String>,

    /// Waveform prefix of the design under test (`tb.uut.`).
    #[arg(long)]
    prefix: Option<String>,

    /// Status string signal.
    #[arg(long)]
    status_var: Option<String>,

    /// Reset signal.
    #[arg(long)]
    rst: Option<String>,

    /// Clock signal.
    #[arg(long)]
    clk: Option<String>,

    /// Sampling starts at the first status containing this marker.
    #[arg(long)]
    start_status: Option<String>,

    /// Comma-separated power/bias pins ignored in the netlist.
    #[arg(long)]
    ignore_ports: Option<String>,

    /// Comma-separated instance-name prefixes of filler cells.
    #[arg(long)]
    filler_prefixes: Option<String>,

    /// Comma-separated instance-name prefixes of physical cells.
    #[arg(long)]
    phy_prefixes: Option<String>,

    /// Comma-separated module-name prefixes of the cell library.
    #[arg(long)]
    library_prefixes: Option<String>,

    /// Pixels per layout unit.
    #[arg(long)]
    scale: Option<u32>,

    /// Frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Downscale factor applied after rendering.
    #[arg(long)]
    downscale: Option<f64>,

    /// Blur kernel size.
    #[arg(long)]
    blur: Option<u32>,

    /// Status text thickness factor.
    #[arg(long)]
    font_thickness: Option<f32>,

    /// Growth factor of the exponential heatmap.
    #[arg(long)]
    exp_grow: Option<f32>,

    /// Decay factor of the exponential encodings.
    #[arg(long)]
    exp_decay: Option<f32>,

    /// Growth step of the linear heatmap.
    #[arg(long)]
    lin_grow: Option<f32>,

    /// Decay step of the linear heatmap.
    #[arg(long)]
    lin_decay: Option<f32>,

    /// Font family of the status text.
    #[arg(long)]
    font_family: Option<String>,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Enable frame-level parallelism.
    #[arg(long)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Frames per render chunk.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Render identical samples of a chunk only once.
    #[arg(long)]
    elide: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(*args),
        Command::Signals(args) => cmd_signals(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_signals(args: SignalsArgs) -> anyhow::Result<()> {
    let wave = VcdWaveform::from_path(&args.vcd)?;
    for name in wave.signal_names() {
        println!("{name}");
    }
    Ok(())
}

fn build_config(args: &RenderArgs) -> anyhow::Result<VisConfig> {
    let mut cfg = match &args.config {
        Some(path) => VisConfig::from_path(path)?,
        None => VisConfig::default(),
    };

    if let Some(modes) = &args.mode {
        cfg.modes = EncodingMode::parse_list(modes)?;
    }
    if let Some(v) = &args.prefix {
        cfg.prefix.clone_from(v);
    }
    if let Some(v) = &args.status_var {
        cfg.status_signal.clone_from(v);
    }
    if let Some(v) = &args.rst {
        cfg.reset_signal = Some(v.clone());
    }
    if let Some(v) = &args.clk {
        cfg.clock_signal.clone_from(v);
    }
    if let Some(v) = &args.start_status {
        cfg.start_status.clone_from(v);
    }
    for (flag, list) in [
        (&args.ignore_ports, &mut cfg.ignore_ports),
        (&args.filler_prefixes, &mut cfg.filler_prefixes),
        (&args.phy_prefixes, &mut cfg.phy_prefixes),
        (&args.library_prefixes, &mut cfg.library_prefixes),
    ] {
        if let Some(v) = flag {
            *list = vec![v.clone()];
        }
    }
    cfg.scale = args.scale.unwrap_or(cfg.scale);
    cfg.fps = args.fps.unwrap_or(cfg.fps);
    cfg.downscale = args.downscale.unwrap_or(cfg.downscale);
    cfg.blur = args.blur.unwrap_or(cfg.blur);
    cfg.font_thickness = args.font_thickness.unwrap_or(cfg.font_thickness);
    cfg.exp_grow = args.exp_grow.unwrap_or(cfg.exp_grow);
    cfg.exp_decay = args.exp_decay.unwrap_or(cfg.exp_decay);
    cfg.lin_grow = args.lin_grow.unwrap_or(cfg.lin_grow);
    cfg.lin_decay = args.lin_decay.unwrap_or(cfg.lin_decay);
    if let Some(v) = &args.font_family {
        cfg.font_family.clone_from(v);
    }
    cfg.font_dirs.extend(args.font_dirs.iter().cloned());

    cfg.threading.parallel |= args.parallel;
    cfg.threading.static_frame_elision |= args.elide;
    if args.threads.is_some() {
        cfg.threading.threads = args.threads;
    }
    cfg.threading.chunk_size = args.chunk_size.unwrap_or(cfg.threading.chunk_size);

    Ok(cfg.validated()?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = build_config(&args)?;
    chipvis::output::gif::validate_output_path(&args.outfile)?;

    let design = YosysDesign::from_path(&args.netlist)?;
    let wave = VcdWaveform::from_path(&args.vcd)?;
    let layout = PlacedLayout::from_path(&args.layout)?;
    let text = SvgTextBackend::new(&cfg.font_family, cfg.font_dirs.as_slice())?;

    let session = VisSession::prepare(cfg, &design, &wave, &layout, Arc::new(text))?;

    if let Some(parent) = args.outfile.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    for out in session.render_to_gif(&args.outfile)? {
        eprintln!(
            "wrote {} (mode {}, {} frames, {} elided)",
            out.path.display(),
            out.mode,
            out.stats.frames_total,
            out.stats.frames_elided
        );
    }
    Ok(())
}
