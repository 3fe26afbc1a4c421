use clap::{Parser, ValueEnum};
use directories::ProjectDirs;
use math_audio_oversampling::{
    CascadeConfig, CascadeConfigBuilder, CascadeReport, FilterResult, design_cascade,
    format_report,
};
use plotly::{
    Layout, Plot, Scatter,
    common::{DashType, Line, Mode, Title},
    layout::{Axis, AxisType},
};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "design_cascade",
    about = "Design the minimum-order halfband filters of an oversampling cascade"
)]
struct Cli {
    /// Base (1x) sample rate in Hz
    #[arg(long)]
    base_rate: Option<f64>,

    /// Highest oversampling factor (power of two >= 2)
    #[arg(long)]
    max_oversampling: Option<usize>,

    /// Stopband attenuation target in dB (negative)
    #[arg(long, allow_negative_numbers = true)]
    attenuation: Option<f64>,

    /// Fixed passband edge of the 2x -> 1x stage in Hz
    #[arg(long)]
    audio_band: Option<f64>,

    /// Highest filter order tried per stage
    #[arg(long)]
    max_order: Option<usize>,

    /// Remez grid density per unit of oversampling
    #[arg(long)]
    grid_resolution: Option<usize>,

    /// Frequency response points per unit of oversampling
    #[arg(long)]
    response_resolution: Option<usize>,

    /// Design stages in parallel
    #[arg(long)]
    parallel: bool,

    /// JSON configuration file; explicit flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write one HTML magnitude response plot per stage
    #[arg(long)]
    plot: bool,

    /// Directory for the plots (defaults to the cache directory)
    #[arg(long)]
    plot_dir: Option<PathBuf>,

    /// Show per-candidate diagnostics
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(args: &Cli) -> math_audio_oversampling::Result<CascadeConfig> {
    let base = match &args.config {
        Some(path) => CascadeConfig::from_file(path)?,
        None => CascadeConfig::default(),
    };

    let mut builder = CascadeConfigBuilder::from_config(base);
    if let Some(v) = args.base_rate {
        builder = builder.base_sample_rate(v);
    }
    if let Some(v) = args.max_oversampling {
        builder = builder.max_oversampling(v);
    }
    if let Some(v) = args.attenuation {
        builder = builder.target_stopband_attenuation_db(v);
    }
    if let Some(v) = args.audio_band {
        builder = builder.audio_band_edge_hz(v);
    }
    if let Some(v) = args.max_order {
        builder = builder.max_order(v);
    }
    if let Some(v) = args.grid_resolution {
        builder = builder.grid_resolution(v);
    }
    if let Some(v) = args.response_resolution {
        builder = builder.response_resolution(v);
    }
    if args.parallel {
        builder = builder.parallel(true);
    }
    builder.build()
}

/// Default plot directory using the directories crate
fn get_plots_dir() -> Result<PathBuf, String> {
    let proj_dirs = ProjectDirs::from("org", "spinorama", "math-audio")
        .ok_or("Failed to determine project directories")?;

    Ok(proj_dirs.cache_dir().join("oversampling_plots"))
}

fn plot_stage(
    result: &FilterResult,
    report: &CascadeReport,
    dir: &std::path::Path,
) -> Result<PathBuf, String> {
    let response = result
        .response(report.config.response_resolution)
        .map_err(|e| format!("Failed to compute response: {}", e))?;
    let stage = &result.stage;

    // Skip DC on the log axis
    let freqs: Vec<f64> = response.freqs.iter().skip(1).copied().collect();
    let mags: Vec<f64> = response.magnitude_db.iter().skip(1).copied().collect();

    let trace = Scatter::new(freqs, mags)
        .mode(Mode::Lines)
        .name(&format!("order {}", result.order));
    let target = Scatter::new(
        vec![stage.stopband_start_hz, stage.stopband_end_hz],
        vec![report.config.target_stopband_attenuation_db; 2],
    )
    .mode(Mode::Lines)
    .name("target")
    .line(Line::new().dash(DashType::Dash));

    let layout = Layout::new()
        .title(Title::with_text(format!(
            "Frequency response {} ({} taps, {:.1} dB)",
            stage.label(),
            result.tap_count(),
            result.achieved_stopband_attenuation_db
        )))
        .x_axis(
            Axis::new()
                .title(Title::with_text("Frequency [Hz]"))
                .type_(AxisType::Log),
        )
        .y_axis(Axis::new().title(Title::with_text("Amplitude [dB]")));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.add_trace(target);
    plot.set_layout(layout);

    let filename = dir.join(format!(
        "halfband_{}x_to_{}x.html",
        stage.oversampling_in, stage.oversampling_out
    ));
    plot.write_html(&filename);
    Ok(filename)
}

fn write_plots(report: &CascadeReport, dir: Option<PathBuf>) -> Result<(), String> {
    let dir = match dir {
        Some(dir) => dir,
        None => get_plots_dir()?,
    };
    std::fs::create_dir_all(&dir)
        .map_err(|e| format!("Failed to create plot directory {}: {}", dir.display(), e))?;

    for result in &report.stages {
        let filename = plot_stage(result, report, &dir)?;
        eprintln!("  Created response plot: {}", filename.display());
    }
    Ok(())
}

fn main() {
    let args = Cli::parse();
    init_logging(args.verbose);

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let report = match design_cascade(&config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(if e.is_config_error() { 1 } else { 2 });
        }
    };

    match args.format {
        OutputFormat::Text => print!("{}", format_report(&report, args.verbose)),
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: failed to serialize report: {}", e);
                process::exit(2);
            }
        },
    }

    if args.plot
        && let Err(e) = write_plots(&report, args.plot_dir.clone())
    {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
