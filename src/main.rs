use anyhow::{Context, Result};
use clap::Parser;
use complaintchart::compiler::{compile_error, ChartStyle};
use complaintchart::graph::render_scene;
use complaintchart::ir::SceneGraph;
use complaintchart::parser::{parse_script, Step};
use complaintchart::session::{load_chart, ChartKind};
use complaintchart::{ChartOptions, OutputFormat};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "complaintchart")]
#[command(about = "Render animated civic-complaint bar charts from CSV data", long_about = None)]
struct Args {
    /// Which chart to build
    #[arg(value_enum)]
    chart: ChartKind,

    /// CSV (or .json) data file; `-` reads CSV from stdin
    data: String,

    /// Interaction script, e.g. 'reason("Noise") | wait(300) | hover("Mar")'
    #[arg(long, default_value = "")]
    script: String,

    /// Render this many milliseconds after the script ends instead of the settled frame
    #[arg(long)]
    at: Option<f64>,

    /// Output file (default: stdout)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write the controls snapshot as JSON
    #[arg(long)]
    controls: Option<PathBuf>,

    /// JSON chart options file
    #[arg(long)]
    options: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Bars shown before "Show All"
    #[arg(long)]
    top: Option<usize>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn write_output(path: Option<&PathBuf>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write '{}'", path.display())),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(bytes).context("Failed to write image to stdout")?;
            handle.flush().context("Failed to flush stdout")
        }
    }
}

fn error_scene(chart: ChartKind, data: &str, options: &ChartOptions) -> SceneGraph {
    let style = match chart {
        ChartKind::TopN => ChartStyle::top_n(&options.colors),
        ChartKind::Dashboard => ChartStyle::dashboard(&options.colors),
    };
    compile_error(&load_error_message(data), style.width as u32, style.height as u32)
}

fn load_error_message(data: &str) -> String {
    if data == "-" {
        "Failed to load data from stdin.".to_string()
    } else {
        format!("Failed to load data file. Please ensure {} exists.", data)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut options = match &args.options {
        Some(path) => ChartOptions::from_path(path)?,
        None => ChartOptions::default(),
    };
    if let Some(format) = args.format {
        options.format = format;
    }
    if let Some(top) = args.top {
        options.top_n = top;
    }

    let steps = parse_script(&args.script).context("Failed to parse interaction script")?;

    let mut chart = match load_chart(args.chart, &args.data, &options) {
        Ok(chart) => chart,
        Err(e) => {
            error!(error = %e, data = %args.data, "data load failed");
            let bytes = render_scene(&error_scene(args.chart, &args.data, &options), options.format)
                .context("Failed to render error message")?;
            write_output(args.out.as_ref(), &bytes)?;
            std::process::exit(1);
        }
    };

    // Replay the script on an explicit clock
    let mut clock = 0.0;
    for step in &steps {
        match step {
            Step::Event(event) => chart.handle(event, clock),
            Step::Wait(ms) => clock += ms,
        }
    }

    let at = match args.at {
        Some(offset) => clock + offset,
        None => chart.settled_at().max(clock),
    };
    let frame = chart.frame(at);
    let bytes = render_scene(&frame, options.format).context("Failed to render chart")?;
    write_output(args.out.as_ref(), &bytes)?;
    info!(at, width = frame.width, height = frame.height, elements = frame.elements.len(), "frame written");

    if let Some(path) = &args.controls {
        let json = serde_json::to_string_pretty(&chart.controls(at)).context("Failed to serialize controls")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write '{}'", path.display()))?;
    }

    Ok(())
}
