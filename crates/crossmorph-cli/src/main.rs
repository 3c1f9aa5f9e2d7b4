//! crossmorph - Erode and dilate raw grayscale images
//!
//! ```text
//! crossmorph pentagram_64x64.raw -e 1 -d 2
//! ```
//!
//! Writes `out_pentagram_64x64.raw` next to the input unless `-o` is given.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crossmorph_core::Dimensions;
use crossmorph_io::{output_path, parse_dimensions, read_raw, write_raw};
use crossmorph_morph::{EngineConfig, Execution, FilterEngine, MAX_WORKERS, PassPlan};

#[derive(Parser, Debug)]
#[command(name = "crossmorph")]
#[command(author, version, about = "Tiled grayscale erosion and dilation of raw images", long_about = None)]
struct Cli {
    /// Input raw file, named <name>_<width>x<height>.<ext>
    input: PathBuf,

    /// Number of dilation passes (run after all erosions)
    #[arg(short = 'd', long = "dilations", default_value_t = 1)]
    dilations: u32,

    /// Number of erosion passes
    #[arg(short = 'e', long = "erosions", default_value_t = 1)]
    erosions: u32,

    /// Tile side in pixels; must be a multiple of 16, 0 selects 64
    #[arg(short = 't', long, default_value_t = 0)]
    tile_size: u32,

    /// Image width, overriding the file name
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Image height, overriding the file name
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Pass sequence such as "e2 + d1"; overrides -e and -d
    #[arg(short = 's', long)]
    sequence: Option<String>,

    /// Process the whole image as one tile on the main thread
    #[arg(long)]
    sequential: bool,

    /// Maximum number of worker threads
    #[arg(long, default_value_t = MAX_WORKERS)]
    max_workers: usize,

    /// Output file (default: input name prefixed with "out_")
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn dimensions(&self) -> Result<Dimensions> {
        let (width, height) = match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            _ => parse_dimensions(&self.input).ok_or_else(|| {
                anyhow!(
                    "cannot determine dimensions of '{}': file name must be in format \
                     <name>_<width>x<height>.<ext>, or pass --width and --height",
                    self.input.display()
                )
            })?,
        };
        Dimensions::new(width, height).map_err(|_| {
            anyhow!(
                "incorrect dimensions {}x{}: pixel count must be a non-zero multiple of 64",
                width,
                height
            )
        })
    }

    fn plan(&self) -> Result<PassPlan> {
        match &self.sequence {
            Some(seq) => PassPlan::parse(seq).context("invalid --sequence"),
            None => Ok(PassPlan::erode_then_dilate(self.erosions, self.dilations)),
        }
    }

    fn engine_config(&self) -> EngineConfig {
        let execution = if self.sequential {
            Execution::Sequential
        } else {
            Execution::Parallel
        };
        EngineConfig::default()
            .with_tile_size(self.tile_size)
            .with_max_workers(self.max_workers)
            .with_execution(execution)
    }

    fn output(&self) -> Result<PathBuf> {
        match &self.output {
            Some(path) => Ok(path.clone()),
            None => Ok(output_path(&self.input)?),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    run(&cli)
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn run(cli: &Cli) -> Result<()> {
    // All configuration is validated before the image is read.
    let dims = cli.dimensions()?;
    let plan = cli.plan()?;
    let output = cli.output()?;
    let config = cli.engine_config();

    info!("input file: {}", cli.input.display());
    info!("output file: {}", output.display());
    info!("width: {}, height: {}", dims.width(), dims.height());
    info!("passes: {}", if plan.is_empty() { "none".to_string() } else { plan.to_string() });

    let image = read_raw(&cli.input, dims)
        .with_context(|| format!("failed to read '{}'", cli.input.display()))?;

    let engine = FilterEngine::new(config);
    let start = Instant::now();
    let result = engine.run(image, &plan).context("filtering failed")?;
    info!(
        "Total latency in ms: {:.3}",
        start.elapsed().as_secs_f64() * 1e3
    );

    write_raw(&output, &result)
        .with_context(|| format!("failed to write '{}'", output.display()))?;
    info!("output saved to: {}", output.display());
    Ok(())
}
