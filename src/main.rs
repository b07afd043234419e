use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use ip_rangemap::{
    Canvas, Engine, EngineConfig, Palette, PaletteKind, ProgressObserver, ProgressTracker,
    RunStatus, parse_ranges,
};

#[derive(Parser)]
#[command(name = "ip-rangemap")]
#[command(about = "Render IPv4 CIDR ranges as a Hilbert curve map of the address space")]
#[command(version = "0.1.0")]
struct Args {
    #[arg(help = "Output filename")]
    output: String,

    #[arg(
        short = 'z',
        long,
        help = "Address space bits per pixel",
        default_value = "12"
    )]
    pixel_bits: u32,

    #[arg(long, help = "Sub-blocks per subdivision step", default_value = "16")]
    divide: u32,

    #[arg(long, help = "Colour palette for the ranges", default_value = "turbo")]
    palette: PaletteKind,

    #[arg(short = 'v', long = "verbose", help = "Verbose output (-v for debug, -vv for trace)", action = clap::ArgAction::Count)]
    verbose: u8,
}

struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, percent: u8) {
        if percent % 10 == 0 {
            log::info!("{}%", percent);
        } else {
            log::debug!("{}%", percent);
        }
    }

    fn on_complete(&mut self, elapsed: Duration) {
        log::info!("Drawing completed ({:.1}s)", elapsed.as_secs_f64());
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Configure logging based on verbose level
    let log_level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let config = EngineConfig::new(args.pixel_bits, args.divide)?;

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read input")?;

    let palette = Palette::new(args.palette);
    let ranges = parse_ranges(&input, &palette);
    if ranges.is_empty() {
        log::warn!("No valid ranges in input; writing an empty map");
    }
    log::debug!(
        "Drawing {} ranges at {} address bits per pixel, {}x{} canvas",
        ranges.len(),
        config.pixel_bits(),
        config.canvas_side(),
        config.canvas_side()
    );

    let mut canvas = Canvas::new(config.canvas_side());
    let mut tracker = ProgressTracker::new(Box::new(LogProgress));
    let engine = Engine::new(config);

    if let Some(mut traversal) = engine.start(ranges, &mut tracker, &mut canvas)? {
        while traversal.pump(4096) == RunStatus::InProgress {}
    }

    canvas.save(&args.output)?;

    Ok(())
}
