//! screenframe-cli: Command-line tool for screen frame debugging
//!
//! Shows which monitor and 16:9 frame the library resolves, dumps region
//! captures to image files and rewrites the calibration file.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use screenframe_core::{
    CaptureFrame, FrameConfig, ScreenFrame,
    capture::{HandleFactory, WindowService},
    model::{PercentRect, PixelRect},
};

#[derive(Parser)]
#[command(name = "screenframe-cli")]
#[command(about = "CLI tool for inspecting the screen frame and dumping captures")]
struct Cli {
    /// Exact title of the target window (overrides SCREENFRAME_WINDOW_TITLE)
    #[arg(long, global = true)]
    title: Option<String>,
    /// Calibration file (overrides SCREENFRAME_CALIBRATION_PATH)
    #[arg(long, global = true)]
    calibration: Option<PathBuf>,
    /// Capture from this still image instead of the live screen (no display needed)
    #[arg(long, global = true)]
    image: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the selected monitor, 16:9 frame and calibration scale
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Capture a region of the 16:9 frame
    Grab {
        /// Region as L T R B, in percent of the frame (0.0-1.0)
        #[arg(long, required = true, num_args = 4, value_names = ["L", "T", "R", "B"], allow_negative_numbers = true)]
        rect: Vec<f64>,
        /// Treat --rect as pixels of the frame instead of percent
        #[arg(long)]
        pixels: bool,
        /// Output file path (format follows the extension)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Capture the whole 16:9 frame
    Full {
        /// Output file path (format follows the extension)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Write the calibration table in use to the calibration file
    WriteScales,
    /// Bring the target window to the foreground
    Focus,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("screenframe_cli=info".parse()?)
                .add_directive("screenframe_core=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = FrameConfig::from_env();
    if let Some(title) = cli.title {
        config.window_title = title;
    }
    if let Some(path) = cli.calibration {
        config.calibration_path = path;
    }

    match &cli.image {
        Some(path) => {
            let frame = ScreenFrame::offline(config, CaptureFrame::open(path)?)?;
            tracing::info!("Using still image {}", path.display());
            run(&frame, cli.command)
        }
        None => run(&ScreenFrame::live(config)?, cli.command),
    }
}

fn run<W: WindowService, F: HandleFactory>(
    frame: &ScreenFrame<W, F>,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Info { json } => info(frame, json)?,
        Commands::Grab { rect, pixels, out } => grab(frame, &rect, pixels, out)?,
        Commands::Full { out } => {
            let image = frame.capture_full()?;
            save(&image, out, "full")?;
        }
        Commands::WriteScales => {
            frame.save_scales()?;
            println!(
                "✓ Wrote {} scale entries to {}",
                frame.scale_table().len(),
                frame.config().calibration_path.display()
            );
        }
        Commands::Focus => {
            frame.focus_target()?;
            println!("✓ '{}' is in the foreground", frame.config().window_title);
        }
    }

    Ok(())
}

fn info<W: WindowService, F: HandleFactory>(frame: &ScreenFrame<W, F>, json: bool) -> Result<()> {
    let monitor = frame.monitor();
    let geometry = frame.geometry();
    let scale = frame.scale();

    if json {
        let report = serde_json::json!({
            "window_title": frame.config().window_title,
            "target_present": frame.is_target_present(),
            "live": frame.is_live(),
            "monitor": monitor,
            "geometry": geometry,
            "live_geometry": frame.live_geometry(),
            "scale": scale,
            "calibration_path": frame.config().calibration_path,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Target window: '{}'", frame.config().window_title);
    println!(
        "  Present: {}",
        if frame.is_target_present() { "yes" } else { "no" }
    );
    println!();
    println!("Monitor {}:", monitor.index);
    println!("  Origin: ({}, {})", monitor.left, monitor.top);
    println!("  Size: {}x{}", monitor.width, monitor.height);
    println!();
    println!("Frame ({}):", if frame.is_live() { "live" } else { "still image" });
    println!("  16:9 area: {}x{}", geometry.cropped_width, geometry.cropped_height);
    println!("  Offset: ({}, {})", geometry.offset_x, geometry.offset_y);
    println!("  Scale: {:.3}, {:.3}", scale.x, scale.y);
    println!("  Calibration file: {}", frame.config().calibration_path.display());

    Ok(())
}

fn grab<W: WindowService, F: HandleFactory>(
    frame: &ScreenFrame<W, F>,
    rect: &[f64],
    pixels: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    let [left, top, right, bottom] = rect else {
        anyhow::bail!("--rect takes exactly four values: L T R B");
    };

    let image = if pixels {
        let rect = PixelRect::new(*left as i32, *top as i32, *right as i32, *bottom as i32);
        println!("Capturing pixels {}...", rect);
        frame.capture_pixels(&rect)?
    } else {
        let rect = PercentRect::new(*left, *top, *right, *bottom);
        println!(
            "Capturing {} (overlay {})...",
            rect,
            frame.percent_to_overlay(&rect)
        );
        frame.capture_percent(&rect)?
    };

    save(&image, out, "grab")
}

fn save(image: &CaptureFrame, out: Option<PathBuf>, prefix: &str) -> Result<()> {
    let path = out.unwrap_or_else(|| default_output(prefix));
    image.save(&path)?;
    let (width, height) = image.dimensions();
    println!("✓ {}x{} capture saved to {}", width, height, path.display());
    Ok(())
}

fn default_output(prefix: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}-{}.png",
        prefix,
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ))
}
