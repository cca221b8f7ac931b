use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use rust_barcode::detector::{DefaultGridSampler, GridSampler};
use rust_barcode::logger;
use rust_barcode::luminance::{LuminanceSource, render_ascii};
use rust_barcode::models::{BitArray, Point};
use rust_barcode::tools::{
    BinarizerKind, binary_stats, bit_matrix_to_image, grayscale_stats, load_luminance,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "scantool", version, about = "Barcode acquisition pipeline tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum BinarizerArg {
    Hybrid,
    Global,
}

impl From<BinarizerArg> for BinarizerKind {
    fn from(arg: BinarizerArg) -> Self {
        match arg {
            BinarizerArg::Hybrid => BinarizerKind::Hybrid,
            BinarizerArg::Global => BinarizerKind::Global,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Binarize an image, print stats and optionally save the result
    Binarize {
        #[arg(long)]
        image: PathBuf,
        #[arg(long, value_enum, default_value = "hybrid")]
        binarizer: BinarizerArg,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print one binarized row
    Row {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        y: usize,
    },
    /// Rectify a quadrilateral into a module grid and print it
    Sample {
        #[arg(long)]
        image: PathBuf,
        /// Corners as x,y pairs: top-left top-right bottom-right bottom-left
        #[arg(long, num_args = 4, value_parser = parse_point)]
        corners: Vec<Point>,
        #[arg(long)]
        dimension: usize,
        #[arg(long, default_value_t = 0)]
        radius: usize,
        #[arg(long, value_enum, default_value = "hybrid")]
        binarizer: BinarizerArg,
    },
    /// Print a coarse text rendering of the luminance
    Ascii {
        #[arg(long)]
        image: PathBuf,
    },
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {value:?}"))?;
    let x = x.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok(Point::new(x, y))
}

fn main() -> Result<(), Box<dyn Error>> {
    logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Binarize {
            image,
            binarizer,
            output,
        } => binarize_cmd(&image, binarizer.into(), output.as_deref()),
        Command::Row { image, y } => row_cmd(&image, y),
        Command::Sample {
            image,
            corners,
            dimension,
            radius,
            binarizer,
        } => sample_cmd(&image, &corners, dimension, radius, binarizer.into()),
        Command::Ascii { image } => ascii_cmd(&image),
    }
}

fn load(image: &Path) -> Result<Arc<dyn LuminanceSource>, Box<dyn Error>> {
    let source = load_luminance(image)?;
    info!(
        path = %image.display(),
        width = source.width(),
        height = source.height(),
        "image loaded"
    );
    Ok(Arc::new(source))
}

fn binarize_cmd(
    image: &Path,
    kind: BinarizerKind,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let source = load(image)?;
    let gray = grayscale_stats(source.as_ref());
    println!("Gray: min={} max={} avg={}", gray.min, gray.max, gray.avg);

    let start = Instant::now();
    let Some(matrix) = kind.create(source).black_matrix() else {
        warn!("not enough contrast to binarize");
        return Ok(());
    };
    let elapsed = start.elapsed();

    let stats = binary_stats(&matrix);
    println!(
        "Binary ({:?}): black={} / {} ({:.2}%) in {:.2?}",
        kind,
        stats.black_pixels,
        stats.total_pixels,
        stats.black_ratio * 100.0,
        elapsed
    );

    if let Some(output) = output {
        bit_matrix_to_image(&matrix).save(output)?;
        println!("Wrote {}", output.display());
    }
    Ok(())
}

fn row_cmd(image: &Path, y: usize) -> Result<(), Box<dyn Error>> {
    let source = load(image)?;
    if y >= source.height() {
        return Err(format!("row {y} outside image of height {}", source.height()).into());
    }
    match BinarizerKind::Global
        .create(source)
        .black_row(y, BitArray::new(0))
    {
        Some(row) => println!("{row}"),
        None => warn!(y, "row has no usable contrast"),
    }
    Ok(())
}

fn sample_cmd(
    image: &Path,
    corners: &[Point],
    dimension: usize,
    radius: usize,
    kind: BinarizerKind,
) -> Result<(), Box<dyn Error>> {
    let [top_left, top_right, bottom_right, bottom_left] = corners else {
        return Err("exactly four corners are required".into());
    };
    let source = load(image)?;
    let Some(matrix) = kind.create(source).black_matrix() else {
        warn!("not enough contrast to binarize");
        return Ok(());
    };

    let size = dimension as f32;
    let grid = [
        Point::new(0.0, 0.0),
        Point::new(size, 0.0),
        Point::new(size, size),
        Point::new(0.0, size),
    ];
    let quad = [*top_left, *top_right, *bottom_right, *bottom_left];
    match DefaultGridSampler::new(radius).sample_grid_quads(&matrix, dimension, dimension, &grid, &quad) {
        Some(bits) => print!("{bits}"),
        None => warn!("grid maps outside the image"),
    }
    Ok(())
}

fn ascii_cmd(image: &Path) -> Result<(), Box<dyn Error>> {
    let source = load(image)?;
    print!("{}", render_ascii(source.as_ref()));
    Ok(())
}
