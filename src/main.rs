use clap::{Parser, ValueEnum};
use image::ImageReader;
use rsquant::dither::{FLOYD_STEINBERG, RIGHT_DOWN, SIERRA_LITE};
use rsquant::{DitherOptions, IndexKind, Method, Quantizer, SixelEncoder};
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Mean,
    Median,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaletteArg {
    Linear,
    Tree,
}

#[derive(Clone, Copy, ValueEnum)]
enum KernelArg {
    SierraLite,
    FloydSteinberg,
    RightDown,
}

/// Reduce an image to a small palette and print it as sixel
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input image path
    img: PathBuf,

    /// Maximum number of palette colors (1-256)
    #[arg(short, long, default_value_t = 256)]
    colors: usize,

    /// Clustering method used to build the palette
    #[arg(short, long, value_enum, default_value_t = MethodArg::Median)]
    method: MethodArg,

    /// Nearest color lookup
    #[arg(short, long, value_enum, default_value_t = PaletteArg::Tree)]
    palette: PaletteArg,

    /// Error diffusion kernel
    #[arg(short, long, value_enum, default_value_t = KernelArg::SierraLite)]
    kernel: KernelArg,

    /// Clamp error-adjusted colors to the channel range
    #[arg(long)]
    clamp: bool,

    /// Map each pixel to its cluster color without dithering
    #[arg(long)]
    no_dither: bool,

    /// Write the result as an image file instead of sixel to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn run(args: &Args) -> rsquant::Result<()> {
    let img = ImageReader::open(&args.img)?.decode()?;

    let method = match args.method {
        MethodArg::Mean => Method::MeanCut,
        MethodArg::Median => Method::MedianCut,
    };
    let quantizer = Quantizer::new(args.colors).method(method);
    let indexed = if args.no_dither {
        quantizer.quantize(&img)?
    } else {
        let kind = match args.palette {
            PaletteArg::Linear => IndexKind::Linear,
            PaletteArg::Tree => IndexKind::Tree,
        };
        let kernel = match args.kernel {
            KernelArg::SierraLite => SIERRA_LITE,
            KernelArg::FloydSteinberg => FLOYD_STEINBERG,
            KernelArg::RightDown => RIGHT_DOWN,
        };
        let options = DitherOptions::new().kernel(kernel).clamp(args.clamp);
        quantizer.dither(&img, kind, options)?
    };
    tracing::info!(
        colors = indexed.palette().len(),
        requested = args.colors,
        "quantized {}",
        args.img.display()
    );

    match &args.output {
        Some(path) => indexed.to_rgb_image().save(path)?,
        None => {
            let mut stdout = BufWriter::new(stdout().lock());
            SixelEncoder::new(&indexed).encode(&mut stdout)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rsquant=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", args.img.to_string_lossy());
            ExitCode::FAILURE
        }
    }
}
