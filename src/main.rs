use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use dwtmark::config::{DEFAULT_BAND, DEFAULT_CHANNEL, DEFAULT_Q, DEFAULT_REPS};
use dwtmark::pipeline;
use dwtmark::{SubBand, WatermarkOptions};

/// dwtmark: hide short text in images with a Haar DWT + QIM watermark.
#[derive(Parser)]
#[command(name = "dwtmark", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Parameters that must match between embedding and extraction.
#[derive(Args)]
struct MarkArgs {
    /// Colour channel carrying the watermark (0=R, 1=G, 2=B)
    #[arg(long, default_value_t = DEFAULT_CHANNEL)]
    channel: usize,

    /// QIM quantization step
    #[arg(long, default_value_t = DEFAULT_Q)]
    q: f64,

    /// Permutation seed (required for extraction)
    #[arg(long)]
    seed: Option<u32>,

    /// Repetitions per bit for majority voting
    #[arg(long, default_value_t = DEFAULT_REPS)]
    reps: usize,

    /// Detail sub-band to embed into (LH, HL, HH)
    #[arg(long, default_value_t = DEFAULT_BAND)]
    band: SubBand,

    /// Reserved strength parameter
    #[arg(long)]
    alpha: Option<f64>,
}

impl MarkArgs {
    fn options(&self) -> WatermarkOptions {
        WatermarkOptions {
            alpha: self.alpha,
            channel: self.channel,
            q: self.q,
            seed: self.seed,
            reps: self.reps,
            band: self.band,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Embed text into an image
    Embed {
        /// Input image path
        #[arg(short, long)]
        input: PathBuf,

        /// Output image path (always PNG)
        #[arg(short, long)]
        output: PathBuf,

        /// Text to embed
        #[arg(short, long)]
        text: String,

        #[command(flatten)]
        mark: MarkArgs,
    },

    /// Extract text from a watermarked image
    Extract {
        /// Watermarked image path
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        mark: MarkArgs,
    },

    /// Embed the same text into many images in parallel
    EmbedBatch {
        /// Output directory
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Text to embed
        #[arg(short, long)]
        text: String,

        #[command(flatten)]
        mark: MarkArgs,

        /// Input image paths
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Show how much text an image can carry
    Capacity {
        /// Input image path
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        mark: MarkArgs,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Embed {
            input,
            output,
            text,
            mark,
        } => {
            pipeline::embed::embed_file(&input, &output, &text, &mark.options())?;
        }

        Commands::Extract { input, mark } => {
            let text = pipeline::extract::extract_file(&input, &mark.options())?;
            println!("{text}");
        }

        Commands::EmbedBatch {
            out_dir,
            text,
            mark,
            inputs,
        } => {
            let outcomes = pipeline::batch::embed_files(&inputs, &out_dir, &text, &mark.options())?;
            let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
            if failed > 0 {
                bail!("{} of {} images failed", failed, outcomes.len());
            }
        }

        Commands::Capacity { input, mark } => {
            let image = std::fs::read(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let cap = pipeline::capacity(&image, &mark.options())?;
            println!(
                "{}x{}: {} sites, up to {} bytes of text at reps={}",
                cap.width, cap.height, cap.sites, cap.max_payload_bytes, mark.reps
            );
        }
    }

    Ok(())
}
