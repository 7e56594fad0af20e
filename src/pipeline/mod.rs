pub mod batch;
pub mod embed;
pub mod extract;
pub mod hook;

use std::string::FromUtf8Error;

use anyhow::{Context, Result};
use log::info;
use thiserror::Error;

use crate::config::{self, ConfigError, WatermarkOptions};
use crate::frame::FrameError;
use crate::permute::PermuteError;
use crate::qim::QimError;
use crate::raster::{self, RasterError};
use crate::transform::DwtError;
use hook::PipelineHook;

/// Every way an embed or extract call can fail.
#[derive(Error, Debug)]
pub enum WatermarkError {
    #[error("invalid options: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dimension(#[from] DwtError),
    #[error(transparent)]
    Capacity(#[from] QimError),
    #[error(transparent)]
    Mismatch(#[from] FrameError),
    #[error(transparent)]
    Permute(#[from] PermuteError),
    #[error("recovered payload is not valid UTF-8; wrong seed, q, channel, band or reps?")]
    InvalidText(#[from] FromUtf8Error),
    #[error(transparent)]
    Image(#[from] RasterError),
}

/// Embedding room of one image under given options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub width: u32,
    pub height: u32,
    /// Coefficients in the carrying sub-band.
    pub sites: usize,
    /// Largest text, in UTF-8 bytes, that fits with the given `reps`.
    pub max_payload_bytes: usize,
}

/// Report how much text `image` can carry.
pub fn capacity(image: &[u8], opts: &WatermarkOptions) -> Result<Capacity, WatermarkError> {
    opts.validate()?;
    let raster = raster::decode(image)?;
    let (rows, cols) = (raster.height() as usize, raster.width() as usize);
    if rows % 2 != 0 || cols % 2 != 0 {
        return Err(DwtError::OddDimensions { rows, cols }.into());
    }
    let sites = (rows / 2) * (cols / 2);
    Ok(Capacity {
        width: raster.width(),
        height: raster.height(),
        sites,
        max_payload_bytes: config::max_payload_bytes(sites, opts.reps),
    })
}

/// Result of a full embed → hook → extract roundtrip.
pub struct RoundtripResult {
    /// Text recovered after the hook ran.
    pub extracted: String,
    /// `true` if the recovered text equals the embedded text.
    pub matched: bool,
}

/// Run a full embed → hook → extract roundtrip.
///
/// Steps:
/// 1. Embeds `text` into `image`.
/// 2. Calls `hook.after_embed(..)` with the watermarked PNG, e.g. to send
///    it through a transport and fetch it back.
/// 3. Extracts from the bytes the hook returned and compares.
///
/// # Example
///
/// ```rust,no_run
/// use dwtmark::{roundtrip, NoopHook, WatermarkOptions};
///
/// let png = std::fs::read("photo.png").unwrap();
/// let result = roundtrip(&png, "owner: alice", &WatermarkOptions::default(), &NoopHook).unwrap();
/// assert!(result.matched, "recovered {:?}", result.extracted);
/// ```
pub fn roundtrip<H: PipelineHook>(
    image: &[u8],
    text: &str,
    opts: &WatermarkOptions,
    hook: &H,
) -> Result<RoundtripResult> {
    let marked = embed::add_watermark(image, text, opts).context("embed step failed")?;
    let returned = hook.after_embed(marked.image)?;
    let extracted = extract::extract_watermark(&returned, opts).context("extract step failed")?;
    let matched = extracted == text;
    info!("roundtrip {}", if matched { "matched" } else { "MISMATCHED" });

    Ok(RoundtripResult { extracted, matched })
}
