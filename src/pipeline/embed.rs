use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::bits;
use crate::config::{self, WatermarkOptions};
use crate::frame;
use crate::permute;
use crate::qim::{self, QimError};
use crate::raster;
use crate::transform::{self, DwtError};

use super::WatermarkError;

/// Output of [`add_watermark`].
#[derive(Debug, Clone)]
pub struct Watermarked {
    /// PNG-encoded watermarked image.
    pub image: Vec<u8>,
}

/// Full embed pipeline: decode -> DWT -> QIM write -> inverse DWT -> PNG.
///
/// Embedding without a seed uses [`config::DEFAULT_SEED`].
pub fn add_watermark(
    image: &[u8],
    text: &str,
    opts: &WatermarkOptions,
) -> Result<Watermarked, WatermarkError> {
    opts.validate()?;
    let seed = opts.seed.unwrap_or_else(|| {
        warn!("no seed given, embedding with default seed {}", config::DEFAULT_SEED);
        config::DEFAULT_SEED
    });
    if opts.alpha.is_some() {
        warn!("alpha is reserved and has no effect on QIM embedding");
    }

    let mut raster = raster::decode(image)?;
    let (rows, cols) = (raster.height() as usize, raster.width() as usize);
    if rows % 2 != 0 || cols % 2 != 0 {
        return Err(DwtError::OddDimensions { rows, cols }.into());
    }

    // Reject oversized messages before touching any pixels.
    let payload = bits::text_to_bytes(text);
    let sites = (rows / 2) * (cols / 2);
    let required = config::required_sites(payload.len(), opts.reps);
    debug!(
        "payload {} bytes, needs {} of {} sites (reps={})",
        payload.len(),
        required,
        sites,
        opts.reps
    );
    if required > sites {
        return Err(QimError::MessageTooLong {
            required,
            available: sites,
        }
        .into());
    }

    info!(
        "embedding {} bytes into {}x{} image (channel={}, band={}, q={}, reps={})",
        payload.len(),
        cols,
        rows,
        opts.channel,
        opts.band,
        opts.q,
        opts.reps
    );

    let mut bands = transform::forward(raster.channel(opts.channel)?)?;
    let order = permute::make_permutation(sites, seed)?;
    let key = permute::header_key(seed, &opts.key_context());
    let framed = frame::build(&payload, key)?;
    qim::embed_bits(
        bands.band_mut(opts.band).as_mut_slice(),
        &framed,
        &order,
        opts.q,
        opts.reps,
    )?;

    let channel = transform::inverse(&bands)?;
    raster.replace_channel(opts.channel, channel)?;
    let image = raster::encode(&raster)?;

    info!("embed complete: {} bytes out", image.len());
    Ok(Watermarked { image })
}

/// Read `input`, watermark it, and write the PNG to `output`.
pub fn embed_file(input: &Path, output: &Path, text: &str, opts: &WatermarkOptions) -> Result<()> {
    info!("reading image: {}", input.display());
    let original =
        fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;

    let marked = add_watermark(&original, text, opts)
        .with_context(|| format!("failed to watermark {}", input.display()))?;

    fs::write(output, &marked.image)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!("wrote watermarked image: {}", output.display());
    Ok(())
}
