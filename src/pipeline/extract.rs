use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::bits;
use crate::config::{WatermarkOptions, HEADER_BITS};
use crate::frame;
use crate::permute;
use crate::qim;
use crate::raster;
use crate::transform;

use super::WatermarkError;

/// Full extract pipeline: decode -> DWT -> majority-vote QIM read -> text.
///
/// The recovered length header is checked against the band's capacity, so
/// mismatched parameters fail instead of returning garbage.
pub fn extract_watermark(image: &[u8], opts: &WatermarkOptions) -> Result<String, WatermarkError> {
    opts.validate()?;
    let seed = opts.require_seed()?;
    if opts.alpha.is_some() {
        warn!("alpha is reserved and has no effect on QIM extraction");
    }

    let raster = raster::decode(image)?;
    info!(
        "extracting from {}x{} image (channel={}, band={}, q={}, reps={})",
        raster.width(),
        raster.height(),
        opts.channel,
        opts.band,
        opts.q,
        opts.reps
    );

    let bands = transform::forward(raster.channel(opts.channel)?)?;
    let band = bands.band(opts.band).as_slice();
    let order = permute::make_permutation(band.len(), seed)?;

    let header = qim::extract_bits(band, &order, HEADER_BITS, opts.q, opts.reps)?;
    let key = permute::header_key(seed, &opts.key_context());
    let length = frame::read_length(&header, key, order.len(), opts.reps)?;
    debug!("length header: {} bytes", length);

    // header extraction above guarantees HEADER_BITS * reps <= order.len()
    let payload_sites = &order[HEADER_BITS.saturating_mul(opts.reps)..];
    let payload_bits =
        qim::extract_bits(band, payload_sites, length.saturating_mul(8), opts.q, opts.reps)?;
    let text = bits::bytes_to_text(&bits::bits_to_bytes(&payload_bits))?;

    info!("extract complete: {} bytes recovered", length);
    Ok(text)
}

/// Read `input` and return the watermark text it carries.
pub fn extract_file(input: &Path, opts: &WatermarkOptions) -> Result<String> {
    info!("reading image: {}", input.display());
    let image = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let text = extract_watermark(&image, opts)
        .with_context(|| format!("failed to extract watermark from {}", input.display()))?;
    Ok(text)
}
