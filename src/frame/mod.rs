//! Framed payload: a 32-bit length header followed by the payload bits.
//!
//! The header carries the payload length in bytes, big-endian, XORed with
//! a key derived from the seed and the other embedding parameters (see
//! [`crate::permute::header_key`]).

use thiserror::Error;

use crate::bits;
use crate::config;

#[derive(Error, Debug, PartialEq)]
pub enum FrameError {
    #[error("recovered length header {length} is implausible (at most {max} bytes fit); wrong seed, q, channel, band or reps?")]
    ImplausibleLength { length: u32, max: usize },
    #[error("length header needs 32 bits, got {0}")]
    ShortHeader(usize),
    #[error("payload of {0} bytes does not fit a 32-bit length header")]
    PayloadTooLarge(usize),
}

/// Header bits followed by payload bits, ready for embedding.
pub fn build(payload: &[u8], key: u32) -> Result<Vec<u8>, FrameError> {
    let len = u32::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge(payload.len()))?;
    let mut frame = bits::u32_to_bits(len ^ key);
    frame.extend(bits::bytes_to_bits(payload));
    Ok(frame)
}

/// Decode the payload length from recovered header bits and check it
/// against the number of sites the band offers.
pub fn read_length(
    header: &[u8],
    key: u32,
    sites: usize,
    reps: usize,
) -> Result<usize, FrameError> {
    let raw = bits::bits_to_u32(header, 0).ok_or(FrameError::ShortHeader(header.len()))?;
    let length = raw ^ key;
    let max = config::max_payload_bytes(sites, reps);
    if length as usize > max {
        return Err(FrameError::ImplausibleLength { length, max });
    }
    Ok(length as usize)
}
