//! Quantization index modulation over a sequence of coefficient sites.
//!
//! Bit 0 lives on even multiples of `q`, bit 1 on odd multiples. Writing
//! moves a coefficient to the nearest point of the bit's lattice (at most
//! `q` away); reading picks the nearest multiple of `q` and takes its
//! parity, so a coefficient survives any disturbance below `q / 2`.

use thiserror::Error;

use crate::bits::pos_mod;

#[derive(Error, Debug, PartialEq)]
pub enum QimError {
    #[error("message too long: needs {required} embedding sites, {available} available")]
    MessageTooLong { required: usize, available: usize },
    #[error("site index {index} is outside the band ({len} coefficients)")]
    SiteOutOfRange { index: usize, len: usize },
    #[error("repetition count must be at least 1")]
    ZeroReps,
}

/// Quantize `coefficient` onto the lattice that encodes `bit`.
pub fn write_bit(coefficient: f64, bit: u8, q: f64) -> f64 {
    let b = f64::from(bit & 1);
    let k = ((coefficient / q - b) / 2.0).round();
    q * (2.0 * k + b)
}

/// Recover the bit from the nearest multiple of `q`.
pub fn read_bit(coefficient: f64, q: f64) -> u8 {
    let m = (coefficient / q).round() as i64;
    pos_mod(m, 2) as u8
}

/// Write every bit into `reps` consecutive sites.
///
/// The capacity check runs before any coefficient is touched, so on error
/// `band` is unchanged.
pub fn embed_bits(
    band: &mut [f64],
    bits: &[u8],
    sites: &[usize],
    q: f64,
    reps: usize,
) -> Result<(), QimError> {
    if reps == 0 {
        return Err(QimError::ZeroReps);
    }
    let required = bits.len().saturating_mul(reps);
    if required > sites.len() {
        return Err(QimError::MessageTooLong {
            required,
            available: sites.len(),
        });
    }
    let sites = &sites[..required];
    if let Some(&index) = sites.iter().find(|&&i| i >= band.len()) {
        return Err(QimError::SiteOutOfRange {
            index,
            len: band.len(),
        });
    }

    for (group, &bit) in sites.chunks_exact(reps).zip(bits) {
        for &site in group {
            band[site] = write_bit(band[site], bit, q);
        }
    }
    Ok(())
}

/// Read `count` bits from the leading `count * reps` sites, one majority
/// vote per group of `reps`. A tie (even `reps`) resolves to 1.
pub fn extract_bits(
    band: &[f64],
    sites: &[usize],
    count: usize,
    q: f64,
    reps: usize,
) -> Result<Vec<u8>, QimError> {
    if reps == 0 {
        return Err(QimError::ZeroReps);
    }
    let required = count.saturating_mul(reps);
    if required > sites.len() {
        return Err(QimError::MessageTooLong {
            required,
            available: sites.len(),
        });
    }

    let mut bits = Vec::with_capacity(count);
    for group in sites[..required].chunks_exact(reps) {
        let mut ones = 0usize;
        for &site in group {
            let coefficient = *band.get(site).ok_or(QimError::SiteOutOfRange {
                index: site,
                len: band.len(),
            })?;
            ones += read_bit(coefficient, q) as usize;
        }
        bits.push(majority(ones, reps));
    }
    Ok(bits)
}

fn majority(ones: usize, reps: usize) -> u8 {
    if ones * 2 >= reps {
        1
    } else {
        0
    }
}
