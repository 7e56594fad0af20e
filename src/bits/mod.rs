//! Text, byte, bit and fixed-width integer conversions.
//!
//! Bits are stored one per `u8` (0 or 1), most-significant bit first.

use std::string::FromUtf8Error;

use byteorder::{BigEndian, ByteOrder};

/// Encode text as its UTF-8 bytes.
pub fn text_to_bytes(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Inverse of [`text_to_bytes`]. Ill-formed UTF-8 is an error, not replaced.
pub fn bytes_to_text(bytes: &[u8]) -> Result<String, FromUtf8Error> {
    String::from_utf8(bytes.to_vec())
}

/// Expand each byte into 8 bits, MSB first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for pos in (0..8).rev() {
            bits.push((byte >> pos) & 1);
        }
    }
    bits
}

/// Pack bits into bytes, 8 per byte. A trailing group shorter than 8 bits
/// is dropped.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|group| group.iter().fold(0u8, |acc, &bit| (acc << 1) | (bit & 1)))
        .collect()
}

/// 32 bits of `n`, MSB first.
pub fn u32_to_bits(n: u32) -> Vec<u8> {
    let mut buf = [0u8; 4];
    BigEndian::write_u32(&mut buf, n);
    bytes_to_bits(&buf)
}

/// Read 32 MSB-first bits starting at `offset`. Returns `None` when fewer
/// than 32 bits remain.
pub fn bits_to_u32(bits: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(32)?;
    let window = bits.get(offset..end)?;
    Some(BigEndian::read_u32(&bits_to_bytes(window)))
}

/// Mathematical modulo: result is always in `[0, m)` for `m > 0`.
pub fn pos_mod(a: i64, m: i64) -> i64 {
    a.rem_euclid(m)
}
