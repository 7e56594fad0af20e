use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// Watermark parameters
pub const DEFAULT_CHANNEL: usize = 2;
pub const DEFAULT_Q: f64 = 12.0;
pub const DEFAULT_REPS: usize = 3;
pub const DEFAULT_SEED: u32 = 1234;
pub const DEFAULT_BAND: SubBand = SubBand::HL;

// Image layout
pub const CHANNEL_COUNT: usize = 3;
pub const MAX_SAMPLE: f64 = 255.0;

// Frame layout: 32-bit length header in front of the payload bits
pub const HEADER_BITS: usize = 32;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("quantization step must be a positive finite number, got {0}")]
    InvalidStep(f64),
    #[error("repetition count must be at least 1")]
    InvalidReps,
    #[error("channel must be one of 0, 1, 2, got {0}")]
    InvalidChannel(usize),
    #[error("alpha must be a finite number, got {0}")]
    InvalidAlpha(f64),
    #[error("Seed is required for extraction")]
    MissingSeed,
    #[error("unknown sub-band '{0}' (expected LH, HL or HH)")]
    UnknownBand(String),
}

/// Detail sub-band that carries the watermark.
///
/// LL is deliberately absent: quantizing the approximation band is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubBand {
    LH,
    HL,
    HH,
}

impl fmt::Display for SubBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubBand::LH => "LH",
            SubBand::HL => "HL",
            SubBand::HH => "HH",
        };
        f.write_str(name)
    }
}

impl FromStr for SubBand {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LH" => Ok(SubBand::LH),
            "HL" => Ok(SubBand::HL),
            "HH" => Ok(SubBand::HH),
            _ => Err(ConfigError::UnknownBand(s.to_string())),
        }
    }
}

/// Per-call watermark options. `q`, `seed`, `reps`, `channel` and `band`
/// must be identical between embedding and extraction; none are stored in
/// the image.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkOptions {
    /// Reserved strength parameter, accepted but unused by QIM.
    pub alpha: Option<f64>,
    pub channel: usize,
    pub q: f64,
    pub seed: Option<u32>,
    pub reps: usize,
    pub band: SubBand,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            alpha: None,
            channel: DEFAULT_CHANNEL,
            q: DEFAULT_Q,
            seed: Some(DEFAULT_SEED),
            reps: DEFAULT_REPS,
            band: DEFAULT_BAND,
        }
    }
}

impl WatermarkOptions {
    /// Check every field except the seed, which only extraction insists on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.q.is_finite() && self.q > 0.0) {
            return Err(ConfigError::InvalidStep(self.q));
        }
        if self.reps == 0 {
            return Err(ConfigError::InvalidReps);
        }
        if self.channel >= CHANNEL_COUNT {
            return Err(ConfigError::InvalidChannel(self.channel));
        }
        if let Some(alpha) = self.alpha {
            if !alpha.is_finite() {
                return Err(ConfigError::InvalidAlpha(alpha));
            }
        }
        Ok(())
    }

    pub fn require_seed(&self) -> Result<u32, ConfigError> {
        self.seed.ok_or(ConfigError::MissingSeed)
    }

    /// Bytes identifying every parameter besides the seed that must match
    /// between embed and extract. Mixed into the header key. `alpha` is
    /// not included since it does not affect the embedding.
    pub fn key_context(&self) -> Vec<u8> {
        let mut ctx = Vec::with_capacity(18);
        ctx.extend_from_slice(&self.q.to_bits().to_le_bytes());
        ctx.extend_from_slice(&(self.reps as u64).to_le_bytes());
        ctx.push(self.channel as u8);
        ctx.push(self.band as u8);
        ctx
    }
}

/// Number of embedding sites needed for a payload of `payload_bytes` bytes.
///
/// Saturates at `usize::MAX`, which no band can satisfy.
pub fn required_sites(payload_bytes: usize, reps: usize) -> usize {
    payload_bytes
        .saturating_mul(8)
        .saturating_add(HEADER_BITS)
        .saturating_mul(reps)
}

/// Largest payload, in bytes, that fits in `sites` embedding sites.
pub fn max_payload_bytes(sites: usize, reps: usize) -> usize {
    if reps == 0 {
        return 0;
    }
    (sites / reps).saturating_sub(HEADER_BITS) / 8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(WatermarkOptions::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_step() {
        for q in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let opts = WatermarkOptions { q, ..Default::default() };
            assert!(matches!(opts.validate(), Err(ConfigError::InvalidStep(_))));
        }
    }

    #[test]
    fn test_rejects_bad_channel_and_reps() {
        let opts = WatermarkOptions { channel: 3, ..Default::default() };
        assert_eq!(opts.validate(), Err(ConfigError::InvalidChannel(3)));

        let opts = WatermarkOptions { reps: 0, ..Default::default() };
        assert_eq!(opts.validate(), Err(ConfigError::InvalidReps));
    }

    #[test]
    fn test_missing_seed() {
        let opts = WatermarkOptions { seed: None, ..Default::default() };
        assert!(opts.validate().is_ok());
        assert_eq!(opts.require_seed(), Err(ConfigError::MissingSeed));
    }

    #[test]
    fn test_key_context_tracks_parameters() {
        let base = WatermarkOptions::default();
        let ctx = base.key_context();
        assert_eq!(ctx.len(), 18);
        for other in [
            WatermarkOptions { q: 16.0, ..base.clone() },
            WatermarkOptions { reps: 1, ..base.clone() },
            WatermarkOptions { channel: 0, ..base.clone() },
            WatermarkOptions { band: SubBand::HH, ..base.clone() },
        ] {
            assert_ne!(other.key_context(), ctx);
        }
        let with_alpha = WatermarkOptions { alpha: Some(0.1), seed: None, ..base.clone() };
        assert_eq!(with_alpha.key_context(), ctx);
    }

    #[test]
    fn test_band_parsing() {
        assert_eq!("hl".parse::<SubBand>().unwrap(), SubBand::HL);
        assert_eq!("HH".parse::<SubBand>().unwrap(), SubBand::HH);
        assert!("LL".parse::<SubBand>().is_err());
    }

    #[test]
    fn test_capacity_math() {
        // "Hello, World!" is 13 bytes: (32 + 104) * 3
        assert_eq!(required_sites(13, 3), 408);
        assert_eq!(max_payload_bytes(16384, 3), 678);
        assert_eq!(max_payload_bytes(10, 1), 0);
        assert!(required_sites(max_payload_bytes(16384, 3), 3) <= 16384);
        assert!(required_sites(max_payload_bytes(16384, 3) + 1, 3) > 16384);
    }

    #[test]
    fn test_required_sites_saturates() {
        assert_eq!(required_sites(0, 1 << 59), usize::MAX);
        assert_eq!(required_sites(2, usize::MAX / 4), usize::MAX);
        assert_eq!(required_sites(usize::MAX, 1), usize::MAX);
        assert_eq!(max_payload_bytes(16384, usize::MAX), 0);
    }
}
