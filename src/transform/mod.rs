pub mod haar;
pub mod matrix;

use thiserror::Error;

pub use haar::{forward, inverse, SubBands};
pub use matrix::Matrix;

#[derive(Error, Debug, PartialEq)]
pub enum DwtError {
    #[error("odd dimensions are not supported (rows={rows}, cols={cols})")]
    OddDimensions { rows: usize, cols: usize },
    #[error("sub-band shapes differ: {0}")]
    ShapeMismatch(String),
    #[error("matrix data length {len} does not match {rows}x{cols}")]
    BadShape { rows: usize, cols: usize, len: usize },
}
