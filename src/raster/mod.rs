use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;

use crate::config::{CHANNEL_COUNT, MAX_SAMPLE};
use crate::transform::{DwtError, Matrix};

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("channel {0} does not exist")]
    NoSuchChannel(usize),
    #[error("channel is {got_rows}x{got_cols}, image is {rows}x{cols}")]
    ChannelShape {
        rows: usize,
        cols: usize,
        got_rows: usize,
        got_cols: usize,
    },
    #[error(transparent)]
    Shape(#[from] DwtError),
}

/// Decoded image held as planar colour channels.
///
/// Each channel is a `height x width` matrix of samples in `[0, 255]`.
/// Alpha is carried through untouched.
#[derive(Debug, Clone)]
pub struct RasterImage {
    width: u32,
    height: u32,
    channels: [Matrix; CHANNEL_COUNT],
    alpha: Vec<u8>,
}

impl RasterImage {
    /// Split interleaved RGBA8 pixels into planes.
    pub fn from_rgba(img: &RgbaImage) -> Result<Self, RasterError> {
        let (width, height) = img.dimensions();
        let len = width as usize * height as usize;
        let mut planes: [Vec<f64>; CHANNEL_COUNT] =
            std::array::from_fn(|_| Vec::with_capacity(len));
        let mut alpha = Vec::with_capacity(len);

        for px in img.pixels() {
            for (plane, &sample) in planes.iter_mut().zip(px.0.iter()) {
                plane.push(f64::from(sample));
            }
            alpha.push(px.0[3]);
        }

        let [r, g, b] = planes;
        let (rows, cols) = (height as usize, width as usize);
        Ok(Self {
            width,
            height,
            channels: [
                Matrix::from_vec(rows, cols, r)?,
                Matrix::from_vec(rows, cols, g)?,
                Matrix::from_vec(rows, cols, b)?,
            ],
            alpha,
        })
    }

    /// Interleave the planes back into RGBA8, rounding and clamping samples.
    pub fn to_rgba(&self) -> RgbaImage {
        let mut img = RgbaImage::new(self.width, self.height);
        for (i, px) in img.pixels_mut().enumerate() {
            for (c, channel) in self.channels.iter().enumerate() {
                px.0[c] = to_sample(channel.as_slice()[i]);
            }
            px.0[3] = self.alpha[i];
        }
        img
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channel(&self, index: usize) -> Result<&Matrix, RasterError> {
        self.channels.get(index).ok_or(RasterError::NoSuchChannel(index))
    }

    /// Swap in a processed channel. Its shape must match the image.
    pub fn replace_channel(&mut self, index: usize, channel: Matrix) -> Result<(), RasterError> {
        let (rows, cols) = (self.height as usize, self.width as usize);
        if channel.rows() != rows || channel.cols() != cols {
            return Err(RasterError::ChannelShape {
                rows,
                cols,
                got_rows: channel.rows(),
                got_cols: channel.cols(),
            });
        }
        let slot = self
            .channels
            .get_mut(index)
            .ok_or(RasterError::NoSuchChannel(index))?;
        *slot = channel;
        Ok(())
    }
}

fn to_sample(value: f64) -> u8 {
    value.round().clamp(0.0, MAX_SAMPLE) as u8
}

/// Decode any container the `image` crate recognises.
pub fn decode(bytes: &[u8]) -> Result<RasterImage, RasterError> {
    let img = image::load_from_memory(bytes).map_err(RasterError::Decode)?;
    RasterImage::from_rgba(&img.to_rgba8())
}

/// Encode as PNG. Lossy containers would destroy the embedded lattice.
pub fn encode(raster: &RasterImage) -> Result<Vec<u8>, RasterError> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(raster.to_rgba())
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(RasterError::Encode)?;
    Ok(buf)
}
