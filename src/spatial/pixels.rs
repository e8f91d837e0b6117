//! RGBA pixel storage with silent out-of-bounds handling
//!
//! Reads outside the image yield fully transparent black and writes outside the
//! image are ignored. Windowed comparisons near the edges rely on this: a
//! transparent read can never pass for real data.

use ndarray::{Array3, ArrayView3};

use crate::io::error::{CodecError, Result};

/// Four 8-bit channels in R, G, B, A order
pub type Pixel = [u8; 4];

/// Value returned for every out-of-bounds read, also used as the placeholder of
/// claimed pixels in residual images
pub const TRANSPARENT: Pixel = [0, 0, 0, 0];

const CHANNELS: usize = 4;

/// Owned RGBA image with a flat `width * height * 4` byte layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Array3<u8>,
    width: usize,
    height: usize,
}

impl PixelBuffer {
    /// Create a fully transparent image
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: Array3::zeros((height, width, CHANNELS)),
            width,
            height,
        }
    }

    /// Create an image with every pixel set to `pixel`
    pub fn filled(width: usize, height: usize, pixel: Pixel) -> Self {
        let data = Array3::from_shape_fn((height, width, CHANNELS), |(_, _, c)| {
            pixel.get(c).copied().unwrap_or(0)
        });
        Self {
            data,
            width,
            height,
        }
    }

    /// Wrap raw RGBA bytes in row-major order
    ///
    /// # Errors
    ///
    /// Returns an error if the byte count is not exactly `width * height * 4`
    pub fn from_raw(width: usize, height: usize, bytes: Vec<u8>) -> Result<Self> {
        let expected = width * height * CHANNELS;
        if bytes.len() != expected {
            return Err(CodecError::InvalidSourceData {
                reason: format!(
                    "{}x{} image needs {expected} bytes, got {}",
                    width,
                    height,
                    bytes.len()
                ),
            });
        }

        let data = Array3::from_shape_vec((height, width, CHANNELS), bytes).map_err(|e| {
            CodecError::InvalidSourceData {
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Image width in pixels
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Read a pixel using signed coordinates
    pub fn get(&self, x: i64, y: i64) -> Pixel {
        match (usize::try_from(x), usize::try_from(y)) {
            (Ok(col), Ok(row)) => self.pixel(col, row),
            _ => TRANSPARENT,
        }
    }

    /// Write a pixel using signed coordinates
    pub fn set(&mut self, x: i64, y: i64, pixel: Pixel) {
        if let (Ok(col), Ok(row)) = (usize::try_from(x), usize::try_from(y)) {
            self.put_pixel(col, row, pixel);
        }
    }

    /// Read a pixel; out of bounds reads return [`TRANSPARENT`]
    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        let Some(start) = self.offset(x, y) else {
            return TRANSPARENT;
        };
        self.as_raw()
            .get(start..start + CHANNELS)
            .and_then(|bytes| Pixel::try_from(bytes).ok())
            .unwrap_or(TRANSPARENT)
    }

    /// Overwrite a pixel in place; out of bounds writes are ignored
    pub fn put_pixel(&mut self, x: usize, y: usize, pixel: Pixel) {
        let Some(start) = self.offset(x, y) else {
            return;
        };
        if let Some(bytes) = self
            .data
            .as_slice_mut()
            .and_then(|raw| raw.get_mut(start..start + CHANNELS))
        {
            bytes.copy_from_slice(&pixel);
        }
    }

    /// Raw RGBA bytes in row-major order
    pub fn as_raw(&self) -> &[u8] {
        self.data.as_slice().unwrap_or(&[])
    }

    /// Consume the buffer and return its raw RGBA bytes
    pub fn into_raw(self) -> Vec<u8> {
        self.data.into_raw_vec_and_offset().0
    }

    /// Array view indexed by `(row, col, channel)`
    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// FNV-1a hash of the raw bytes, sensitive to byte order
    pub fn checksum(&self) -> u64 {
        self.as_raw()
            .iter()
            .fold(0xcbf2_9ce4_8422_2325, |hash, &byte| {
                (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
            })
    }

    /// Convert to gray by averaging the color channels, keeping alpha
    #[must_use]
    pub fn to_grayscale(&self) -> Self {
        let mut gray = self.clone();
        for y in 0..self.height {
            for x in 0..self.width {
                let [r, g, b, a] = self.pixel(x, y);
                let luma = ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8;
                gray.put_pixel(x, y, [luma, luma, luma, a]);
            }
        }
        gray
    }

    const fn offset(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y * self.width + x) * CHANNELS)
        } else {
            None
        }
    }
}
