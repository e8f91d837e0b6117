//! Reconstruction error and coverage statistics

use ndarray::Zip;

use crate::algorithm::transform::TransformLog;
use crate::io::error::{CodecError, Result};
use crate::spatial::occupancy::OccupancyMap;
use crate::spatial::pixels::PixelBuffer;

// Four little-endian u32 per persisted transform record
const TRANSFORM_RECORD_BYTES: usize = 16;
const CHANNELS: usize = 4;

/// Summary of how well a reconstruction matches its source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityReport {
    /// Mean squared error over every channel of every pixel
    pub mse: f64,
    /// Peak signal-to-noise ratio in decibels, infinite for identical images
    pub psnr: f64,
    /// Number of transforms in the log
    pub transform_count: usize,
    /// Fraction of pixels synthesized by transforms
    pub claimed_ratio: f64,
    /// Unclaimed pixels whose reconstruction differs from the source
    pub altered_preserved_pixels: usize,
    /// Raw image bytes divided by residual plus transform bytes
    pub compression_ratio: f64,
}

impl QualityReport {
    /// Compare a reconstruction against its source
    ///
    /// # Errors
    ///
    /// Returns an error if the images or the occupancy map differ in size
    pub fn measure(
        source: &PixelBuffer,
        reconstructed: &PixelBuffer,
        occupancy: &OccupancyMap,
        log: &TransformLog,
    ) -> Result<Self> {
        let dims = (source.width(), source.height());
        if (reconstructed.width(), reconstructed.height()) != dims
            || (occupancy.width(), occupancy.height()) != dims
        {
            return Err(CodecError::InvalidSourceData {
                reason: format!(
                    "cannot compare {}x{} source with {}x{} reconstruction",
                    dims.0,
                    dims.1,
                    reconstructed.width(),
                    reconstructed.height()
                ),
            });
        }

        let mut squared_error = 0.0;
        Zip::from(source.view())
            .and(reconstructed.view())
            .for_each(|&a, &b| {
                let diff = f64::from(a) - f64::from(b);
                squared_error += diff * diff;
            });

        let sample_count = source.as_raw().len();
        let mse = if sample_count == 0 {
            0.0
        } else {
            squared_error / sample_count as f64
        };

        let mut altered_preserved_pixels = 0;
        for y in 0..source.height() {
            for x in 0..source.width() {
                if !occupancy.is_claimed(x, y) && source.pixel(x, y) != reconstructed.pixel(x, y)
                {
                    altered_preserved_pixels += 1;
                }
            }
        }

        let residual_bytes = (sample_count / CHANNELS - occupancy.claimed_count()) * CHANNELS;
        let encoded_bytes = residual_bytes + log.len() * TRANSFORM_RECORD_BYTES;
        let compression_ratio = if encoded_bytes == 0 {
            0.0
        } else {
            sample_count as f64 / encoded_bytes as f64
        };

        Ok(Self {
            mse,
            psnr: psnr(mse),
            transform_count: log.len(),
            claimed_ratio: occupancy.claimed_ratio(),
            altered_preserved_pixels,
            compression_ratio,
        })
    }
}

/// Peak signal-to-noise ratio for 8-bit samples
pub fn psnr(mse: f64) -> f64 {
    if mse <= 0.0 {
        f64::INFINITY
    } else {
        10.0 * (255.0 * 255.0 / mse).log10()
    }
}
