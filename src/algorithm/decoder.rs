//! Reconstruction by replaying transforms over the residual image
//!
//! Reconstruction writes into the same buffer it reads from. Transforms are
//! replayed last-discovered first: a source window only ever contains pixels
//! that were unclaimed when its transform was found, so any claimed pixel it
//! covers belongs to a later transform, and that transform has already been
//! replayed. Every source read is checked against the validity mask and a read
//! of a placeholder aborts the replay.

use bitvec::prelude::*;
use tracing::info;

use crate::algorithm::transform::{Transform, TransformLog};
use crate::io::configuration::MAX_TILE_SIZE;
use crate::io::error::{CodecError, Result, invalid_parameter};
use crate::spatial::occupancy::OccupancyMap;
use crate::spatial::pixels::{PixelBuffer, TRANSPARENT};

/// Residual pixels plus a mask of which pixels hold real data
///
/// Placeholder pixels are stored as [`TRANSPARENT`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidualImage {
    image: PixelBuffer,
    valid: BitVec,
}

impl ResidualImage {
    /// Keep the source pixels the occupancy map leaves unclaimed
    ///
    /// # Errors
    ///
    /// Returns an error if the map and image dimensions differ
    pub fn from_occupancy(source: &PixelBuffer, occupancy: &OccupancyMap) -> Result<Self> {
        if occupancy.width() != source.width() || occupancy.height() != source.height() {
            return Err(invalid_parameter(
                "occupancy",
                &format!("{}x{}", occupancy.width(), occupancy.height()),
                &format!("must match image {}x{}", source.width(), source.height()),
            ));
        }

        let mut image = PixelBuffer::new(source.width(), source.height());
        let mut valid = bitvec![0; source.width() * source.height()];
        for y in 0..source.height() {
            for x in 0..source.width() {
                if !occupancy.is_claimed(x, y) {
                    image.put_pixel(x, y, source.pixel(x, y));
                    valid.set(y * source.width() + x, true);
                }
            }
        }

        Ok(Self { image, valid })
    }

    /// Rebuild the validity mask of a residual read back from disk
    ///
    /// Placeholders are exactly the pixels inside a destination tile of the
    /// log. Pixel values alone cannot tell them apart, since unclaimed source
    /// pixels may be fully transparent too.
    pub fn from_log(mut image: PixelBuffer, log: &TransformLog, tile_size: usize) -> Self {
        let mut claimed = OccupancyMap::new(image.width(), image.height());
        for transform in log {
            claimed.claim_tile(transform.dst_x as usize, transform.dst_y as usize, tile_size);
        }

        let mut valid = bitvec![0; image.width() * image.height()];
        for y in 0..image.height() {
            for x in 0..image.width() {
                if claimed.is_claimed(x, y) {
                    image.put_pixel(x, y, TRANSPARENT);
                } else {
                    valid.set(y * image.width() + x, true);
                }
            }
        }
        Self { image, valid }
    }

    /// Residual pixels with placeholders fully transparent
    pub const fn image(&self) -> &PixelBuffer {
        &self.image
    }

    /// Test whether a pixel holds real data
    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        x < self.image.width()
            && y < self.image.height()
            && self.valid.get(y * self.image.width() + x).as_deref() == Some(&true)
    }

    /// Number of placeholder pixels
    pub fn placeholder_count(&self) -> usize {
        self.valid.count_zeros()
    }

    /// Consume the residual and return its pixels
    pub fn into_image(self) -> PixelBuffer {
        self.image
    }
}

/// Stateful replay over an evolving reconstruction
#[derive(Debug, Clone)]
pub struct Reconstructor {
    image: PixelBuffer,
    valid: BitVec,
    tile_size: usize,
    scale_rate: usize,
    applied: usize,
}

impl Reconstructor {
    /// Start a reconstruction from a residual image
    ///
    /// # Errors
    ///
    /// Returns an error if `tile_size` is outside `1..=256` or `scale_rate` is zero
    pub fn new(residual: &ResidualImage, tile_size: usize, scale_rate: usize) -> Result<Self> {
        if tile_size == 0 || tile_size > MAX_TILE_SIZE {
            return Err(invalid_parameter(
                "tile_size",
                &tile_size,
                &format!("must be between 1 and {MAX_TILE_SIZE}"),
            ));
        }
        if scale_rate == 0 {
            return Err(invalid_parameter(
                "scale_rate",
                &scale_rate,
                &"must be at least 1",
            ));
        }

        Ok(Self {
            image: residual.image.clone(),
            valid: residual.valid.clone(),
            tile_size,
            scale_rate,
            applied: 0,
        })
    }

    /// Apply one transform, tagging failures with its discovery index
    ///
    /// Each destination pixel becomes the per-channel integer mean of its
    /// `scale_rate x scale_rate` source block, read from the current state of
    /// the reconstruction. The destination is written row by row, so a
    /// transform whose window covers its own tile sees its earlier writes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::ReconstructionInvariant`] if a source pixel is
    /// still a placeholder. The reconstruction must not be used afterwards.
    pub fn apply(&mut self, index: usize, transform: &Transform) -> Result<()> {
        let block_area = (self.scale_rate * self.scale_rate) as u32;
        let source_x = transform.source_x as usize;
        let source_y = transform.source_y as usize;

        for w_row in 0..self.tile_size {
            for w_col in 0..self.tile_size {
                let block_x = source_x + w_col * self.scale_rate;
                let block_y = source_y + w_row * self.scale_rate;

                let mut sums = [0u32; 4];
                for i in 0..self.scale_rate {
                    for j in 0..self.scale_rate {
                        let x = block_x + i;
                        let y = block_y + j;
                        if !self.is_valid(x, y) {
                            return Err(CodecError::ReconstructionInvariant {
                                transform_index: index,
                                x,
                                y,
                            });
                        }
                        for (sum, channel) in sums.iter_mut().zip(self.image.pixel(x, y)) {
                            *sum += u32::from(channel);
                        }
                    }
                }

                let dst_x = transform.dst_x as usize + w_col;
                let dst_y = transform.dst_y as usize + w_row;
                self.image
                    .put_pixel(dst_x, dst_y, sums.map(|sum| (sum / block_area) as u8));
                self.mark_valid(dst_x, dst_y);
            }
        }

        self.applied += 1;
        Ok(())
    }

    /// Apply the next transform of the reverse replay
    ///
    /// Returns `Ok(false)` once every transform has been applied
    ///
    /// # Errors
    ///
    /// Returns an error if the transform reads a placeholder pixel
    pub fn step(&mut self, log: &TransformLog) -> Result<bool> {
        let Some(index) = log.len().checked_sub(self.applied + 1) else {
            return Ok(false);
        };
        match log.get(index) {
            Some(transform) => {
                self.apply(index, transform)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Apply every remaining transform in reverse discovery order
    ///
    /// # Errors
    ///
    /// Returns an error if any transform reads a placeholder pixel
    pub fn replay(&mut self, log: &TransformLog) -> Result<()> {
        while self.step(log)? {}
        Ok(())
    }

    /// Number of transforms applied so far
    pub const fn applied(&self) -> usize {
        self.applied
    }

    /// Test whether every pixel holds real data
    pub fn is_complete(&self) -> bool {
        self.valid.all()
    }

    /// Current state of the reconstruction
    pub const fn image(&self) -> &PixelBuffer {
        &self.image
    }

    /// Consume the reconstructor and return the image
    pub fn into_image(self) -> PixelBuffer {
        self.image
    }

    /// Test whether a pixel holds residual or reconstructed data
    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        x < self.image.width()
            && y < self.image.height()
            && self.valid.get(y * self.image.width() + x).as_deref() == Some(&true)
    }

    fn mark_valid(&mut self, x: usize, y: usize) {
        if x < self.image.width() && y < self.image.height() {
            self.valid.set(y * self.image.width() + x, true);
        }
    }
}

/// Rebuild the image from its residual and transform log
///
/// # Errors
///
/// Returns an error if the parameters are invalid or the replay reads a
/// placeholder pixel
pub fn decompress(
    residual: &ResidualImage,
    log: &TransformLog,
    tile_size: usize,
    scale_rate: usize,
) -> Result<PixelBuffer> {
    let mut reconstructor = Reconstructor::new(residual, tile_size, scale_rate)?;
    reconstructor.replay(log)?;

    info!(
        transforms = log.len(),
        complete = reconstructor.is_complete(),
        "Decompression finished"
    );

    Ok(reconstructor.into_image())
}
