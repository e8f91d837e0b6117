//! Brute-force search for a self-similar source window
//!
//! For one destination tile, every window of twice the tile's side that lies
//! inside the image, stays clear of the tile under the inclusive overlap rule
//! and contains no claimed pixel is compared against the tile. Each tile pixel
//! is compared with all four pixels of the 2x2 source block that downsamples to
//! it, without averaging the block first, and the squared differences of all
//! channels are summed.

use crate::io::configuration::{MAX_TILE_SIZE, SCALE_RATE};
use crate::io::error::{CodecError, Result, invalid_parameter};
use crate::spatial::occupancy::OccupancyMap;
use crate::spatial::pixels::PixelBuffer;
use crate::spatial::tiles::TileRect;

const CHANNELS: usize = 4;

/// Accepted source window for a destination tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Left column of the source window
    pub source_x: usize,
    /// Top row of the source window
    pub source_y: usize,
    /// Summed squared channel error between tile and window
    pub error: u64,
}

// Outcome of scoring one candidate window
enum Candidate {
    Rejected,
    Accepted(u64),
}

/// Tile matcher with a reusable scratch buffer sized to its tile
///
/// The scratch buffer holds the negated channels of the current destination
/// tile so the inner loop computes `src - dst` with a single addition.
#[derive(Debug, Clone)]
pub struct Matcher {
    tile_size: usize,
    tolerance: u32,
    tolerance_sq: u64,
    scratch: Vec<i32>,
}

impl Matcher {
    /// Create a matcher for tiles of `tile_size` pixels
    ///
    /// # Errors
    ///
    /// Returns an error if `tile_size` is zero or exceeds [`MAX_TILE_SIZE`]
    pub fn new(tile_size: usize, tolerance: u32) -> Result<Self> {
        if tile_size == 0 || tile_size > MAX_TILE_SIZE {
            return Err(invalid_parameter(
                "tile_size",
                &tile_size,
                &format!("must be between 1 and {MAX_TILE_SIZE}"),
            ));
        }

        Ok(Self {
            tile_size,
            tolerance,
            tolerance_sq: u64::from(tolerance) * u64::from(tolerance),
            scratch: vec![0; tile_size * tile_size * CHANNELS],
        })
    }

    /// Tile side length this matcher searches for
    pub const fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Match tolerance
    pub const fn tolerance(&self) -> u32 {
        self.tolerance
    }

    /// Side length of candidate source windows
    pub const fn window_size(&self) -> usize {
        self.tile_size * SCALE_RATE
    }

    /// Search the image for the best source window of the tile at `(tile_x, tile_y)`
    ///
    /// Returns `Ok(None)` when the tile already holds a claimed pixel or when no
    /// candidate is within `tolerance²`; the occupancy map is then untouched.
    /// On success the whole tile is claimed. Ties keep the topmost, then
    /// leftmost, candidate.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The tile does not lie fully inside the image
    /// - The occupancy map dimensions differ from the image
    pub fn find_transform(
        &mut self,
        tile_x: usize,
        tile_y: usize,
        image: &PixelBuffer,
        occupancy: &mut OccupancyMap,
    ) -> Result<Option<Match>> {
        let tile = TileRect::new(tile_x, tile_y, self.tile_size);
        self.check_preconditions(&tile, image, occupancy)?;

        if !occupancy.is_region_unclaimed(tile.x, tile.y, tile.size, tile.size) {
            return Ok(None);
        }
        self.load_tile(&tile, image);

        let window_size = self.window_size();
        if window_size > image.width() || window_size > image.height() {
            return Ok(None);
        }

        let mut best: Option<Match> = None;
        for src_row in 0..=image.height() - window_size {
            for src_col in 0..=image.width() - window_size {
                if tile.overlaps_inclusive(src_col, src_row, window_size) {
                    continue;
                }

                let best_norm = best.map_or(u64::MAX, |m| m.error);
                if let Candidate::Accepted(norm) =
                    self.evaluate(src_col, src_row, image, occupancy, best_norm)
                {
                    best = Some(Match {
                        source_x: src_col,
                        source_y: src_row,
                        error: norm,
                    });
                }
            }
        }

        match best {
            Some(found) if found.error <= self.tolerance_sq => {
                occupancy.claim_tile(tile.x, tile.y, tile.size);
                Ok(Some(found))
            }
            _ => Ok(None),
        }
    }

    fn check_preconditions(
        &self,
        tile: &TileRect,
        image: &PixelBuffer,
        occupancy: &OccupancyMap,
    ) -> Result<()> {
        if !tile.fits_within(image.width(), image.height()) {
            return Err(CodecError::TileOutOfBounds {
                tile_x: tile.x,
                tile_y: tile.y,
                tile_size: self.tile_size,
                image_dimensions: (image.width(), image.height()),
            });
        }

        if occupancy.width() != image.width() || occupancy.height() != image.height() {
            return Err(invalid_parameter(
                "occupancy",
                &format!("{}x{}", occupancy.width(), occupancy.height()),
                &format!("must match image {}x{}", image.width(), image.height()),
            ));
        }

        Ok(())
    }

    // Fills the scratch buffer with negated tile channels
    fn load_tile(&mut self, tile: &TileRect, image: &PixelBuffer) {
        for w_row in 0..tile.size {
            for w_col in 0..tile.size {
                let base = (w_row * tile.size + w_col) * CHANNELS;
                if let Some(slot) = self.scratch.get_mut(base..base + CHANNELS) {
                    let pixel = image.pixel(tile.x + w_col, tile.y + w_row);
                    for (negated, channel) in slot.iter_mut().zip(pixel) {
                        *negated = -i32::from(channel);
                    }
                }
            }
        }
    }

    // Any claimed pixel or a running norm past the tolerance or the best so far
    // rejects the window on the spot
    fn evaluate(
        &self,
        src_x: usize,
        src_y: usize,
        image: &PixelBuffer,
        occupancy: &OccupancyMap,
        best_norm: u64,
    ) -> Candidate {
        let window_size = self.window_size();
        let mut norm = 0u64;

        for win_row in 0..window_size {
            let y = src_y + win_row;
            let dst_row = win_row / SCALE_RATE;
            for win_col in 0..window_size {
                let x = src_x + win_col;
                if occupancy.is_claimed(x, y) {
                    return Candidate::Rejected;
                }

                let base = (dst_row * self.tile_size + win_col / SCALE_RATE) * CHANNELS;
                let Some(negated) = self.scratch.get(base..base + CHANNELS) else {
                    return Candidate::Rejected;
                };
                for (&dst, src) in negated.iter().zip(image.pixel(x, y)) {
                    let diff = dst + i32::from(src);
                    norm += (diff * diff) as u64;
                }

                if norm > self.tolerance_sq || norm >= best_norm {
                    return Candidate::Rejected;
                }
            }
        }

        Candidate::Accepted(norm)
    }
}

/// Search for the best source window of one destination tile
///
/// Convenience wrapper allocating a [`Matcher`] for a single search. Returns the
/// source window's top-left corner and its error on success.
///
/// # Errors
///
/// Returns an error if `tile_size` is outside `1..=256`, the tile does not lie
/// inside the image or the occupancy map dimensions differ from the image
pub fn find_transform(
    tile_x: usize,
    tile_y: usize,
    tile_size: usize,
    image: &PixelBuffer,
    occupancy: &mut OccupancyMap,
    tolerance: u32,
) -> Result<Option<Match>> {
    Matcher::new(tile_size, tolerance)?.find_transform(tile_x, tile_y, image, occupancy)
}
