use bitvec::prelude::*;
use std::fmt;

/// Per-pixel claim flags in source image coordinates
///
/// A pixel is claimed once a transform will synthesize it during
/// reconstruction. Claims are permanent: the map exposes no way to release one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyMap {
    bits: BitVec,
    width: usize,
    height: usize,
}

impl OccupancyMap {
    /// Create a map with every pixel unclaimed
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            bits: bitvec![0; width * height],
            width,
            height,
        }
    }

    /// Map width in pixels
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Map height in pixels
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Test whether a pixel is claimed
    ///
    /// Positions outside the map read as unclaimed
    pub fn is_claimed(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bits.get(y * self.width + x).as_deref() == Some(&true)
    }

    /// Test that no pixel of the rectangle is claimed
    pub fn is_region_unclaimed(&self, x: usize, y: usize, width: usize, height: usize) -> bool {
        (y..y + height).all(|row| {
            if row >= self.height {
                return true;
            }
            let start = row * self.width + x.min(self.width);
            let end = row * self.width + (x + width).min(self.width);
            self.bits.get(start..end).is_none_or(|span| span.not_any())
        })
    }

    /// Claim every pixel of a square tile, clipped to the map
    pub fn claim_tile(&mut self, x: usize, y: usize, size: usize) {
        for row in y..(y + size).min(self.height) {
            let start = row * self.width + x.min(self.width);
            let end = row * self.width + (x + size).min(self.width);
            if let Some(span) = self.bits.get_mut(start..end) {
                span.fill(true);
            }
        }
    }

    /// Count claimed pixels
    pub fn claimed_count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Fraction of pixels claimed, zero for an empty map
    pub fn claimed_ratio(&self) -> f64 {
        if self.bits.is_empty() {
            0.0
        } else {
            self.claimed_count() as f64 / self.bits.len() as f64
        }
    }
}

impl fmt::Display for OccupancyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OccupancyMap({}x{}, {} claimed)",
            self.width,
            self.height,
            self.claimed_count()
        )
    }
}
