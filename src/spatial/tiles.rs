//! Uniform tile grid and window placement rules
//!
//! The image is split into square tiles of a fixed side. Tiles that would cross
//! the right or bottom edge are never formed, so those trailing pixels always
//! stay in the residual image.

/// Square region of the image in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRect {
    /// Left column
    pub x: usize,
    /// Top row
    pub y: usize,
    /// Side length
    pub size: usize,
}

impl TileRect {
    /// Create a tile rectangle
    pub const fn new(x: usize, y: usize, size: usize) -> Self {
        Self { x, y, size }
    }

    /// Check that the tile lies fully inside a `width x height` image
    pub const fn fits_within(&self, width: usize, height: usize) -> bool {
        self.x + self.size <= width && self.y + self.size <= height
    }

    /// Check whether a square window touches this tile
    ///
    /// Edges are compared inclusively, so a window that merely abuts the tile
    /// (or sits one pixel away on the far side) counts as overlapping. This
    /// rejects some disjoint placements; the encoder depends on exactly this
    /// rule.
    pub const fn overlaps_inclusive(
        &self,
        window_x: usize,
        window_y: usize,
        window_size: usize,
    ) -> bool {
        self.y <= window_y + window_size
            && window_y <= self.y + self.size
            && self.x <= window_x + window_size
            && window_x <= self.x + self.size
    }

    /// Check whether two tiles share at least one pixel
    pub const fn intersects(&self, other: &Self) -> bool {
        self.x < other.x + other.size
            && other.x < self.x + self.size
            && self.y < other.y + other.size
            && other.y < self.y + self.size
    }
}

/// Raster-order iterator over whole tiles of an image
#[derive(Debug, Clone)]
pub struct TileGrid {
    columns: usize,
    rows: usize,
    tile_size: usize,
    next: usize,
}

impl TileGrid {
    /// Create a grid of `tile_size` tiles over a `width x height` image
    ///
    /// A zero tile size yields an empty grid
    pub const fn new(width: usize, height: usize, tile_size: usize) -> Self {
        let (columns, rows) = if tile_size == 0 {
            (0, 0)
        } else {
            (width / tile_size, height / tile_size)
        };
        Self {
            columns,
            rows,
            tile_size,
            next: 0,
        }
    }

    /// Total number of whole tiles
    pub const fn tile_count(&self) -> usize {
        self.columns * self.rows
    }

    /// Number of tiles already yielded
    pub const fn position(&self) -> usize {
        self.next
    }
}

impl Iterator for TileGrid {
    type Item = TileRect;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.tile_count() {
            return None;
        }
        let row = self.next / self.columns;
        let col = self.next % self.columns;
        self.next += 1;
        Some(TileRect::new(
            col * self.tile_size,
            row * self.tile_size,
            self.tile_size,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.tile_count().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileGrid {}
