//! Tile-by-tile encoding driven by a compression session
//!
//! The session walks the tile grid in raster order, asks the matcher for a
//! source window per tile and records every accepted match in the transform
//! log. Tiles without a match keep their pixels in the residual image.

use tracing::{debug, info};

use crate::algorithm::decoder::ResidualImage;
use crate::algorithm::matcher::Matcher;
use crate::algorithm::transform::{Transform, TransformLog};
use crate::io::configuration::{DEFAULT_TILE_SIZE, DEFAULT_TOLERANCE};
use crate::io::error::{Result, invalid_parameter};
use crate::spatial::occupancy::OccupancyMap;
use crate::spatial::pixels::PixelBuffer;
use crate::spatial::tiles::TileGrid;

/// Encoding parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressionConfig {
    /// Side length of destination tiles
    pub tile_size: usize,
    /// Maximum accepted error, compared as `tolerance²` against the summed squared error
    pub tolerance: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Result of processing a single tile
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The tile was claimed by a new transform
    Claimed(Transform),
    /// No source window matched within tolerance
    Unmatched {
        /// Tile origin column
        tile_x: usize,
        /// Tile origin row
        tile_y: usize,
    },
    /// Every tile has been processed
    Finished,
}

/// Owns the state of one compression run
///
/// Holds the source image, the claim map and the transform log, and can be
/// advanced one tile at a time so callers can report progress or animate
/// discovery.
#[derive(Debug, Clone)]
pub struct CompressionSession {
    config: CompressionConfig,
    source: PixelBuffer,
    occupancy: OccupancyMap,
    log: TransformLog,
    matcher: Matcher,
    grid: TileGrid,
}

impl CompressionSession {
    /// Start a session over a source image
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The tile size is zero or larger than the matcher supports
    /// - The image is smaller than one tile
    pub fn new(source: PixelBuffer, config: CompressionConfig) -> Result<Self> {
        let matcher = Matcher::new(config.tile_size, config.tolerance)?;

        if source.width() < config.tile_size || source.height() < config.tile_size {
            return Err(invalid_parameter(
                "tile_size",
                &config.tile_size,
                &format!(
                    "image {}x{} holds no whole tile",
                    source.width(),
                    source.height()
                ),
            ));
        }

        let occupancy = OccupancyMap::new(source.width(), source.height());
        let grid = TileGrid::new(source.width(), source.height(), config.tile_size);

        Ok(Self {
            config,
            source,
            occupancy,
            log: TransformLog::new(),
            matcher,
            grid,
        })
    }

    /// Process the next tile in raster order
    ///
    /// # Errors
    ///
    /// Returns an error if the matcher rejects its preconditions
    pub fn step(&mut self) -> Result<StepOutcome> {
        let Some(tile) = self.grid.next() else {
            return Ok(StepOutcome::Finished);
        };

        let found =
            self.matcher
                .find_transform(tile.x, tile.y, &self.source, &mut self.occupancy)?;

        let outcome = match found {
            Some(found) => {
                let transform = Transform::new(
                    found.source_x as u32,
                    found.source_y as u32,
                    tile.x as u32,
                    tile.y as u32,
                );
                debug!(
                    tile_x = tile.x,
                    tile_y = tile.y,
                    source_x = found.source_x,
                    source_y = found.source_y,
                    error = found.error,
                    "Transform found"
                );
                self.log.push(transform);
                StepOutcome::Claimed(transform)
            }
            None => StepOutcome::Unmatched {
                tile_x: tile.x,
                tile_y: tile.y,
            },
        };

        if self.is_finished() {
            self.log_summary();
        }

        Ok(outcome)
    }

    /// Process every remaining tile
    ///
    /// # Errors
    ///
    /// Returns an error if any tile search fails its preconditions
    pub fn run(&mut self) -> Result<()> {
        while self.step()? != StepOutcome::Finished {}
        Ok(())
    }

    /// Test whether every tile has been processed
    pub fn is_finished(&self) -> bool {
        self.grid.len() == 0
    }

    /// Number of whole tiles in the image
    pub const fn tiles_total(&self) -> usize {
        self.grid.tile_count()
    }

    /// Number of tiles processed so far
    pub const fn tiles_processed(&self) -> usize {
        self.grid.position()
    }

    /// Build the residual image from the current claims
    ///
    /// # Errors
    ///
    /// Returns an error if the claim map no longer matches the source dimensions
    pub fn residual(&self) -> Result<ResidualImage> {
        ResidualImage::from_occupancy(&self.source, &self.occupancy)
    }

    /// Encoding parameters
    pub const fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Source image
    pub const fn source(&self) -> &PixelBuffer {
        &self.source
    }

    /// Current claim map
    pub const fn occupancy(&self) -> &OccupancyMap {
        &self.occupancy
    }

    /// Transforms discovered so far
    pub const fn log(&self) -> &TransformLog {
        &self.log
    }

    /// Consume the session, returning the transform log and claim map
    pub fn into_parts(self) -> (TransformLog, OccupancyMap) {
        (self.log, self.occupancy)
    }

    fn log_summary(&self) {
        info!(
            transforms = self.log.len(),
            tiles = self.tiles_total(),
            claimed_pixels = self.occupancy.claimed_count(),
            "Compression finished"
        );
    }
}

/// Encode an image into a residual image and a transform log
///
/// # Errors
///
/// Returns an error if the tile size is invalid for the image
pub fn compress(
    image: &PixelBuffer,
    tile_size: usize,
    tolerance: u32,
) -> Result<(ResidualImage, TransformLog)> {
    let mut session = CompressionSession::new(
        image.clone(),
        CompressionConfig {
            tile_size,
            tolerance,
        },
    )?;
    session.run()?;
    let residual = session.residual()?;
    let (log, _) = session.into_parts();
    Ok((residual, log))
}
