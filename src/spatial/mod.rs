//! Spatial data structures for image compression
//!
//! This module contains spatial-related functionality including:
//! - RGBA pixel storage with neutral out-of-bounds access
//! - Pixel claim tracking during the tile search
//! - Tile grid iteration and window placement rules
//! - Coarse block-average previews

/// Coarse block averaging
pub mod downsample;
/// Pixel claim tracking
pub mod occupancy;
/// RGBA pixel buffer
pub mod pixels;
/// Tile grid and overlap rules
pub mod tiles;

pub use occupancy::OccupancyMap;
pub use pixels::{Pixel, PixelBuffer, TRANSPARENT};
pub use tiles::{TileGrid, TileRect};
