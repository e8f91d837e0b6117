//! Fractal image compression through self-similar tile search
//!
//! An image is partitioned into fixed-size tiles. Each tile is matched against the
//! rest of the image at twice its linear scale, and every accepted match becomes a
//! transform that can regenerate the tile from its downsampled source window. The
//! pixels no transform claims form the residual image, and reconstruction replays
//! the transforms over that residual in reverse discovery order.

#![forbid(unsafe_code)]

/// Tile search, encoding, decoding and the transform log
pub mod algorithm;
/// Quality measurements comparing source and reconstruction
pub mod analysis;
/// Input/output operations, configuration and error handling
pub mod io;
/// Pixel storage, occupancy tracking and tile grid utilities
pub mod spatial;

pub use io::error::{CodecError, Result};
