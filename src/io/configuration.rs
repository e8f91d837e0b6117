//! Codec constants and runtime configuration defaults

/// Linear downsampling factor between a source window and its tile
pub const SCALE_RATE: usize = 2;

/// Largest supported tile side, bounding the matcher scratch buffer
pub const MAX_TILE_SIZE: usize = 256;

// Default values for configurable parameters
/// Default tile side length in pixels
pub const DEFAULT_TILE_SIZE: usize = 8;

/// Default match tolerance, compared against the summed squared error as `tolerance²`
pub const DEFAULT_TOLERANCE: u32 = 800;

/// Default block size of the coarse preview
pub const DEFAULT_BLOCK_SIZE: usize = 8;

// Output settings
/// Suffix of the reconstructed image
pub const DECODED_SUFFIX: &str = "_decoded";
/// Suffix of the residual image
pub const RESIDUAL_SUFFIX: &str = "_residual";
/// Suffix of the coarse preview image
pub const PREVIEW_SUFFIX: &str = "_preview";
/// Suffix of the replay animation
pub const REPLAY_SUFFIX: &str = "_replay";
/// Extension of persisted transform logs
pub const LOG_EXTENSION: &str = "ftl";
/// Input extensions accepted for encoding
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Color painted over claimed tiles during the compression phase of the replay
pub const CLAIMED_TILE_COLOR: [u8; 4] = [245, 245, 245, 255];
/// Delay between GIF animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 20;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 50;
/// Multiplier applied to the delay of the held final frame
pub const FINAL_FRAME_HOLD: u32 = 25;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;
