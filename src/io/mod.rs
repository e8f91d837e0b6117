/// Command-line interface and batch processing
pub mod cli;
/// Codec constants and runtime defaults
pub mod configuration;
/// Error types and context management
pub mod error;
/// Transform log persistence
pub mod format;
/// Image file decoding and PNG export
pub mod image;
/// Progress tracking for batch operations
pub mod progress;
/// Replay animation export
pub mod visualization;
