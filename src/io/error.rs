//! Error types and context management for compression operations

use std::fmt;
use std::path::{Path, PathBuf};

/// Main error type for all compression operations
///
/// A tile without an acceptable match is not an error: the matcher reports it
/// as `Ok(None)` and the tile stays in the residual image.
#[derive(Debug)]
pub enum CodecError {
    /// Failed to load source image from filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Source data doesn't meet codec requirements
    InvalidSourceData {
        /// Description of what's wrong with the source data
        reason: String,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Destination tile does not lie fully inside the image
    TileOutOfBounds {
        /// Tile origin column
        tile_x: usize,
        /// Tile origin row
        tile_y: usize,
        /// Tile side length
        tile_size: usize,
        /// Image dimensions (width, height)
        image_dimensions: (usize, usize),
    },

    /// A transform read a pixel that had not been reconstructed yet
    ///
    /// Encoder and decoder are consistent by construction, so this signals a
    /// defect in claim tracking or replay order rather than bad input.
    ReconstructionInvariant {
        /// Index of the offending transform in discovery order
        transform_index: usize,
        /// Column of the placeholder pixel
        x: usize,
        /// Row of the placeholder pixel
        y: usize,
    },

    /// Persisted transform log could not be decoded
    MalformedLog {
        /// Description of the defect
        reason: String,
    },

    /// Failed to save an image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::TileOutOfBounds {
                tile_x,
                tile_y,
                tile_size,
                image_dimensions,
            } => {
                write!(
                    f,
                    "Tile at ({tile_x}, {tile_y}) of size {tile_size} exceeds image {}x{}",
                    image_dimensions.0, image_dimensions.1
                )
            }
            Self::ReconstructionInvariant {
                transform_index,
                x,
                y,
            } => {
                write!(
                    f,
                    "Transform {transform_index} read unreconstructed pixel ({x}, {y})"
                )
            }
            Self::MalformedLog { reason } => {
                write!(f, "Malformed transform log: {reason}")
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for codec results
pub type Result<T> = std::result::Result<T, CodecError>;

/// Attaches file context to errors produced through `From` conversions
pub trait WithContext<T> {
    /// Replace the placeholder path of I/O and image errors
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path applied
    fn with_path(self, path: &Path) -> Result<T>;

    /// Replace the placeholder operation of file system errors
    ///
    /// # Errors
    ///
    /// Propagates the original error with the operation applied
    fn with_operation(self, operation: &'static str) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<CodecError>,
{
    fn with_path(self, path: &Path) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            match &mut error {
                CodecError::ImageLoad { path: p, .. }
                | CodecError::ImageExport { path: p, .. }
                | CodecError::FileSystem { path: p, .. } => *p = path.to_path_buf(),
                _ => {}
            }
            error
        })
    }

    fn with_operation(self, operation: &'static str) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            if let CodecError::FileSystem { operation: op, .. } = &mut error {
                *op = operation;
            }
            error
        })
    }
}

impl From<image::ImageError> for CodecError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> CodecError {
    CodecError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a malformed log error
pub fn malformed_log(reason: &impl ToString) -> CodecError {
    CodecError::MalformedLog {
        reason: reason.to_string(),
    }
}

/// Create a path validation error for CLI targets
pub fn io_error(msg: &str) -> CodecError {
    CodecError::InvalidParameter {
        parameter: "path",
        value: String::new(),
        reason: msg.to_string(),
    }
}
