//! Binary persistence of transform logs
//!
//! Layout, all integers little-endian:
//!
//! | field        | type      |
//! |--------------|-----------|
//! | magic        | `b"FTLG"` |
//! | version      | `u16`     |
//! | width        | `u32`     |
//! | height       | `u32`     |
//! | tile size    | `u32`     |
//! | scale rate   | `u32`     |
//! | record count | `u32`     |
//!
//! followed by `count` records of four `u32`: source x, source y, destination
//! x, destination y, in discovery order.

use std::path::Path;

use crate::algorithm::transform::{Transform, TransformLog};
use crate::io::error::{CodecError, Result, WithContext, malformed_log};

/// File signature
pub const MAGIC: &[u8; 4] = b"FTLG";
/// Current layout version
pub const FORMAT_VERSION: u16 = 1;

const HEADER_BYTES: usize = 4 + 2 + 4 * 5;
const RECORD_BYTES: usize = 4 * 4;

/// Geometry needed to replay a persisted log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogHeader {
    /// Source image width
    pub width: u32,
    /// Source image height
    pub height: u32,
    /// Destination tile side
    pub tile_size: u32,
    /// Source window scale factor
    pub scale_rate: u32,
}

impl LogHeader {
    // Checks that both rectangles of a transform lie inside the image
    fn contains(&self, transform: &Transform) -> bool {
        let tile = u64::from(self.tile_size);
        let window = tile * u64::from(self.scale_rate);
        let (width, height) = (u64::from(self.width), u64::from(self.height));

        u64::from(transform.dst_x) + tile <= width
            && u64::from(transform.dst_y) + tile <= height
            && u64::from(transform.source_x) + window <= width
            && u64::from(transform.source_y) + window <= height
    }
}

/// Serialize a header and log
///
/// # Errors
///
/// Returns an error if the log holds more records than a `u32` can count
pub fn encode_log(header: &LogHeader, log: &TransformLog) -> Result<Vec<u8>> {
    let count = u32::try_from(log.len())
        .ok()
        .ok_or_else(|| malformed_log(&format!("{} records exceed the format limit", log.len())))?;

    let mut bytes = Vec::with_capacity(HEADER_BYTES + log.len() * RECORD_BYTES);
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    for value in [
        header.width,
        header.height,
        header.tile_size,
        header.scale_rate,
        count,
    ] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }

    for transform in log {
        for value in [
            transform.source_x,
            transform.source_y,
            transform.dst_x,
            transform.dst_y,
        ] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }

    Ok(bytes)
}

/// Parse a serialized header and log
///
/// # Errors
///
/// Returns an error if:
/// - The signature or version is not recognized
/// - The data is truncated or has trailing bytes
/// - A record reaches outside the declared image
pub fn decode_log(bytes: &[u8]) -> Result<(LogHeader, TransformLog)> {
    let mut reader = ByteReader::new(bytes);

    if reader.take(MAGIC.len())? != MAGIC {
        return Err(malformed_log(&"missing FTLG signature"));
    }
    let version = reader.read_u16()?;
    if version != FORMAT_VERSION {
        return Err(malformed_log(&format!("unsupported version {version}")));
    }

    let header = LogHeader {
        width: reader.read_u32()?,
        height: reader.read_u32()?,
        tile_size: reader.read_u32()?,
        scale_rate: reader.read_u32()?,
    };
    if header.tile_size == 0 || header.scale_rate == 0 {
        return Err(malformed_log(&"tile size and scale rate must be nonzero"));
    }

    let count = reader.read_u32()? as usize;
    if reader.remaining() != count * RECORD_BYTES {
        return Err(malformed_log(&format!(
            "{count} records need {} bytes, found {}",
            count * RECORD_BYTES,
            reader.remaining()
        )));
    }

    let mut log = TransformLog::new();
    for index in 0..count {
        let transform = Transform::new(
            reader.read_u32()?,
            reader.read_u32()?,
            reader.read_u32()?,
            reader.read_u32()?,
        );
        if !header.contains(&transform) {
            return Err(malformed_log(&format!(
                "record {index} {transform} lies outside the {}x{} image",
                header.width, header.height
            )));
        }
        log.push(transform);
    }

    Ok((header, log))
}

/// Write a log file, creating parent directories
///
/// # Errors
///
/// Returns an error if encoding fails or the file cannot be written
pub fn write_log(path: &Path, header: &LogHeader, log: &TransformLog) -> Result<()> {
    let bytes = encode_log(header, log)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_path(parent)
            .with_operation("create directory")?;
    }

    std::fs::write(path, bytes)
        .with_path(path)
        .with_operation("write transform log")
}

/// Read a log file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is malformed
pub fn read_log(path: &Path) -> Result<(LogHeader, TransformLog)> {
    let bytes = std::fs::read(path)
        .with_path(path)
        .with_operation("read transform log")?;
    decode_log(&bytes).map_err(|e| match e {
        CodecError::MalformedLog { reason } => CodecError::MalformedLog {
            reason: format!("{}: {reason}", path.display()),
        },
        other => other,
    })
}

// Cursor over a byte slice that reports truncation as a malformed log
struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    const fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.position)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let chunk = self
            .bytes
            .get(self.position..self.position + len)
            .ok_or_else(|| malformed_log(&format!("truncated at byte {}", self.position)))?;
        self.position += len;
        Ok(chunk)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let chunk = self.take(2)?;
        let array = <[u8; 2]>::try_from(chunk)
            .ok()
            .ok_or_else(|| malformed_log(&"short u16"))?;
        Ok(u16::from_le_bytes(array))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let chunk = self.take(4)?;
        let array = <[u8; 4]>::try_from(chunk)
            .ok()
            .ok_or_else(|| malformed_log(&"short u32"))?;
        Ok(u32::from_le_bytes(array))
    }
}
