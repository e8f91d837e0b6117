use std::fmt;

use crate::spatial::tiles::TileRect;

/// Self-similarity mapping from a source window onto a destination tile
///
/// The source window is `tile_size * scale_rate` pixels on each side and is
/// downsampled onto the `tile_size` destination tile. All coordinates are
/// top-left corners in source image space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transform {
    /// Left column of the source window
    pub source_x: u32,
    /// Top row of the source window
    pub source_y: u32,
    /// Left column of the destination tile
    pub dst_x: u32,
    /// Top row of the destination tile
    pub dst_y: u32,
}

impl Transform {
    /// Create a transform
    pub const fn new(source_x: u32, source_y: u32, dst_x: u32, dst_y: u32) -> Self {
        Self {
            source_x,
            source_y,
            dst_x,
            dst_y,
        }
    }

    /// Destination tile as a rectangle
    pub const fn destination(&self, tile_size: usize) -> TileRect {
        TileRect::new(self.dst_x as usize, self.dst_y as usize, tile_size)
    }

    /// Source window as a rectangle
    pub const fn source(&self, tile_size: usize, scale_rate: usize) -> TileRect {
        TileRect::new(
            self.source_x as usize,
            self.source_y as usize,
            tile_size * scale_rate,
        )
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) -> ({}, {})",
            self.source_x, self.source_y, self.dst_x, self.dst_y
        )
    }
}

/// Transforms in discovery order
///
/// Append-only while encoding. Reconstruction walks it back to front, see
/// [`TransformLog::iter_replay`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransformLog {
    transforms: Vec<Transform>,
}

impl TransformLog {
    /// Create an empty log
    pub const fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// Append a newly discovered transform
    pub fn push(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }

    /// Number of transforms
    pub const fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Test whether no transform was recorded
    pub const fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Transform at a discovery index
    pub fn get(&self, index: usize) -> Option<&Transform> {
        self.transforms.get(index)
    }

    /// Iterate in discovery order
    pub fn iter(&self) -> std::slice::Iter<'_, Transform> {
        self.transforms.iter()
    }

    /// Iterate in replay order (last discovered first) with discovery indices
    pub fn iter_replay(&self) -> impl Iterator<Item = (usize, &Transform)> {
        self.transforms.iter().enumerate().rev()
    }

    /// The first `count` transforms, clamped to the log length
    pub fn prefix(&self, count: usize) -> &[Transform] {
        self.transforms
            .get(..count.min(self.transforms.len()))
            .unwrap_or(&[])
    }

    /// All transforms in discovery order
    pub fn as_slice(&self) -> &[Transform] {
        &self.transforms
    }
}

impl From<Vec<Transform>> for TransformLog {
    fn from(transforms: Vec<Transform>) -> Self {
        Self { transforms }
    }
}

impl FromIterator<Transform> for TransformLog {
    fn from_iter<I: IntoIterator<Item = Transform>>(iter: I) -> Self {
        Self {
            transforms: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TransformLog {
    type Item = &'a Transform;
    type IntoIter = std::slice::Iter<'a, Transform>;

    fn into_iter(self) -> Self::IntoIter {
        self.transforms.iter()
    }
}
