//! Animated GIF of transform discovery followed by reconstruction

use crate::algorithm::decoder::{Reconstructor, ResidualImage};
use crate::algorithm::transform::TransformLog;
use crate::io::configuration::{
    CLAIMED_TILE_COLOR, FINAL_FRAME_HOLD, SCALE_RATE, VIEWER_MIN_FRAME_DELAY_MS,
};
use crate::io::error::{CodecError, Result};
use crate::io::image::to_rgba_image;
use crate::spatial::pixels::PixelBuffer;
use image::Frame;
use std::path::Path;

/// Replays a compression run as an animation
///
/// The first phase starts from the source image and blanks each destination
/// tile as its transform is discovered. The second phase starts from the
/// residual and shows the reconstruction after every replayed transform.
pub struct ReplayCapture<'a> {
    source: &'a PixelBuffer,
    residual: &'a ResidualImage,
    log: &'a TransformLog,
    tile_size: usize,
}

impl<'a> ReplayCapture<'a> {
    /// Capture a finished compression run
    pub const fn new(
        source: &'a PixelBuffer,
        residual: &'a ResidualImage,
        log: &'a TransformLog,
        tile_size: usize,
    ) -> Self {
        Self {
            source,
            residual,
            log,
            tile_size,
        }
    }

    /// Number of transforms advanced per emitted frame
    ///
    /// Delays below what viewers support are raised to that minimum, and
    /// frames are skipped to keep the apparent speed.
    pub const fn skip_factor(frame_delay_ms: u32) -> usize {
        if frame_delay_ms == 0 {
            VIEWER_MIN_FRAME_DELAY_MS as usize
        } else if frame_delay_ms < VIEWER_MIN_FRAME_DELAY_MS {
            VIEWER_MIN_FRAME_DELAY_MS.div_ceil(frame_delay_ms) as usize
        } else {
            1
        }
    }

    /// Write the animation to `output_path`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The log holds no transforms
    /// - The replay violates the reconstruction invariant
    /// - File system operations or GIF encoding fail
    pub fn export_gif(&self, output_path: &Path, frame_delay_ms: u32) -> Result<()> {
        let frames = self.render_frames(frame_delay_ms)?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CodecError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }

        let file = std::fs::File::create(output_path).map_err(|e| CodecError::FileSystem {
            path: output_path.to_path_buf(),
            operation: "create file",
            source: e,
        })?;

        let mut encoder = image::codecs::gif::GifEncoder::new(file);
        encoder
            .encode_frames(frames)
            .map_err(|e| CodecError::ImageExport {
                path: output_path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Render every frame of the animation
    ///
    /// # Errors
    ///
    /// Returns an error if the log is empty or the replay fails
    pub fn render_frames(&self, frame_delay_ms: u32) -> Result<Vec<Frame>> {
        if self.log.is_empty() {
            return Err(CodecError::InvalidSourceData {
                reason: "No transforms captured for visualization".to_string(),
            });
        }

        let delay_ms = frame_delay_ms.max(VIEWER_MIN_FRAME_DELAY_MS);
        let skip = Self::skip_factor(frame_delay_ms);
        let mut frames = Vec::new();

        let mut canvas = self.source.clone();
        frames.push(frame_from(&canvas, delay_ms)?);
        for (count, transform) in self.log.iter().enumerate() {
            let tile = transform.destination(self.tile_size);
            for y in tile.y..tile.y + tile.size {
                for x in tile.x..tile.x + tile.size {
                    canvas.put_pixel(x, y, CLAIMED_TILE_COLOR);
                }
            }
            if (count + 1) % skip == 0 || count + 1 == self.log.len() {
                frames.push(frame_from(&canvas, delay_ms)?);
            }
        }

        let mut reconstructor = Reconstructor::new(self.residual, self.tile_size, SCALE_RATE)?;
        frames.push(frame_from(&render_partial(&reconstructor), delay_ms)?);
        while reconstructor.step(self.log)? {
            let applied = reconstructor.applied();
            if applied % skip == 0 || applied == self.log.len() {
                frames.push(frame_from(&render_partial(&reconstructor), delay_ms)?);
            }
        }

        // Final frame displays longer
        let last = frame_from(reconstructor.image(), delay_ms * FINAL_FRAME_HOLD)?;
        frames.push(last);

        Ok(frames)
    }
}

// Pixels not yet reconstructed are shown in the claimed tile color
fn render_partial(reconstructor: &Reconstructor) -> PixelBuffer {
    let mut canvas = reconstructor.image().clone();
    for y in 0..canvas.height() {
        for x in 0..canvas.width() {
            if !reconstructor.is_valid(x, y) {
                canvas.put_pixel(x, y, CLAIMED_TILE_COLOR);
            }
        }
    }
    canvas
}

fn frame_from(buffer: &PixelBuffer, delay_ms: u32) -> Result<Frame> {
    Ok(Frame::from_parts(
        to_rgba_image(buffer)?,
        0,
        0,
        image::Delay::from_numer_denom_ms(delay_ms, 1),
    ))
}
