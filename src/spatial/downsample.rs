//! Coarse block-average preview of an image

use crate::io::error::{Result, invalid_parameter};
use crate::spatial::pixels::PixelBuffer;

/// Average `block_size` blocks into one pixel each
///
/// The output is `ceil(width / block_size)` by `ceil(height / block_size)`.
/// Trailing partial blocks are averaged over the pixels they actually cover.
///
/// # Errors
///
/// Returns an error if `block_size` is zero
pub fn block_average(image: &PixelBuffer, block_size: usize) -> Result<PixelBuffer> {
    if block_size == 0 {
        return Err(invalid_parameter(
            "block_size",
            &block_size,
            &"must be at least 1",
        ));
    }

    let coarse_width = image.width().div_ceil(block_size);
    let coarse_height = image.height().div_ceil(block_size);
    let mut coarse = PixelBuffer::new(coarse_width, coarse_height);

    for row in 0..coarse_height {
        let start_y = row * block_size;
        let end_y = (start_y + block_size).min(image.height());
        for col in 0..coarse_width {
            let start_x = col * block_size;
            let end_x = (start_x + block_size).min(image.width());

            let mut sums = [0u32; 4];
            let mut total = 0u32;
            for y in start_y..end_y {
                for x in start_x..end_x {
                    let pixel = image.pixel(x, y);
                    for (sum, channel) in sums.iter_mut().zip(pixel) {
                        *sum += u32::from(channel);
                    }
                    total += 1;
                }
            }

            if total > 0 {
                coarse.put_pixel(col, row, sums.map(|sum| (sum / total) as u8));
            }
        }
    }

    Ok(coarse)
}

/// Expand a coarse preview back to `width x height` by block replication
///
/// # Errors
///
/// Returns an error if `block_size` is zero
pub fn upscale_nearest(
    coarse: &PixelBuffer,
    block_size: usize,
    width: usize,
    height: usize,
) -> Result<PixelBuffer> {
    if block_size == 0 {
        return Err(invalid_parameter(
            "block_size",
            &block_size,
            &"must be at least 1",
        ));
    }

    let mut image = PixelBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            image.put_pixel(x, y, coarse.pixel(x / block_size, y / block_size));
        }
    }
    Ok(image)
}
