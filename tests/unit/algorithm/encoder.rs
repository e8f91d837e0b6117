//! Tests for tile-by-tile compression sessions

#[cfg(test)]
mod tests {
    use fractile::CodecError;
    use fractile::algorithm::encoder::{
        CompressionConfig, CompressionSession, StepOutcome, compress,
    };
    use fractile::spatial::pixels::PixelBuffer;
    use fractile::spatial::tiles::TileRect;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noise(width: usize, height: usize, seed: u64) -> PixelBuffer {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut image = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let value = 120 + rng.random::<u8>() % 6;
                image.put_pixel(x, y, [value, value, value, 255]);
            }
        }
        image
    }

    fn config(tile_size: usize, tolerance: u32) -> CompressionConfig {
        CompressionConfig {
            tile_size,
            tolerance,
        }
    }

    // Tests default configuration values
    // Verified by changing the default tile size
    #[test]
    fn test_default_config() {
        let config = CompressionConfig::default();
        assert_eq!(config.tile_size, 8);
        assert_eq!(config.tolerance, 800);
    }

    // Tests claimed pixels are never released during a run
    // Verified by clearing the tile bits after each step
    #[test]
    fn test_claims_are_monotonic() {
        let mut session = CompressionSession::new(noise(32, 32, 3), config(4, 60)).unwrap();
        let mut previous = session.occupancy().clone();

        while session.step().unwrap() != StepOutcome::Finished {
            let current = session.occupancy();
            for y in 0..32 {
                for x in 0..32 {
                    if previous.is_claimed(x, y) {
                        assert!(current.is_claimed(x, y));
                    }
                }
            }
            previous = current.clone();
        }
        assert!(session.is_finished());
    }

    // Tests destination tiles of distinct transforms never overlap
    // Verified by matching tiles that are already claimed
    #[test]
    fn test_destinations_disjoint() {
        let (_, log) = compress(&noise(40, 40, 11), 4, 60).unwrap();
        let tiles: Vec<TileRect> = log.iter().map(|t| t.destination(4)).collect();

        for (i, a) in tiles.iter().enumerate() {
            for b in tiles.iter().skip(i + 1) {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    // Tests source windows avoid every tile claimed before them and their own tile
    // Verified by ignoring the occupancy map in the window search
    #[test]
    fn test_sources_avoid_earlier_claims() {
        let (_, log) = compress(&noise(40, 40, 5), 4, 60).unwrap();

        for (index, transform) in log.iter().enumerate() {
            let window = transform.source(4, 2);
            for earlier in log.prefix(index + 1) {
                assert!(!window.intersects(&earlier.destination(4)));
            }
            assert!(window.fits_within(40, 40));
        }
    }

    // Tests the residual keeps unclaimed pixels and blanks claimed ones
    // Verified by copying claimed pixels into the residual
    #[test]
    fn test_residual_preserves_unclaimed() {
        let source = noise(24, 24, 9);
        let mut session = CompressionSession::new(source.clone(), config(4, 60)).unwrap();
        session.run().unwrap();
        let residual = session.residual().unwrap();
        let occupancy = session.occupancy();

        for y in 0..24 {
            for x in 0..24 {
                if occupancy.is_claimed(x, y) {
                    assert!(!residual.is_valid(x, y));
                    assert_eq!(residual.image().pixel(x, y), [0, 0, 0, 0]);
                } else {
                    assert!(residual.is_valid(x, y));
                    assert_eq!(residual.image().pixel(x, y), source.pixel(x, y));
                }
            }
        }
        assert_eq!(residual.placeholder_count(), occupancy.claimed_count());
        assert_eq!(occupancy.claimed_count(), session.log().len() * 16);
    }

    // Tests each step reports its tile in raster order
    // Verified by iterating tiles column by column
    #[test]
    fn test_step_outcomes() {
        let mut image = PixelBuffer::filled(16, 16, [0, 0, 0, 255]);
        image.put_pixel(0, 0, [255, 255, 255, 255]);
        let mut session = CompressionSession::new(image, config(4, 0)).unwrap();

        assert_eq!(session.tiles_total(), 16);
        assert_eq!(
            session.step().unwrap(),
            StepOutcome::Unmatched {
                tile_x: 0,
                tile_y: 0
            }
        );
        match session.step().unwrap() {
            StepOutcome::Claimed(transform) => assert_eq!((transform.dst_x, transform.dst_y), (4, 0)),
            other => unreachable!("Expected a claimed tile, got {other:?}"),
        }
        assert_eq!(session.tiles_processed(), 2);

        session.run().unwrap();
        assert_eq!(session.step().unwrap(), StepOutcome::Finished);
        assert_eq!(session.tiles_processed(), 16);
    }

    // Tests images smaller than one tile are rejected
    // Verified by producing an empty log instead
    #[test]
    fn test_image_smaller_than_tile() {
        let result = CompressionSession::new(PixelBuffer::filled(4, 8, [0; 4]), config(8, 10));
        assert!(matches!(result, Err(CodecError::InvalidParameter { .. })));
    }

    // Tests zero tile sizes are rejected before any search
    // Verified by removing the matcher validation
    #[test]
    fn test_zero_tile_size() {
        assert!(compress(&PixelBuffer::filled(8, 8, [0; 4]), 0, 10).is_err());
    }

    // Tests images holding one tile but no window produce an empty log
    // Verified by requiring a window to fit
    #[test]
    fn test_single_tile_image() {
        let (residual, log) = compress(&PixelBuffer::filled(8, 8, [5; 4]), 8, 1000).unwrap();
        assert!(log.is_empty());
        assert_eq!(residual.placeholder_count(), 0);
    }
}
