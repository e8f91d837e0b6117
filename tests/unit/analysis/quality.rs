//! Tests for reconstruction quality measurement

#[cfg(test)]
mod tests {
    use fractile::CodecError;
    use fractile::algorithm::transform::{Transform, TransformLog};
    use fractile::analysis::quality::{QualityReport, psnr};
    use fractile::spatial::occupancy::OccupancyMap;
    use fractile::spatial::pixels::PixelBuffer;

    // Tests identical images report zero error
    // Verified by dividing by pixel count instead of sample count
    #[test]
    fn test_identical_images() {
        let image = PixelBuffer::filled(4, 4, [10, 20, 30, 255]);
        let mut occupancy = OccupancyMap::new(4, 4);
        occupancy.claim_tile(0, 0, 2);
        let log = TransformLog::from(vec![Transform::new(0, 0, 0, 0)]);

        let report = QualityReport::measure(&image, &image, &occupancy, &log).unwrap();

        assert!(report.mse.abs() < f64::EPSILON);
        assert!(report.psnr.is_infinite());
        assert_eq!(report.transform_count, 1);
        assert_eq!(report.altered_preserved_pixels, 0);
        assert!((report.claimed_ratio - 0.25).abs() < 1e-12);
        // 64 raw bytes against 48 residual bytes plus one 16 byte record
        assert!((report.compression_ratio - 1.0).abs() < 1e-12);
    }

    // Tests error is averaged over every channel sample
    // Verified by ignoring the alpha channel
    #[test]
    fn test_mse_over_samples() {
        let source = PixelBuffer::filled(2, 1, [0, 0, 0, 0]);
        let mut reconstructed = source.clone();
        reconstructed.put_pixel(1, 0, [4, 0, 0, 0]);
        let occupancy = OccupancyMap::new(2, 1);

        let report =
            QualityReport::measure(&source, &reconstructed, &occupancy, &TransformLog::new())
                .unwrap();

        assert!((report.mse - 2.0).abs() < 1e-12);
        assert_eq!(report.altered_preserved_pixels, 1);
    }

    // Tests changes inside claimed tiles do not count as altered residual pixels
    // Verified by counting every differing pixel
    #[test]
    fn test_claimed_changes_not_altered() {
        let source = PixelBuffer::filled(4, 4, [50, 50, 50, 255]);
        let mut reconstructed = source.clone();
        reconstructed.put_pixel(1, 1, [52, 50, 50, 255]);
        let mut occupancy = OccupancyMap::new(4, 4);
        occupancy.claim_tile(0, 0, 2);

        let report =
            QualityReport::measure(&source, &reconstructed, &occupancy, &TransformLog::new())
                .unwrap();

        assert_eq!(report.altered_preserved_pixels, 0);
        assert!(report.mse > 0.0);
    }

    // Tests mismatched dimensions are rejected
    // Verified by comparing the overlapping region only
    #[test]
    fn test_dimension_mismatch() {
        let a = PixelBuffer::new(4, 4);
        let b = PixelBuffer::new(4, 3);

        assert!(matches!(
            QualityReport::measure(&a, &b, &OccupancyMap::new(4, 4), &TransformLog::new()),
            Err(CodecError::InvalidSourceData { .. })
        ));
    }

    // Tests PSNR on known error values
    // Verified by using the natural logarithm
    #[test]
    fn test_psnr_values() {
        assert!(psnr(0.0).is_infinite());
        assert!(psnr(255.0 * 255.0).abs() < 1e-9);
        assert!((psnr(65.025) - 30.0).abs() < 1e-9);
    }
}
