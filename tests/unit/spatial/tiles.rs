//! Tests for tile grid iteration and window overlap rules

#[cfg(test)]
mod tests {
    use fractile::spatial::tiles::{TileGrid, TileRect};

    // Tests tiles are produced row by row, left to right
    // Verified by iterating columns in the outer loop
    #[test]
    fn test_grid_raster_order() {
        let tiles: Vec<TileRect> = TileGrid::new(8, 8, 4).collect();
        assert_eq!(
            tiles,
            vec![
                TileRect::new(0, 0, 4),
                TileRect::new(4, 0, 4),
                TileRect::new(0, 4, 4),
                TileRect::new(4, 4, 4),
            ]
        );
    }

    // Tests partial trailing rows and columns are not formed into tiles
    // Verified by rounding the tile count up
    #[test]
    fn test_grid_skips_partial_tiles() {
        let grid = TileGrid::new(10, 7, 4);
        assert_eq!(grid.tile_count(), 2);
        assert_eq!(grid.len(), 2);

        let last = TileGrid::new(10, 7, 4).last();
        assert_eq!(last, Some(TileRect::new(4, 0, 4)));
    }

    // Tests a zero tile size produces an empty grid
    // Verified by removing the zero guard
    #[test]
    fn test_grid_zero_tile_size() {
        assert_eq!(TileGrid::new(8, 8, 0).count(), 0);
    }

    // Tests position tracks consumed tiles
    // Verified by incrementing position before the bounds check
    #[test]
    fn test_grid_position() {
        let mut grid = TileGrid::new(4, 4, 2);
        assert_eq!(grid.position(), 0);
        grid.next();
        grid.next();
        assert_eq!(grid.position(), 2);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.by_ref().count(), 2);
        assert_eq!(grid.position(), 4);
        assert_eq!(grid.next(), None);
        assert_eq!(grid.position(), 4);
    }

    // Tests the overlap rule counts touching and one-pixel-apart windows as overlapping
    // Verified by switching to strict comparisons
    #[test]
    fn test_overlaps_inclusive_boundaries() {
        let tile = TileRect::new(16, 16, 8);

        // Window ending exactly where the tile starts
        assert!(tile.overlaps_inclusive(0, 16, 16));
        // Window starting one pixel after the tile ends
        assert!(tile.overlaps_inclusive(24, 16, 16));
        // Two pixels clear on either side
        assert!(!tile.overlaps_inclusive(25, 16, 16));
        assert!(!tile.overlaps_inclusive(16, 25, 16));
        // Diagonal windows only overlap when both axes touch
        assert!(!tile.overlaps_inclusive(25, 0, 16));
        assert!(tile.overlaps_inclusive(24, 0, 16));
    }

    // Tests exact intersection excludes tiles that only share an edge
    // Verified by using inclusive comparisons
    #[test]
    fn test_intersects() {
        let a = TileRect::new(0, 0, 4);
        assert!(a.intersects(&TileRect::new(3, 3, 4)));
        assert!(!a.intersects(&TileRect::new(4, 0, 4)));
        assert!(!a.intersects(&TileRect::new(0, 4, 4)));
    }

    // Tests containment within image bounds
    // Verified by testing the origin only
    #[test]
    fn test_fits_within() {
        assert!(TileRect::new(4, 4, 4).fits_within(8, 8));
        assert!(!TileRect::new(5, 4, 4).fits_within(8, 8));
        assert!(!TileRect::new(4, 5, 4).fits_within(8, 8));
    }
}
