//! Tests for pixel claim tracking

#[cfg(test)]
mod tests {
    use fractile::spatial::occupancy::OccupancyMap;

    // Verifies a new map has no claimed pixels
    // Verified by initializing all bits to 1
    #[test]
    fn test_new_map_is_unclaimed() {
        let map = OccupancyMap::new(8, 6);
        assert_eq!(map.claimed_count(), 0);
        assert!(map.is_region_unclaimed(0, 0, 8, 6));
        assert!(map.claimed_ratio().abs() < f64::EPSILON);
    }

    // Tests claiming a tile marks exactly its pixels
    // Verified by claiming one extra column per row
    #[test]
    fn test_claim_tile() {
        let mut map = OccupancyMap::new(8, 8);
        map.claim_tile(2, 4, 3);

        assert_eq!(map.claimed_count(), 9);
        assert!(map.is_claimed(2, 4));
        assert!(map.is_claimed(4, 6));
        assert!(!map.is_claimed(5, 6));
        assert!(!map.is_claimed(2, 7));
        assert!(!map.is_claimed(1, 4));
    }

    // Tests region queries detect a single claimed pixel
    // Verified by checking only the first row of the region
    #[test]
    fn test_region_unclaimed() {
        let mut map = OccupancyMap::new(10, 10);
        map.claim_tile(6, 7, 1);

        assert!(!map.is_region_unclaimed(4, 4, 4, 4));
        assert!(map.is_region_unclaimed(0, 0, 6, 10));
        assert!(map.is_region_unclaimed(7, 0, 3, 10));
    }

    // Tests claims are clipped to the map and out-of-bounds reads are unclaimed
    // Verified by wrapping claims past the right edge onto the next row
    #[test]
    fn test_claim_clipped_at_edges() {
        let mut map = OccupancyMap::new(4, 4);
        map.claim_tile(3, 3, 4);

        assert_eq!(map.claimed_count(), 1);
        assert!(map.is_claimed(3, 3));
        assert!(!map.is_claimed(0, 0));
        assert!(!map.is_claimed(4, 3));
        assert!(!map.is_claimed(3, 4));
    }

    // Tests repeated claims never decrease the claimed count
    // Verified by toggling bits instead of setting them
    #[test]
    fn test_claims_are_monotonic() {
        let mut map = OccupancyMap::new(6, 6);
        map.claim_tile(0, 0, 4);
        let first = map.claimed_count();
        map.claim_tile(2, 2, 4);

        assert!(map.claimed_count() >= first);
        assert!(map.is_claimed(0, 0));
        assert!(map.is_claimed(3, 3));
        assert_eq!(map.claimed_count(), 16 + 16 - 4);
        assert!((map.claimed_ratio() - 28.0 / 36.0).abs() < 1e-12);
    }

    // Tests the summary names dimensions and claimed pixels
    // Verified by printing the raw bits instead
    #[test]
    fn test_display_summary() {
        let mut map = OccupancyMap::new(3, 2);
        map.claim_tile(0, 0, 1);
        assert_eq!(map.to_string(), "OccupancyMap(3x2, 1 claimed)");
    }
}
