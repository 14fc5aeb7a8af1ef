use super::*;
use crate::device::mock_device::MockDevice;

fn as_reservation(rect: &FreeRect) -> AtlasReservation {
    AtlasReservation { x: rect.x, y: rect.y, width: rect.width, height: rect.height, owner: u64::MAX }
}

/// Free rects and reservations are pairwise disjoint and exactly tile the atlas
fn assert_exact_tiling(atlas: &ShadowAtlas) {
    let mut pieces: Vec<AtlasReservation> = atlas.reservations().to_vec();
    pieces.extend(atlas.free_rects().iter().map(as_reservation));

    for (i, a) in pieces.iter().enumerate() {
        assert!(a.x + a.width <= atlas.size() && a.y + a.height <= atlas.size(), "{:?} out of bounds", a);
        for b in &pieces[i + 1..] {
            assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
        }
    }

    let total = atlas.size() as u64 * atlas.size() as u64;
    assert_eq!(atlas.free_area() + atlas.used_area(), total);
}

/// Small deterministic generator so the stress test needs no extra crate
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }
}

// ============================================================================
// Basic reservation tests
// ============================================================================

#[test]
fn test_new_atlas_has_one_free_rect() {
    let atlas = ShadowAtlas::new(4096, 32);
    assert_eq!(atlas.free_rects(), &[FreeRect { x: 0, y: 0, width: 4096, height: 4096 }]);
    assert_eq!(atlas.used_area(), 0);
    assert!(atlas.reservations().is_empty());
}

#[test]
fn test_first_reservation_at_origin() {
    let mut atlas = ShadowAtlas::new(4096, 32);
    let tile = atlas.reserve(1024, 1024, 1).unwrap();
    assert_eq!((tile.x, tile.y, tile.width, tile.height, tile.owner), (0, 0, 1024, 1024, 1));
}

#[test]
fn test_small_requests_clamped_to_min_tile() {
    let mut atlas = ShadowAtlas::new(4096, 32);
    let tile = atlas.reserve(4, 0, 1).unwrap();
    assert_eq!((tile.width, tile.height), (32, 32));
}

#[test]
fn test_full_atlas_tile_leaves_no_free_rect() {
    let mut atlas = ShadowAtlas::new(2048, 32);
    assert!(atlas.reserve(2048, 2048, 1).is_some());
    assert!(atlas.free_rects().is_empty());
    assert!(atlas.reserve(32, 32, 2).is_none());
}

#[test]
fn test_single_leftover_emits_one_rect() {
    let mut atlas = ShadowAtlas::new(1024, 32);
    atlas.reserve(1024, 256, 1).unwrap();
    assert_eq!(atlas.free_rects(), &[FreeRect { x: 0, y: 256, width: 1024, height: 768 }]);
}

#[test]
fn test_split_keeps_larger_leftover_whole() {
    let mut atlas = ShadowAtlas::new(4096, 32);
    atlas.reserve(1024, 1024, 1).unwrap();
    assert_eq!(atlas.free_rects(), &[
        FreeRect { x: 1024, y: 0, width: 3072, height: 1024 },
        FreeRect { x: 0, y: 1024, width: 4096, height: 3072 },
    ]);
}

#[test]
fn test_best_short_side_fit_prefers_exact_fit() {
    let mut atlas = ShadowAtlas::new(4096, 32);
    atlas.reserve(1024, 1024, 1).unwrap();
    atlas.reserve(512, 512, 2).unwrap();
    // The 512x512 hole left beside the second tile is an exact fit
    let tile = atlas.reserve(512, 512, 3).unwrap();
    assert_eq!((tile.x, tile.y), (1024, 512));
}

// ============================================================================
// Exhaustion
// ============================================================================

#[test]
fn test_oversized_request_fails_on_fresh_atlas() {
    let mut atlas = ShadowAtlas::new(4096, 32);
    assert!(atlas.reserve(5000, 5000, 1).is_none());
    assert!(atlas.reserve(5000, 16, 1).is_none());
    assert!(atlas.reserve(16, 4097, 1).is_none());
    assert_eq!(atlas.free_area(), 4096 * 4096);
}

#[test]
fn test_exhaustion_returns_none() {
    let mut atlas = ShadowAtlas::new(1024, 32);
    for owner in 0..4 {
        assert!(atlas.reserve(512, 512, owner).is_some());
    }
    assert!(atlas.reserve(512, 512, 4).is_none());
    assert_eq!(atlas.free_area(), 0);
}

// ============================================================================
// Scenarios and invariants
// ============================================================================

#[test]
fn test_mixed_sizes_scenario() {
    let mut atlas = ShadowAtlas::new(4096, 32);
    for (owner, size) in [1024u32, 512, 512, 256].into_iter().enumerate() {
        assert!(atlas.reserve(size, size, owner as u64).is_some());
    }

    assert_exact_tiling(&atlas);
    let used = 1024u64 * 1024 + 512 * 512 + 512 * 512 + 256 * 256;
    assert_eq!(atlas.free_area(), 4096 * 4096 - used);
}

#[test]
fn test_random_sequences_never_overlap() {
    let mut rng = Lcg(0x5EED);
    let mut atlas = ShadowAtlas::new(4096, 32);

    for round in 0..20 {
        atlas.clear();
        let mut budget = 4096u64 * 4096;
        for owner in 0..64 {
            let w = 32 + rng.next() % 1500;
            let h = 32 + rng.next() % 1500;
            if (w as u64 * h as u64) > budget {
                break;
            }
            if atlas.reserve(w, h, owner).is_some() {
                budget -= w as u64 * h as u64;
            }
        }
        assert_exact_tiling(&atlas);
        assert!(!atlas.reservations().is_empty(), "round {} placed nothing", round);
    }
}

#[test]
fn test_clear_makes_layout_deterministic() {
    let requests = [(700u32, 300u32), (1024, 1024), (64, 2000), (512, 512), (33, 90), (2048, 128)];
    let mut atlas = ShadowAtlas::new(4096, 32);

    let run = |atlas: &mut ShadowAtlas| {
        atlas.clear();
        requests
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| atlas.reserve(w, h, i as u64))
            .collect::<Vec<_>>()
    };

    let first = run(&mut atlas);
    let second = run(&mut atlas);
    assert_eq!(first, second);
    assert!(first.iter().all(Option::is_some));
}

// ============================================================================
// Cubemap reservations
// ============================================================================

#[test]
fn test_cubemap_reserves_three_by_two() {
    let mut atlas = ShadowAtlas::new(4096, 32);
    let tile = atlas.reserve_cubemap(512, 9).unwrap();
    assert_eq!((tile.width, tile.height, tile.owner), (1536, 1024, 9));
}

#[test]
fn test_cubemap_too_large_fails() {
    let mut atlas = ShadowAtlas::new(4096, 32);
    assert!(atlas.reserve_cubemap(2048, 1).is_none());
    assert!(atlas.reserve_cubemap(u32::MAX, 1).is_none());
}

// ============================================================================
// Device probe
// ============================================================================

#[test]
fn test_probe_prefers_8192() {
    let atlas = ShadowAtlas::for_device(&MockDevice::new(16384), &ShadowConfig::default()).unwrap();
    assert_eq!(atlas.size(), 8192);
}

#[test]
fn test_probe_falls_back_to_4096() {
    let atlas = ShadowAtlas::for_device(&MockDevice::new(4096), &ShadowConfig::default()).unwrap();
    assert_eq!(atlas.size(), 4096);
}

#[test]
fn test_explicit_size_checked_against_device() {
    let config = ShadowConfig { atlas_size: Some(2048), ..Default::default() };
    assert_eq!(ShadowAtlas::for_device(&MockDevice::new(4096), &config).unwrap().size(), 2048);

    let config = ShadowConfig { atlas_size: Some(16384), ..Default::default() };
    let err = ShadowAtlas::for_device(&MockDevice::new(8192), &config).unwrap_err();
    assert!(matches!(err, Error::InitializationFailed(_)));
}
