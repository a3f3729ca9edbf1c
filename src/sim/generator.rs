//! Procedural world generation
//!
//! The world is built in sectors: a run of contiguous ground tiles plus, for
//! unsafe sectors, one spawn choice at each randomized stride point. Which
//! choices are possible depends on the difficulty level, so new hazard kinds
//! are introduced as the run goes on rather than only made more frequent.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::entity::{Axis, EntityKind, Motion};
use super::registry::SpawnRequest;
use crate::config::RunConfig;
use crate::tuning::Tuning;

/// Output of one generator call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub start_x: f32,
    pub width: f32,
    pub requests: Vec<SpawnRequest>,
}

impl Sector {
    pub fn end_x(&self) -> f32 {
        self.start_x + self.width
    }

    /// Everything except ground tiles
    pub fn placements(&self) -> impl Iterator<Item = &SpawnRequest> {
        self.requests.iter().filter(|r| r.kind != EntityKind::Ground)
    }
}

/// Tracks the frontier: the x beyond which no world content exists yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProceduralGenerator {
    next_frontier: f32,
}

impl ProceduralGenerator {
    pub fn new(frontier: f32) -> Self {
        Self {
            next_frontier: frontier,
        }
    }

    pub fn next_frontier(&self) -> f32 {
        self.next_frontier
    }

    pub fn reset(&mut self, frontier: f32) {
        self.next_frontier = frontier;
    }

    /// True once the player is within `lookahead` of the frontier
    pub fn needs_sector(&self, player_x: f32, lookahead: f32) -> bool {
        player_x > self.next_frontier - lookahead
    }

    /// Generate the next sector at the frontier with a random width
    pub fn generate_next<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        level: u32,
        config: &RunConfig,
    ) -> Sector {
        let t = &config.tuning;
        let (lo, hi) = ordered(t.sector_width_min, t.sector_width_max);
        let width = rng.random_range(lo..=hi);
        self.generate_sector(rng, self.next_frontier, width, level, false, config)
    }

    /// Lay ground over `[start_x, start_x + width)` and, unless `safe`,
    /// populate it. Widths below the configured minimum are raised to it.
    /// Afterwards the frontier sits at the end of this sector.
    pub fn generate_sector<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        start_x: f32,
        width: f32,
        level: u32,
        safe: bool,
        config: &RunConfig,
    ) -> Sector {
        let t = &config.tuning;
        let min_width = t.min_sector_width.max(1.0);
        let width = if width.is_finite() {
            width.max(min_width)
        } else {
            min_width
        };
        let end_x = start_x + width;

        let mut requests = ground_tiles(start_x, end_x, t);

        if !safe {
            let (stride_lo, stride_hi) = ordered(t.stride_min.max(1.0), t.stride_max.max(1.0));
            let mut offset = t.first_stride.max(0.0);
            // Right edge of the last placement; nothing may start before it
            let mut occupied_until = start_x;

            while offset < width {
                let x = start_x + offset;
                let placement = place(rng, x, level, config);
                if let Some((left, right)) = span_of(&placement) {
                    if left >= occupied_until && left >= start_x && right <= end_x {
                        occupied_until = right;
                        requests.extend(placement);
                    }
                }
                offset += rng.random_range(stride_lo..=stride_hi);
            }
        }

        log::debug!(
            "Generated {} sector [{:.0}, {:.0}) at level {}: {} entities",
            if safe { "safe" } else { "live" },
            start_x,
            end_x,
            level,
            requests.len()
        );

        self.next_frontier = end_x;
        Sector {
            start_x,
            width,
            requests,
        }
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Contiguous ground tiles; the last one is trimmed to end exactly at `end_x`
fn ground_tiles(start_x: f32, end_x: f32, t: &Tuning) -> Vec<SpawnRequest> {
    let tile = t.ground_tile_width.max(1.0);
    let mut tiles = Vec::new();
    let mut x = start_x;
    while x < end_x {
        let w = tile.min(end_x - x);
        tiles.push(SpawnRequest::still(
            EntityKind::Ground,
            Aabb::new(x, t.ground_y, w, t.ground_depth),
        ));
        x += w;
    }
    tiles
}

/// Horizontal extent covered by a group of requests
fn span_of(requests: &[SpawnRequest]) -> Option<(f32, f32)> {
    requests.iter().map(|r| r.footprint().span_x()).reduce(|(l1, r1), (l2, r2)| {
        (l1.min(l2), r1.max(r2))
    })
}

/// Roll a spawn category for stride point `x`.
///
/// Categories are tested in order against cumulative thresholds; a category
/// that is locked at this level falls through to the next one, and anything
/// left over becomes a ground-level pickup.
fn place<R: Rng + ?Sized>(rng: &mut R, x: f32, level: u32, config: &RunConfig) -> Vec<SpawnRequest> {
    let t = &config.tuning;
    let roll: f32 = rng.random();

    let tiers = [
        (t.static_threshold, EntityKind::StaticObstacle),
        (t.oscillating_threshold, EntityKind::OscillatingObstacle),
        (t.patrolling_threshold, EntityKind::PatrollingHazard),
        (t.platform_threshold, EntityKind::ElevatedPlatform),
    ];
    let kind = tiers
        .iter()
        .find(|&&(threshold, kind)| roll < threshold && config.is_enabled(kind, level))
        .map(|&(_, kind)| kind)
        .unwrap_or(EntityKind::Pickup);

    match kind {
        EntityKind::StaticObstacle => vec![SpawnRequest::still(
            kind,
            Aabb::from_bottom_center(x, t.ground_y, t.car_width, t.car_height),
        )],
        EntityKind::OscillatingObstacle => vec![SpawnRequest::moving(
            kind,
            Aabb::from_bottom_center(x, t.drone_bottom, t.drone_size, t.drone_size),
            Motion::new(t.drone_amplitude, t.drone_period, Axis::Y),
        )],
        EntityKind::PatrollingHazard => vec![SpawnRequest::moving(
            kind,
            Aabb::from_bottom_center(x, t.ground_y, t.spike_size, t.spike_size),
            Motion::new(t.spike_patrol, t.spike_period, Axis::X),
        )],
        EntityKind::ElevatedPlatform => {
            let (lo, hi) = ordered(t.platform_width_min, t.platform_width_max);
            let w = rng.random_range(lo..=hi);
            let mut group = vec![SpawnRequest::still(
                kind,
                Aabb::new(x, t.platform_top, w, t.platform_height),
            )];
            let with_pickup = rng.random::<f32>() < t.platform_pickup_chance;
            if with_pickup && config.is_enabled(EntityKind::Pickup, level) {
                group.push(SpawnRequest::still(
                    EntityKind::Pickup,
                    Aabb::from_bottom_center(
                        x + w / 2.0,
                        t.platform_top - t.platform_pickup_clearance,
                        t.pickup_width,
                        t.pickup_height,
                    ),
                ));
            }
            group
        }
        _ if config.is_enabled(EntityKind::Pickup, level) => vec![SpawnRequest::still(
            EntityKind::Pickup,
            Aabb::from_bottom_center(x, t.pickup_bottom, t.pickup_width, t.pickup_height),
        )],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ground_is_contiguous(sector: &Sector) -> bool {
        let mut x = sector.start_x;
        for r in sector.requests.iter().filter(|r| r.kind == EntityKind::Ground) {
            if (r.rest.left() - x).abs() > 0.01 {
                return false;
            }
            x = r.rest.right();
        }
        (x - sector.end_x()).abs() < 0.01
    }

    #[test]
    fn test_safe_sector_is_ground_only() {
        let config = RunConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut generator = ProceduralGenerator::new(0.0);
        let sector = generator.generate_sector(&mut rng, -1000.0, 5000.0, 5, true, &config);

        assert_eq!(sector.requests.len(), 5);
        assert!(sector.requests.iter().all(|r| r.kind == EntityKind::Ground));
        assert!(ground_is_contiguous(&sector));
        assert_eq!(generator.next_frontier(), 4000.0);
    }

    #[test]
    fn test_partial_last_tile() {
        let config = RunConfig::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut generator = ProceduralGenerator::new(0.0);
        let sector = generator.generate_sector(&mut rng, 0.0, 4321.0, 1, true, &config);
        assert_eq!(sector.requests.len(), 5);
        assert!((sector.requests[4].rest.size.x - 321.0).abs() < 0.01);
        assert!(ground_is_contiguous(&sector));
    }

    #[test]
    fn test_zero_width_is_clamped() {
        let config = RunConfig::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut generator = ProceduralGenerator::new(0.0);
        let sector = generator.generate_sector(&mut rng, 500.0, 0.0, 1, false, &config);
        assert_eq!(sector.width, config.tuning.min_sector_width);
        assert!(generator.next_frontier() > 500.0);

        let sector = generator.generate_sector(&mut rng, 600.0, f32::NAN, 1, false, &config);
        assert_eq!(sector.width, config.tuning.min_sector_width);
    }

    #[test]
    fn test_sectors_tile_without_gaps() {
        let config = RunConfig::default();
        let mut rng = Pcg32::seed_from_u64(4);
        let mut generator = ProceduralGenerator::new(4000.0);
        let mut expected_start = 4000.0;
        for _ in 0..10 {
            let sector = generator.generate_next(&mut rng, 3, &config);
            assert_eq!(sector.start_x, expected_start);
            assert!(sector.width >= 4000.0 && sector.width <= 6000.0);
            assert!(ground_is_contiguous(&sector));
            expected_start = sector.end_x();
            assert_eq!(generator.next_frontier(), expected_start);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = RunConfig::default();
        let run = |seed| {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut generator = ProceduralGenerator::new(0.0);
            (0..5)
                .map(|_| generator.generate_next(&mut rng, 2, &config))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(77), run(77));
        assert_ne!(run(77), run(78));
    }

    #[test]
    fn test_pickup_gate_covers_platform_pickups() {
        let mut config = RunConfig::default();
        config
            .difficulty_gates
            .entry(3)
            .or_default()
            .insert(EntityKind::Pickup);
        let mut rng = Pcg32::seed_from_u64(6);
        let mut generator = ProceduralGenerator::new(0.0);

        let mut platforms = 0;
        for _ in 0..30 {
            let sector = generator.generate_next(&mut rng, 2, &config);
            platforms += sector
                .placements()
                .filter(|r| r.kind == EntityKind::ElevatedPlatform)
                .count();
            assert!(sector.placements().all(|r| r.kind != EntityKind::Pickup));
        }
        assert!(platforms > 0);

        let pickups: usize = (0..30)
            .map(|_| {
                generator
                    .generate_next(&mut rng, 3, &config)
                    .placements()
                    .filter(|r| r.kind == EntityKind::Pickup)
                    .count()
            })
            .sum();
        assert!(pickups > 0);
    }

    #[test]
    fn test_level_two_introduces_gated_kinds() {
        let config = RunConfig::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut generator = ProceduralGenerator::new(0.0);
        let mut seen_spike = false;
        let mut seen_platform = false;
        for _ in 0..30 {
            let sector = generator.generate_next(&mut rng, 2, &config);
            for r in sector.placements() {
                seen_spike |= r.kind == EntityKind::PatrollingHazard;
                seen_platform |= r.kind == EntityKind::ElevatedPlatform;
            }
        }
        assert!(seen_spike);
        assert!(seen_platform);
    }

    #[test]
    fn test_nothing_before_first_stride() {
        let config = RunConfig::default();
        let mut rng = Pcg32::seed_from_u64(6);
        let mut generator = ProceduralGenerator::new(0.0);
        for _ in 0..10 {
            let sector = generator.generate_next(&mut rng, 3, &config);
            for r in sector.placements() {
                assert!(r.footprint().left() >= sector.start_x + 300.0);
            }
        }
    }

    #[test]
    fn test_needs_sector() {
        let generator = ProceduralGenerator::new(4000.0);
        assert!(!generator.needs_sector(0.0, 4000.0));
        assert!(generator.needs_sector(100.0, 4000.0));
    }

    proptest! {
        #[test]
        fn prop_placements_stay_inside_and_apart(
            seed in any::<u64>(),
            start_x in -10_000.0f32..100_000.0,
            width in 0.0f32..9000.0,
            level in 1u32..8,
        ) {
            let config = RunConfig::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut generator = ProceduralGenerator::new(start_x);
            let sector = generator.generate_sector(&mut rng, start_x, width, level, false, &config);

            for (left, right) in sector.placements().map(|r| r.footprint().span_x()) {
                prop_assert!(left >= sector.start_x);
                prop_assert!(right <= sector.end_x());
            }

            // Hazards never share horizontal space
            let mut spans: Vec<(f32, f32)> = sector
                .placements()
                .filter(|r| r.kind.is_hazard())
                .map(|r| r.footprint().span_x())
                .collect();
            spans.sort_by(|a, b| a.0.total_cmp(&b.0));
            for pair in spans.windows(2) {
                prop_assert!(pair[0].1 <= pair[1].0);
            }
            prop_assert_eq!(generator.next_frontier(), sector.end_x());
        }

        #[test]
        fn prop_level_one_has_no_gated_kinds(seed in any::<u64>()) {
            let config = RunConfig::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut generator = ProceduralGenerator::new(0.0);
            for _ in 0..4 {
                let sector = generator.generate_next(&mut rng, 1, &config);
                for r in sector.placements() {
                    prop_assert!(r.kind != EntityKind::PatrollingHazard);
                    prop_assert!(r.kind != EntityKind::ElevatedPlatform);
                }
            }
        }
    }
}
