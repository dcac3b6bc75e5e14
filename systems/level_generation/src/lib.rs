#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded procedural layout of the level's platforms and goal marker.
//!
//! The generator lays out a fixed baseline of ground sections and ledges, then
//! chains pairs of floating platforms to the right. The first platform of each
//! pair sits behind a random gap and climbs relative to its predecessor; the
//! second follows at a fixed gap at any height. The goal marker sits above the
//! rightmost tile of the final platform.

use lava_run_core::{HazardStrip, LevelLayout, Platform, PlatformId, WorldPoint, TILE_SIZE};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const TILE: i32 = TILE_SIZE as i32;

/// Ground sections and ledges present in every level as `(x, y, length)`.
const BASELINE: [(i32, i32, u32); 4] = [
    (10, 570, 10),
    (100, 400, 3),
    (400, 570, 8),
    (500, 400, 5),
];

const GOAL_OFFSET_X: f32 = 10.0;
const GOAL_LIFT: f32 = 32.0;

const LAVA: HazardStrip = HazardStrip {
    origin: WorldPoint::new(-300.0, 600.0),
    segment_width: 128.0,
    segments: 1000,
};

/// Tuning knobs controlling the generated layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Seed for the generator's ChaCha stream.
    pub seed: u64,
    /// Number of generation steps; each step emits two platforms.
    pub steps: u32,
    /// Smallest random gap placed before the first platform of a pair.
    pub min_gap: i32,
    /// Largest random gap placed before the first platform of a pair.
    pub max_gap: i32,
    /// Gap placed before the second platform of a pair.
    pub paired_gap: i32,
    /// Highest platform row. Smaller y is higher up.
    pub top_y: i32,
    /// Lowest platform row.
    pub bottom_y: i32,
    /// How far the first platform of a pair may climb above its predecessor.
    pub climb: i32,
    /// Shortest platform in tiles. Values below one are treated as one.
    pub min_length: u32,
    /// Longest platform in tiles.
    pub max_length: u32,
}

impl Config {
    /// Creates the default configuration with the provided seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: 0,
            steps: 10,
            min_gap: 50,
            max_gap: 250,
            paired_gap: 50,
            top_y: 400,
            bottom_y: 570,
            climb: 50,
            min_length: 1,
            max_length: 10,
        }
    }
}

/// Pure generator producing level layouts from a [`Config`].
#[derive(Clone, Debug, Default)]
pub struct LevelGenerator {
    config: Config,
}

impl LevelGenerator {
    /// Creates a generator using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Generates a layout from the configured seed.
    #[must_use]
    pub fn generate(&self) -> LevelLayout {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.generate_with(&mut rng)
    }

    /// Generates a layout drawing randomness from the provided source.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> LevelLayout {
        let config = &self.config;
        let capacity = BASELINE.len() + 2 * usize::try_from(config.steps).unwrap_or(0);
        let mut platforms = Vec::with_capacity(capacity);

        for (x, y, length) in BASELINE {
            push_platform(&mut platforms, x, y, length);
        }

        let (mut last_x, mut last_y, mut last_length) = BASELINE[BASELINE.len() - 1];
        for _ in 0..config.steps {
            let reach = last_x + span(last_length);
            last_x = sample(rng, reach + config.min_gap, reach + config.max_gap);
            last_y = sample(rng, config.top_y, last_y - config.climb);
            last_length = self.sample_length(rng);
            push_platform(&mut platforms, last_x, last_y, last_length);

            last_x += span(last_length) + config.paired_gap;
            last_y = sample(rng, config.top_y, config.bottom_y);
            last_length = self.sample_length(rng);
            push_platform(&mut platforms, last_x, last_y, last_length);
        }

        let goal = platforms
            .last()
            .map(|platform: &Platform| {
                let half = TILE_SIZE / 2.0;
                let end = platform.end_tile();
                end.offset(GOAL_OFFSET_X - half, -half - GOAL_LIFT)
            })
            .unwrap_or_default();

        log::debug!(
            "generated {} platforms from seed {:#x}",
            platforms.len(),
            config.seed
        );
        LevelLayout::new(platforms, goal, LAVA)
    }

    fn sample_length<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let low = self.config.min_length.max(1);
        let high = self.config.max_length.max(1);
        rng.gen_range(low.min(high)..=low.max(high))
    }
}

fn span(length: u32) -> i32 {
    i32::try_from(length).unwrap_or(i32::MAX / TILE) * TILE
}

fn push_platform(platforms: &mut Vec<Platform>, x: i32, y: i32, length: u32) {
    let id = PlatformId::new(u32::try_from(platforms.len()).unwrap_or(u32::MAX));
    let origin = WorldPoint::new(x as f32, y as f32);
    platforms.push(Platform::new(id, origin, length));
}

/// Samples an integer from the inclusive range spanned by `a` and `b`,
/// swapping inverted bounds.
fn sample<R: Rng + ?Sized>(rng: &mut R, a: i32, b: i32) -> i32 {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    rng.gen_range(low..=high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_swaps_inverted_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..256 {
            let value = sample(&mut rng, 400, 350);
            assert!((350..=400).contains(&value));
        }
    }

    #[test]
    fn sample_handles_degenerate_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(sample(&mut rng, 400, 400), 400);
    }

    #[test]
    fn zero_steps_keeps_baseline_only() {
        let generator = LevelGenerator::new(Config {
            steps: 0,
            ..Config::default()
        });
        let layout = generator.generate();
        assert_eq!(layout.platforms().len(), BASELINE.len());
        let end = layout.platforms()[3].end_tile();
        assert_eq!(end, WorldPoint::new(628.0, 400.0));
        assert_eq!(layout.goal(), WorldPoint::new(622.0, 352.0));
    }
}
