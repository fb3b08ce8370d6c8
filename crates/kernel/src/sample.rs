//! Deterministic sample worlds for tooling and tests.
//!
//! This is not terrain generation. It fills every collection of a
//! [`WorldState`] with reproducible content derived from a seed so the save
//! format can be exercised end to end without the real generator.

use serde::{Deserialize, Serialize};
use worldmap_common::Point;

use crate::noise::NoiseGrid;
use crate::objects::{Building, OreKind, Structure};
use crate::world::{KernelError, WorldState};

/// Parameters for a sample world covering a square of chunks centred on
/// the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleWorld {
    pub seed: i32,
    pub chunk_size: u32,
    /// Chunks from `-radius..=radius` on both axes are populated.
    pub radius: i32,
}

impl Default for SampleWorld {
    fn default() -> Self {
        Self {
            seed: 42,
            chunk_size: 16,
            radius: 1,
        }
    }
}

impl SampleWorld {
    pub fn build(&self) -> Result<WorldState, KernelError> {
        let mut world = WorldState::new(self.seed, self.chunk_size);
        let mut rng = SplitMix64::new(self.seed as u32 as u64);
        let size = self.chunk_size as i32;
        if size <= 0 {
            return Ok(world);
        }

        for cx in -self.radius..=self.radius {
            for cy in -self.radius..=self.radius {
                let chunk = Point::new(cx, cy);
                let base = Point::new(cx.wrapping_mul(size), cy.wrapping_mul(size));

                for kind in OreKind::ALL {
                    // Rarer kinds get fewer rolls.
                    if rng.below(OreKind::ALL.len() as u64 + 1) <= kind.tag() as u64 {
                        continue;
                    }
                    for _ in 0..=rng.below(3) {
                        let location = base.offset(rng.coord(size), rng.coord(size));
                        world.add_ore(chunk, kind, location);
                    }
                }

                if rng.below(2) == 0 {
                    let anchor = base.offset(rng.coord(size), rng.coord(size));
                    let footprint = (0..=rng.below(4) as i32)
                        .map(|i| anchor.offset(i, 0))
                        .collect();
                    world.add_structure(
                        chunk,
                        Structure::new(rng.below(4) as i32, anchor, footprint),
                    );
                }

                let samples = (0..size as usize * size as usize)
                    .map(|_| rng.unit())
                    .collect();
                world.insert_noise_chunk(chunk, NoiseGrid::from_samples(size as usize, samples)?)?;
            }
        }

        for i in 0..=self.radius.max(0) {
            let anchor = Point::new(i.wrapping_mul(3), -i);
            let footprint = vec![anchor, anchor.offset(1, 0), anchor.offset(1, 1), anchor.offset(0, 1)];
            world.add_building(Building::new(anchor, footprint));
        }

        tracing::debug!(
            seed = self.seed,
            radius = self.radius,
            ores = world.ore_count(),
            structures = world.structure_count(),
            "built sample world"
        );
        Ok(world)
    }
}

/// Splitmix64 step sequence; same mixing the simulation seed uses elsewhere.
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }

    /// Offset inside a chunk of side `size`.
    fn coord(&mut self, size: i32) -> i32 {
        self.below(size as u64) as i32
    }

    /// Uniform-ish sample in `[-1, 1)`.
    fn unit(&mut self) -> f32 {
        let bits = (self.next_u64() >> 40) as u32;
        (bits as f32 / (1u32 << 24) as f32) * 2.0 - 1.0
    }
}
