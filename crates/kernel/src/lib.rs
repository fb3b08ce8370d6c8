//! World kernel: the in-memory world state that gets saved and loaded.
//!
//! # Invariants
//! - Chunk-indexed collections hold at most one entry per chunk coordinate.
//! - Point lists and footprints keep insertion order.
//! - Every noise grid is `chunk_size × chunk_size`.
//! - Iteration over chunk-indexed collections is in ascending `Point` order.

pub mod noise;
pub mod objects;
pub mod sample;
pub mod world;

pub use noise::NoiseGrid;
pub use objects::{Building, OreKind, Structure};
pub use sample::SampleWorld;
pub use world::{ChunkOres, KernelError, WorldState, WorldSummary};
