use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use worldmap_common::Point;

use crate::noise::NoiseGrid;
use crate::objects::{Building, OreKind, Structure};

/// Ore locations inside one chunk, grouped by kind.
pub type ChunkOres = BTreeMap<OreKind, Vec<Point>>;

/// Errors from world state operations.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("noise grid of side {size} is not square: {detail}")]
    GridShape { size: usize, detail: String },
    #[error("noise chunk {chunk} has side {actual}, world chunk size is {expected}")]
    ChunkSizeMismatch {
        chunk: Point,
        expected: u32,
        actual: usize,
    },
}

/// The complete persisted world.
///
/// Chunk-indexed collections are BTreeMaps so iteration (and therefore the
/// save file) is deterministic: ascending chunk coordinate, then ascending
/// ore tag.
///
/// Persisted only through the binary map codec; use [`WorldState::summary`]
/// for text output.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    seed: i32,
    chunk_size: u32,
    ores: BTreeMap<Point, ChunkOres>,
    structures: BTreeMap<Point, Vec<Structure>>,
    buildings: Vec<Building>,
    noise_chunks: BTreeMap<Point, NoiseGrid>,
}

/// Counts describing a world, for tooling output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSummary {
    pub seed: i32,
    pub chunk_size: u32,
    pub ore_chunks: usize,
    pub ore_deposits: usize,
    pub structure_chunks: usize,
    pub structures: usize,
    pub buildings: usize,
    pub noise_chunks: usize,
}

impl WorldState {
    /// An empty world for the given seed and generator chunk size.
    pub fn new(seed: i32, chunk_size: u32) -> Self {
        Self {
            seed,
            chunk_size,
            ores: BTreeMap::new(),
            structures: BTreeMap::new(),
            buildings: Vec::new(),
            noise_chunks: BTreeMap::new(),
        }
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    /// Side length of every noise grid in this world.
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    pub fn ores(&self) -> &BTreeMap<Point, ChunkOres> {
        &self.ores
    }

    pub fn ores_in(&self, chunk: Point) -> Option<&ChunkOres> {
        self.ores.get(&chunk)
    }

    /// Append one ore location to `chunk`'s list for `kind`.
    pub fn add_ore(&mut self, chunk: Point, kind: OreKind, location: Point) {
        self.ores
            .entry(chunk)
            .or_default()
            .entry(kind)
            .or_default()
            .push(location);
    }

    /// Replace all ores of `chunk`. Returns the previous entry.
    pub fn set_chunk_ores(&mut self, chunk: Point, ores: ChunkOres) -> Option<ChunkOres> {
        self.ores.insert(chunk, ores)
    }

    pub fn structures(&self) -> &BTreeMap<Point, Vec<Structure>> {
        &self.structures
    }

    pub fn structures_in(&self, chunk: Point) -> &[Structure] {
        self.structures.get(&chunk).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_structure(&mut self, chunk: Point, structure: Structure) {
        self.structures.entry(chunk).or_default().push(structure);
    }

    /// Replace all structures of `chunk`. Returns the previous entry.
    pub fn set_chunk_structures(
        &mut self,
        chunk: Point,
        structures: Vec<Structure>,
    ) -> Option<Vec<Structure>> {
        self.structures.insert(chunk, structures)
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn add_building(&mut self, building: Building) {
        self.buildings.push(building);
    }

    pub fn noise_chunks(&self) -> &BTreeMap<Point, NoiseGrid> {
        &self.noise_chunks
    }

    pub fn noise_chunk(&self, chunk: Point) -> Option<&NoiseGrid> {
        self.noise_chunks.get(&chunk)
    }

    /// Store the noise grid for `chunk`, replacing any previous grid.
    ///
    /// The grid side must equal the world chunk size.
    pub fn insert_noise_chunk(
        &mut self,
        chunk: Point,
        grid: NoiseGrid,
    ) -> Result<Option<NoiseGrid>, KernelError> {
        if grid.size() != self.chunk_size as usize {
            return Err(KernelError::ChunkSizeMismatch {
                chunk,
                expected: self.chunk_size,
                actual: grid.size(),
            });
        }
        let previous = self.noise_chunks.insert(chunk, grid);
        if previous.is_some() {
            tracing::trace!(?chunk, "replaced noise chunk");
        }
        Ok(previous)
    }

    /// Total ore locations across all chunks and kinds.
    pub fn ore_count(&self) -> usize {
        self.ores
            .values()
            .flat_map(|kinds| kinds.values())
            .map(Vec::len)
            .sum()
    }

    /// Total structures across all chunks.
    pub fn structure_count(&self) -> usize {
        self.structures.values().map(Vec::len).sum()
    }

    /// No ores, structures, buildings or noise chunks.
    pub fn is_empty(&self) -> bool {
        self.ores.is_empty()
            && self.structures.is_empty()
            && self.buildings.is_empty()
            && self.noise_chunks.is_empty()
    }

    pub fn summary(&self) -> WorldSummary {
        WorldSummary {
            seed: self.seed,
            chunk_size: self.chunk_size,
            ore_chunks: self.ores.len(),
            ore_deposits: self.ore_count(),
            structure_chunks: self.structures.len(),
            structures: self.structure_count(),
            buildings: self.buildings.len(),
            noise_chunks: self.noise_chunks.len(),
        }
    }
}
