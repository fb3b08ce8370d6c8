//! Map file encoding and decoding.
//!
//! Layout, all integers `i32` little-endian:
//! ```text
//! "MAP\0"                       signature
//! seed
//! ore chunks      count, { x, y, kinds, { tag:u8, n, n × (x, y) } }
//! structure chunks count, { x, y, n, { type, x, y, m, m × (x, y) } }
//! buildings       count, { x, y, m, m × (x, y) }
//! noise           chunk_size, count, { x, y, rows, size² × f32 }
//! ```
//! Chunk-indexed sections are written in ascending chunk order, ore kinds in
//! ascending tag order. The decoder does not depend on either order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use worldmap_common::Point;
use worldmap_kernel::{
    Building, ChunkOres, KernelError, NoiseGrid, OreKind, Structure, WorldState,
};

use crate::error::PersistError;
use crate::primitives::{ByteReader, ByteWriter, MAX_PREALLOC};

/// File signature: ASCII "MAP" and a zero byte.
pub const MAGIC: [u8; 4] = [77, 65, 80, 0];

/// Decoder settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// When set, files whose stored chunk size differs are rejected.
    /// Otherwise the stored value is used as is.
    pub expected_chunk_size: Option<u32>,
}

/// Encodes a [`WorldState`] to the map byte format and back.
///
/// Holds no world between calls; each call is one linear pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldCodec {
    options: DecodeOptions,
}

impl WorldCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Write `world` to `writer`. Returns the number of bytes written.
    pub fn encode<W: Write>(&self, world: &WorldState, writer: W) -> Result<u64, PersistError> {
        let mut w = ByteWriter::new(writer);
        w.bytes(&MAGIC)?;
        w.i32(world.seed())?;
        write_ores(&mut w, world)?;
        write_structures(&mut w, world)?;
        write_buildings(&mut w, world)?;
        write_noise(&mut w, world)?;
        Ok(w.written())
    }

    pub fn encode_to_vec(&self, world: &WorldState) -> Result<Vec<u8>, PersistError> {
        let mut buf = Vec::with_capacity(Self::encoded_len(world) as usize);
        self.encode(world, &mut buf)?;
        Ok(buf)
    }

    /// Exact size of the encoding of `world`.
    pub fn encoded_len(world: &WorldState) -> u64 {
        const INT: u64 = 4;
        const POINT: u64 = 8;
        let points = |n: usize| INT + POINT * n as u64;

        let ores: u64 = world
            .ores()
            .values()
            .map(|kinds| {
                POINT + INT + kinds.values().map(|p| 1 + points(p.len())).sum::<u64>()
            })
            .sum();
        let structures: u64 = world
            .structures()
            .values()
            .map(|list| {
                POINT
                    + INT
                    + list
                        .iter()
                        .map(|s| INT + POINT + points(s.points.len()))
                        .sum::<u64>()
            })
            .sum();
        let buildings: u64 = world
            .buildings()
            .iter()
            .map(|b| POINT + points(b.points.len()))
            .sum();
        let noise: u64 = world
            .noise_chunks()
            .values()
            .map(|grid| POINT + INT + 4 * grid.samples().len() as u64)
            .sum();

        MAGIC.len() as u64 + INT + (INT + ores) + (INT + structures) + (INT + buildings)
            + (2 * INT + noise)
    }

    /// Read one world from `reader`. Bytes after the noise section are left
    /// unread.
    pub fn decode<R: Read>(&self, reader: R) -> Result<WorldState, PersistError> {
        let mut r = ByteReader::new(reader);
        self.decode_from(&mut r)
    }

    /// Read one world and require `reader` to be exhausted afterwards.
    pub fn decode_complete<R: Read>(&self, reader: R) -> Result<WorldState, PersistError> {
        let mut r = ByteReader::new(reader);
        let world = self.decode_from(&mut r)?;
        r.expect_end()?;
        Ok(world)
    }

    pub fn decode_slice(&self, bytes: &[u8]) -> Result<WorldState, PersistError> {
        self.decode_complete(bytes)
    }

    fn decode_from<R: Read>(&self, r: &mut ByteReader<R>) -> Result<WorldState, PersistError> {
        let found = r.array::<4>("signature")?;
        if found != MAGIC {
            return Err(PersistError::BadSignature {
                found,
                expected: MAGIC,
            });
        }
        let seed = r.i32("seed")?;
        let ores = read_ores(r)?;
        let structures = read_structures(r)?;
        let buildings = read_buildings(r)?;
        let (chunk_size, noise) = self.read_noise(r)?;

        // Assembled only once every section has been read.
        let mut world = WorldState::new(seed, chunk_size);
        for (chunk, kinds) in ores {
            world.set_chunk_ores(chunk, kinds);
        }
        for (chunk, list) in structures {
            world.set_chunk_structures(chunk, list);
        }
        for building in buildings {
            world.add_building(building);
        }
        for (chunk, grid) in noise {
            world.insert_noise_chunk(chunk, grid)?;
        }
        Ok(world)
    }

    fn read_noise<R: Read>(
        &self,
        r: &mut ByteReader<R>,
    ) -> Result<(u32, BTreeMap<Point, NoiseGrid>), PersistError> {
        // A non-negative i32 always fits.
        let chunk_size = r.count("chunk size")? as u32;
        tracing::debug!(chunk_size, "noise section");
        if let Some(expected) = self.options.expected_chunk_size {
            if expected != chunk_size {
                tracing::warn!(found = chunk_size, expected, "chunk size mismatch");
                return Err(PersistError::ChunkSizeMismatch {
                    found: chunk_size,
                    expected,
                });
            }
        }

        let side = chunk_size as usize;
        let per_chunk = side.checked_mul(side).ok_or(PersistError::CountOverflow {
            field: "noise samples per chunk",
            len: u64::from(chunk_size) * u64::from(chunk_size),
        })?;

        let count = r.count("noise chunk count")?;
        let mut chunks = BTreeMap::new();
        for _ in 0..count {
            let at = r.offset();
            let chunk = r.point("noise chunk coordinate")?;
            let rows = r.i32("noise row count")?;
            if i64::from(rows) != i64::from(chunk_size) {
                return Err(PersistError::RowCountMismatch {
                    chunk,
                    rows,
                    chunk_size,
                });
            }
            let mut samples = Vec::with_capacity(per_chunk.min(MAX_PREALLOC));
            for _ in 0..per_chunk {
                samples.push(r.f32("noise sample")?);
            }
            let grid = NoiseGrid::from_samples(side, samples)?;
            if chunks.insert(chunk, grid).is_some() {
                return Err(PersistError::DuplicateChunk {
                    section: "noise",
                    chunk,
                    offset: at,
                });
            }
        }
        tracing::debug!(chunks = chunks.len(), "read noise section");
        Ok((chunk_size, chunks))
    }
}

fn write_ores<W: Write>(w: &mut ByteWriter<W>, world: &WorldState) -> Result<(), PersistError> {
    w.count(world.ores().len(), "ore chunk count")?;
    for (&chunk, kinds) in world.ores() {
        w.point(chunk)?;
        w.count(kinds.len(), "ore kind count")?;
        for (kind, locations) in kinds {
            w.u8(kind.tag())?;
            w.points(locations, "ore point count")?;
        }
    }
    tracing::debug!(chunks = world.ores().len(), "wrote ore section");
    Ok(())
}

fn write_structures<W: Write>(
    w: &mut ByteWriter<W>,
    world: &WorldState,
) -> Result<(), PersistError> {
    w.count(world.structures().len(), "structure chunk count")?;
    for (&chunk, list) in world.structures() {
        w.point(chunk)?;
        w.count(list.len(), "structure count")?;
        for structure in list {
            w.i32(structure.structure_type)?;
            w.point(structure.position)?;
            w.points(&structure.points, "structure footprint length")?;
        }
    }
    tracing::debug!(chunks = world.structures().len(), "wrote structure section");
    Ok(())
}

fn write_buildings<W: Write>(
    w: &mut ByteWriter<W>,
    world: &WorldState,
) -> Result<(), PersistError> {
    w.count(world.buildings().len(), "building count")?;
    for building in world.buildings() {
        w.point(building.position)?;
        w.points(&building.points, "building footprint length")?;
    }
    tracing::debug!(buildings = world.buildings().len(), "wrote building section");
    Ok(())
}

fn write_noise<W: Write>(w: &mut ByteWriter<W>, world: &WorldState) -> Result<(), PersistError> {
    let chunk_size = i32::try_from(world.chunk_size()).map_err(|_| PersistError::CountOverflow {
        field: "chunk size",
        len: u64::from(world.chunk_size()),
    })?;
    w.i32(chunk_size)?;
    w.count(world.noise_chunks().len(), "noise chunk count")?;
    for (&chunk, grid) in world.noise_chunks() {
        let side = grid.size();
        if side.checked_mul(side) != Some(grid.samples().len()) {
            return Err(KernelError::GridShape {
                size: side,
                detail: format!("chunk {chunk} holds {} samples", grid.samples().len()),
            }
            .into());
        }
        w.point(chunk)?;
        w.count(side, "noise row count")?;
        for &sample in grid.samples() {
            w.f32(sample)?;
        }
    }
    tracing::debug!(chunks = world.noise_chunks().len(), chunk_size, "wrote noise section");
    Ok(())
}

fn read_ores<R: Read>(
    r: &mut ByteReader<R>,
) -> Result<BTreeMap<Point, ChunkOres>, PersistError> {
    let count = r.count("ore chunk count")?;
    let mut ores = BTreeMap::new();
    for _ in 0..count {
        let at = r.offset();
        let chunk = r.point("ore chunk coordinate")?;
        let kind_count = r.count("ore kind count")?;
        let mut kinds = ChunkOres::new();
        for _ in 0..kind_count {
            let tag_at = r.offset();
            let tag = r.u8("ore kind tag")?;
            let kind = OreKind::from_tag(tag).ok_or(PersistError::UnknownOreKind {
                tag,
                offset: tag_at,
            })?;
            let locations = r.points("ore point count")?;
            if kinds.insert(kind, locations).is_some() {
                return Err(PersistError::DuplicateOreKind {
                    chunk,
                    kind,
                    offset: tag_at,
                });
            }
        }
        if ores.insert(chunk, kinds).is_some() {
            return Err(PersistError::DuplicateChunk {
                section: "ore",
                chunk,
                offset: at,
            });
        }
    }
    tracing::debug!(chunks = ores.len(), "read ore section");
    Ok(ores)
}

fn read_structures<R: Read>(
    r: &mut ByteReader<R>,
) -> Result<BTreeMap<Point, Vec<Structure>>, PersistError> {
    let count = r.count("structure chunk count")?;
    let mut structures = BTreeMap::new();
    for _ in 0..count {
        let at = r.offset();
        let chunk = r.point("structure chunk coordinate")?;
        let len = r.count("structure count")?;
        let mut list = Vec::with_capacity(len.min(MAX_PREALLOC));
        for _ in 0..len {
            let structure_type = r.i32("structure type")?;
            let position = r.point("structure position")?;
            let points = r.points("structure footprint length")?;
            list.push(Structure::new(structure_type, position, points));
        }
        if structures.insert(chunk, list).is_some() {
            return Err(PersistError::DuplicateChunk {
                section: "structure",
                chunk,
                offset: at,
            });
        }
    }
    tracing::debug!(chunks = structures.len(), "read structure section");
    Ok(structures)
}

fn read_buildings<R: Read>(r: &mut ByteReader<R>) -> Result<Vec<Building>, PersistError> {
    let count = r.count("building count")?;
    let mut buildings = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        let position = r.point("building position")?;
        let points = r.points("building footprint length")?;
        buildings.push(Building::new(position, points));
    }
    tracing::debug!(buildings = buildings.len(), "read building section");
    Ok(buildings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldmap_kernel::SampleWorld;

    fn small_world() -> WorldState {
        let mut world = WorldState::new(-12345, 2);
        world.add_ore(Point::new(0, 0), OreKind::Gold, Point::new(1, 1));
        world.add_ore(Point::new(0, 0), OreKind::Coal, Point::new(0, 1));
        world.add_ore(Point::new(0, 0), OreKind::Coal, Point::new(1, 0));
        world.add_ore(Point::new(-1, 3), OreKind::Diamond, Point::new(-2, 7));
        world.add_structure(
            Point::new(-1, 3),
            Structure::new(3, Point::new(-2, 6), vec![Point::new(-2, 6), Point::new(-1, 6)]),
        );
        world.add_structure(Point::new(-1, 3), Structure::new(0, Point::new(-1, 7), vec![]));
        world.add_building(Building::new(
            Point::new(4, 4),
            vec![Point::new(5, 4), Point::new(4, 4), Point::new(4, 5)],
        ));
        world
            .insert_noise_chunk(
                Point::new(0, 0),
                NoiseGrid::from_rows(vec![vec![0.25, -0.5], vec![1.0e-7, 3.5]]).unwrap(),
            )
            .unwrap();
        world
            .insert_noise_chunk(Point::new(-1, 3), NoiseGrid::filled(2, -0.0))
            .unwrap();
        world
    }

    fn encode(world: &WorldState) -> Vec<u8> {
        WorldCodec::new().encode_to_vec(world).unwrap()
    }

    #[test]
    fn roundtrip_identity() {
        let world = small_world();
        let bytes = encode(&world);
        let decoded = WorldCodec::new().decode_slice(&bytes).unwrap();
        assert_eq!(decoded, world);
    }

    #[test]
    fn roundtrip_sample_world() {
        let world = SampleWorld {
            seed: 99,
            chunk_size: 8,
            radius: 2,
        }
        .build()
        .unwrap();
        let decoded = WorldCodec::new().decode_slice(&encode(&world)).unwrap();
        assert_eq!(decoded, world);
        assert_eq!(decoded.summary(), world.summary());
    }

    #[test]
    fn exact_byte_layout() {
        let mut world = WorldState::new(7, 1);
        world.add_ore(Point::new(1, 2), OreKind::Iron, Point::new(3, 4));
        world.add_building(Building::new(Point::new(5, 6), vec![Point::new(5, 6)]));
        world
            .insert_noise_chunk(Point::new(0, -1), NoiseGrid::filled(1, 0.5))
            .unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(b"MAP\0");
        let ints = |v: &mut Vec<u8>, values: &[i32]| {
            for x in values {
                v.extend_from_slice(&x.to_le_bytes());
            }
        };
        ints(&mut expected, &[7]);
        ints(&mut expected, &[1, 1, 2, 1]);
        expected.push(1);
        ints(&mut expected, &[1, 3, 4]);
        ints(&mut expected, &[0]);
        ints(&mut expected, &[1, 5, 6, 1, 5, 6]);
        ints(&mut expected, &[1, 1, 0, -1, 1]);
        expected.extend_from_slice(&0.5f32.to_le_bytes());

        assert_eq!(encode(&world), expected);
    }

    #[test]
    fn empty_world_is_28_bytes() {
        let world = WorldState::new(5, 16);
        let bytes = encode(&world);
        assert_eq!(bytes.len(), 4 + 4 + 4 + 4 + 4 + 4 + 4);
        assert_eq!(&bytes[..4], &MAGIC);
        assert_eq!(&bytes[20..24], &16i32.to_le_bytes());

        let decoded = WorldCodec::new().decode_slice(&bytes).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(decoded, world);
    }

    #[test]
    fn encoded_len_matches_output() {
        let world = small_world();
        assert_eq!(WorldCodec::encoded_len(&world), encode(&world).len() as u64);
        let empty = WorldState::new(0, 4);
        assert_eq!(WorldCodec::encoded_len(&empty), 28);
    }

    #[test]
    fn encode_returns_bytes_written() {
        let world = small_world();
        let mut sink = Vec::new();
        let written = WorldCodec::new().encode(&world, &mut sink).unwrap();
        assert_eq!(written, sink.len() as u64);
    }

    #[test]
    fn encoding_is_independent_of_insertion_order() {
        let mut a = WorldState::new(1, 1);
        let mut b = WorldState::new(1, 1);
        for (chunk, kind) in [(Point::new(2, 0), OreKind::Iron), (Point::new(-3, 1), OreKind::Coal)] {
            a.add_ore(chunk, kind, Point::new(9, 9));
        }
        for (chunk, kind) in [(Point::new(-3, 1), OreKind::Coal), (Point::new(2, 0), OreKind::Iron)] {
            b.add_ore(chunk, kind, Point::new(9, 9));
        }
        assert_eq!(encode(&a), encode(&b));
    }

    #[test]
    fn bad_signature_rejected() {
        let mut bytes = encode(&small_world());
        for i in 0..4 {
            let original = bytes[i];
            bytes[i] ^= 0x20;
            match WorldCodec::new().decode(&bytes[..]) {
                Err(PersistError::BadSignature { found, expected }) => {
                    assert_eq!(expected, MAGIC);
                    assert_eq!(found[i], original ^ 0x20);
                }
                other => panic!("expected BadSignature, got {other:?}"),
            }
            bytes[i] = original;
        }
    }

    #[test]
    fn bad_signature_checked_before_anything_else() {
        // Nothing follows the signature; a reader that went further would
        // report truncation instead.
        let err = WorldCodec::new().decode(&b"PAM\0"[..]).unwrap_err();
        assert!(matches!(err, PersistError::BadSignature { .. }));
    }

    #[test]
    fn truncation_at_every_boundary_fails() {
        let bytes = encode(&small_world());
        for len in 0..bytes.len() {
            let err = WorldCodec::new().decode(&bytes[..len]).unwrap_err();
            assert!(err.is_truncation(), "len {len}: {err:?}");
        }
        assert!(WorldCodec::new().decode(&bytes[..]).is_ok());
    }

    #[test]
    fn unknown_ore_tag_rejected() {
        let mut world = WorldState::new(0, 1);
        world.add_ore(Point::new(0, 0), OreKind::Coal, Point::new(0, 0));
        let mut bytes = encode(&world);
        // signature, seed, chunk count, chunk x/y, kind count
        let tag_offset = 4 + 4 + 4 + 8 + 4;
        assert_eq!(bytes[tag_offset], OreKind::Coal.tag());
        bytes[tag_offset] = 200;

        match WorldCodec::new().decode(&bytes[..]) {
            Err(PersistError::UnknownOreKind { tag, offset }) => {
                assert_eq!(tag, 200);
                assert_eq!(offset, tag_offset as u64);
            }
            other => panic!("expected UnknownOreKind, got {other:?}"),
        }
    }

    #[test]
    fn three_by_three_grid_roundtrips_bit_identical() {
        let rows = vec![
            vec![0.1, -0.2, 0.3],
            vec![f32::MIN_POSITIVE, -0.0, 1.0e30],
            vec![-7.25, 0.333_333_34, f32::EPSILON],
        ];
        let mut world = WorldState::new(3, 3);
        world
            .insert_noise_chunk(Point::new(4, -4), NoiseGrid::from_rows(rows.clone()).unwrap())
            .unwrap();

        let decoded = WorldCodec::new().decode_slice(&encode(&world)).unwrap();
        let grid = decoded.noise_chunk(Point::new(4, -4)).unwrap();
        assert_eq!(grid.size(), 3);
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                assert_eq!(grid.get(r, c).unwrap().to_bits(), value.to_bits());
            }
        }
    }

    #[test]
    fn stored_chunk_size_is_authoritative() {
        let mut world = WorldState::new(0, 5);
        world
            .insert_noise_chunk(Point::ORIGIN, NoiseGrid::filled(5, 1.0))
            .unwrap();
        let decoded = WorldCodec::new().decode_slice(&encode(&world)).unwrap();
        assert_eq!(decoded.chunk_size(), 5);
        assert_eq!(decoded.noise_chunk(Point::ORIGIN).unwrap().size(), 5);
    }

    #[test]
    fn strict_chunk_size_option() {
        let bytes = encode(&WorldState::new(0, 16));
        let strict = WorldCodec::with_options(DecodeOptions {
            expected_chunk_size: Some(32),
        });
        assert!(matches!(
            strict.decode_slice(&bytes),
            Err(PersistError::ChunkSizeMismatch {
                found: 16,
                expected: 32
            })
        ));
        let matching = WorldCodec::with_options(DecodeOptions {
            expected_chunk_size: Some(16),
        });
        assert!(matching.decode_slice(&bytes).is_ok());
    }

    #[test]
    fn row_count_mismatch_rejected() {
        let mut world = WorldState::new(0, 1);
        world
            .insert_noise_chunk(Point::ORIGIN, NoiseGrid::filled(1, 0.0))
            .unwrap();
        let mut bytes = encode(&world);
        // The row count sits just before the single trailing sample.
        let rows_at = bytes.len() - 8;
        bytes[rows_at..rows_at + 4].copy_from_slice(&2i32.to_le_bytes());
        assert!(matches!(
            WorldCodec::new().decode_slice(&bytes),
            Err(PersistError::RowCountMismatch {
                rows: 2,
                chunk_size: 1,
                ..
            })
        ));
    }

    fn header(w: &mut ByteWriter<&mut Vec<u8>>) {
        w.bytes(&MAGIC).unwrap();
        w.i32(0).unwrap();
    }

    #[test]
    fn duplicate_ore_chunk_rejected() {
        let mut bytes = Vec::new();
        let mut w = ByteWriter::new(&mut bytes);
        header(&mut w);
        w.i32(2).unwrap();
        for _ in 0..2 {
            w.point(Point::new(1, 1)).unwrap();
            w.i32(0).unwrap();
        }
        assert!(matches!(
            WorldCodec::new().decode(&bytes[..]),
            Err(PersistError::DuplicateChunk { section: "ore", offset: 24, .. })
        ));
    }

    #[test]
    fn duplicate_ore_kind_rejected() {
        let mut bytes = Vec::new();
        let mut w = ByteWriter::new(&mut bytes);
        header(&mut w);
        w.i32(1).unwrap();
        w.point(Point::ORIGIN).unwrap();
        w.i32(2).unwrap();
        for _ in 0..2 {
            w.u8(OreKind::Iron.tag()).unwrap();
            w.i32(0).unwrap();
        }
        assert!(matches!(
            WorldCodec::new().decode(&bytes[..]),
            Err(PersistError::DuplicateOreKind {
                kind: OreKind::Iron,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_structure_chunk_rejected() {
        let mut bytes = Vec::new();
        let mut w = ByteWriter::new(&mut bytes);
        header(&mut w);
        w.i32(0).unwrap();
        w.i32(2).unwrap();
        for _ in 0..2 {
            w.point(Point::new(-2, 5)).unwrap();
            w.i32(0).unwrap();
        }
        match WorldCodec::new().decode(&bytes[..]) {
            Err(PersistError::DuplicateChunk {
                section,
                chunk,
                offset,
            }) => {
                assert_eq!(section, "structure");
                assert_eq!(chunk, Point::new(-2, 5));
                assert_eq!(offset, 28);
            }
            other => panic!("expected DuplicateChunk, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_noise_chunk_rejected() {
        let mut bytes = Vec::new();
        let mut w = ByteWriter::new(&mut bytes);
        header(&mut w);
        for _ in 0..3 {
            w.i32(0).unwrap();
        }
        w.i32(1).unwrap();
        w.i32(2).unwrap();
        for _ in 0..2 {
            w.point(Point::new(0, 1)).unwrap();
            w.i32(1).unwrap();
            w.f32(0.75).unwrap();
        }
        match WorldCodec::new().decode(&bytes[..]) {
            Err(PersistError::DuplicateChunk {
                section,
                chunk,
                offset,
            }) => {
                assert_eq!(section, "noise");
                assert_eq!(chunk, Point::new(0, 1));
                assert_eq!(offset, 44);
            }
            other => panic!("expected DuplicateChunk, got {other:?}"),
        }
    }

    #[test]
    fn negative_chunk_size_rejected() {
        let mut bytes = Vec::new();
        let mut w = ByteWriter::new(&mut bytes);
        header(&mut w);
        for _ in 0..3 {
            w.i32(0).unwrap();
        }
        w.i32(-1).unwrap();
        w.i32(0).unwrap();
        assert!(matches!(
            WorldCodec::new().decode(&bytes[..]),
            Err(PersistError::NegativeCount {
                field: "chunk size",
                value: -1,
                offset: 20,
            })
        ));
    }

    #[test]
    fn deserialized_grid_encodes_to_declared_length() {
        assert!(serde_json::from_str::<NoiseGrid>(r#"{"size":3,"samples":[1.0]}"#).is_err());

        let grid: NoiseGrid = serde_json::from_str(r#"{"size":2,"samples":[1.0,2.0,3.0,4.0]}"#)
            .unwrap();
        let mut world = WorldState::new(1, 2);
        world.insert_noise_chunk(Point::new(1, 1), grid).unwrap();
        let bytes = encode(&world);
        assert_eq!(bytes.len() as u64, WorldCodec::encoded_len(&world));
        assert_eq!(WorldCodec::new().decode_slice(&bytes).unwrap(), world);
    }

    #[test]
    fn negative_count_rejected() {
        let mut bytes = Vec::new();
        let mut w = ByteWriter::new(&mut bytes);
        header(&mut w);
        w.i32(0).unwrap();
        w.i32(-4).unwrap();
        assert!(matches!(
            WorldCodec::new().decode(&bytes[..]),
            Err(PersistError::NegativeCount {
                field: "structure chunk count",
                value: -4,
                offset: 12,
            })
        ));
    }

    #[test]
    fn trailing_data_rejected_only_by_complete_decode() {
        let world = small_world();
        let mut bytes = encode(&world);
        bytes.extend_from_slice(&[1, 2, 3]);
        assert_eq!(WorldCodec::new().decode(&bytes[..]).unwrap(), world);
        assert!(matches!(
            WorldCodec::new().decode_slice(&bytes),
            Err(PersistError::TrailingData { extra: 3, .. })
        ));
    }

    #[test]
    fn empty_chunk_entries_roundtrip() {
        let mut world = WorldState::new(0, 1);
        world.set_chunk_ores(Point::new(3, 3), ChunkOres::new());
        world.set_chunk_structures(Point::new(3, 3), Vec::new());
        let decoded = WorldCodec::new().decode_slice(&encode(&world)).unwrap();
        assert_eq!(decoded, world);
        assert!(decoded.ores_in(Point::new(3, 3)).unwrap().is_empty());
    }
}
