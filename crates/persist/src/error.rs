use worldmap_common::Point;
use worldmap_kernel::{KernelError, OreKind};

/// Errors from encoding, decoding and storing map files.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a map file: signature {found:02x?}, expected {expected:02x?}")]
    BadSignature { found: [u8; 4], expected: [u8; 4] },
    #[error("stream truncated at byte {offset} while reading {field}")]
    Truncated { offset: u64, field: &'static str },
    #[error("unknown ore kind tag {tag} at byte {offset}")]
    UnknownOreKind { tag: u8, offset: u64 },
    #[error("negative {field} {value} at byte {offset}")]
    NegativeCount {
        field: &'static str,
        value: i32,
        offset: u64,
    },
    #[error("duplicate {section} chunk {chunk} at byte {offset}")]
    DuplicateChunk {
        section: &'static str,
        chunk: Point,
        offset: u64,
    },
    #[error("duplicate ore kind {kind:?} in chunk {chunk} at byte {offset}")]
    DuplicateOreKind {
        chunk: Point,
        kind: OreKind,
        offset: u64,
    },
    #[error("noise chunk {chunk} declares {rows} rows, chunk size is {chunk_size}")]
    RowCountMismatch {
        chunk: Point,
        rows: i32,
        chunk_size: u32,
    },
    #[error("chunk size mismatch: file has {found}, expected {expected}")]
    ChunkSizeMismatch { found: u32, expected: u32 },
    #[error("{field} of {len} does not fit in a 32-bit field")]
    CountOverflow { field: &'static str, len: u64 },
    #[error("{extra} trailing bytes after end of map data at byte {offset}")]
    TrailingData { offset: u64, extra: u64 },
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

impl PersistError {
    /// Whether the error means the input ended early.
    pub fn is_truncation(&self) -> bool {
        matches!(self, PersistError::Truncated { .. })
    }
}
