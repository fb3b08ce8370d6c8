//! Persistence: the binary map file format and file-level save/load.
//!
//! # Invariants
//! - Encoding is deterministic for a given world.
//! - Decoding either returns a complete world or an error, never a partial
//!   world.
//! - Byte order is little-endian throughout.

mod codec;
mod error;
mod primitives;
mod store;

pub use codec::{DecodeOptions, MAGIC, WorldCodec};
pub use error::PersistError;
pub use store::{DEFAULT_MAP_FILE, MapStore};
