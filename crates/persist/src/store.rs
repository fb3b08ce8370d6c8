//! File-backed map persistence.
//!
//! One world per file. Files are opened for the duration of a single save
//! or load and closed on every exit path. Concurrent access to the same path
//! is not coordinated here.

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use worldmap_kernel::WorldState;

use crate::codec::{DecodeOptions, WorldCodec};
use crate::error::PersistError;

/// File name used when the caller does not choose one.
pub const DEFAULT_MAP_FILE: &str = "map.exd";

/// Saves and loads a [`WorldState`] at a fixed path.
#[derive(Debug, Clone)]
pub struct MapStore {
    path: PathBuf,
    codec: WorldCodec,
}

impl Default for MapStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_FILE)
    }
}

impl MapStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            codec: WorldCodec::new(),
        }
    }

    /// Use `options` when loading.
    pub fn with_options(path: impl AsRef<Path>, options: DecodeOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            codec: WorldCodec::with_options(options),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write `world`, replacing any existing file. Returns bytes written.
    ///
    /// The world is encoded in memory and written to a sibling `.tmp` file
    /// that is renamed over the target, so a failed save leaves the previous
    /// map untouched.
    pub fn save(&self, world: &WorldState) -> Result<u64, PersistError> {
        let bytes = self.codec.encode_to_vec(world)?;
        let tmp = self.temp_path()?;
        if let Err(e) = write_synced(&tmp, &bytes).and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::info!(
            path = %self.path.display(),
            bytes = bytes.len(),
            seed = world.seed(),
            "saved map"
        );
        Ok(bytes.len() as u64)
    }

    /// Read the world stored at the path. The file must contain exactly one
    /// encoded world.
    pub fn load(&self) -> Result<WorldState, PersistError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let world = self.codec.decode_complete(reader)?;
        tracing::info!(
            path = %self.path.display(),
            seed = world.seed(),
            chunk_size = world.chunk_size(),
            "loaded map"
        );
        Ok(world)
    }

    fn temp_path(&self) -> Result<PathBuf, PersistError> {
        let name = self.path.file_name().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "map path has no file name")
        })?;
        let mut tmp = name.to_os_string();
        tmp.push(".tmp");
        Ok(self.path.with_file_name(tmp))
    }

    /// Raw bytes of the stored file.
    pub fn read_bytes(&self) -> Result<Vec<u8>, PersistError> {
        Ok(fs::read(&self.path)?)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
