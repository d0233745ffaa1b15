// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::zone::{ZoneConfig, SLOT_LEN};
use log::warn;
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

/// Settings persistence error types.
#[derive(Debug)]
pub enum Error {
    /// I/O error from the underlying storage
    Io(io::Error),
    /// Persisted slot has the wrong size
    InvalidSlot(usize),
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::InvalidSlot(len) => write!(f, "invalid settings slot size: {}", len),
        }
    }
}

/// Persistence contract for the fixed-size settings slot.
///
/// The core only reads and writes the [SLOT_LEN] bytes; where they live and
/// what surrounds them belongs to the store implementation.
pub trait SettingsStore {
    /// Read the persisted slot.
    fn load(&self) -> Result<[u8; SLOT_LEN], Error>;
    /// Commit the slot to durable storage.
    fn save(&mut self, slot: &[u8; SLOT_LEN]) -> Result<(), Error>;
}

/// File-backed settings store.  A missing file loads as the default
/// configuration slot so a fresh install starts with a usable zone.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store persisting to `path`.
    pub fn new(path: impl AsRef<Path>) -> FileStore {
        FileStore {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SettingsStore for FileStore {
    fn load(&self) -> Result<[u8; SLOT_LEN], Error> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(
                    "settings file {} not found, using defaults",
                    self.path.display()
                );
                return Ok(ZoneConfig::default().to_slot());
            }
            Err(err) => return Err(Error::Io(err)),
        };

        match <[u8; SLOT_LEN]>::try_from(data.as_slice()) {
            Ok(slot) => Ok(slot),
            Err(_) => Err(Error::InvalidSlot(data.len())),
        }
    }

    fn save(&mut self, slot: &[u8; SLOT_LEN]) -> Result<(), Error> {
        fs::write(&self.path, slot)?;
        Ok(())
    }
}

/// In-memory settings store for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: [u8; SLOT_LEN],
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<[u8; SLOT_LEN], Error> {
        Ok(self.slot)
    }

    fn save(&mut self, slot: &[u8; SLOT_LEN]) -> Result<(), Error> {
        self.slot = *slot;
        Ok(())
    }
}
