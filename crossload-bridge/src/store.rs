// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Persistent record of the last successfully installed version.
//!
//! Read once at the start of a run, written once after a fully finalized
//! install. A crash anywhere before that write leaves the old version on
//! disk, so the next run sees "update needed" again and retries the whole
//! run; no partial-version state is representable.

use std::fs;
use std::path::PathBuf;

use log::debug;

use crate::error::StoreError;

pub trait VersionStore {
    /// The last installed version, or 0 if none was ever recorded.
    fn load(&mut self) -> Result<u32, StoreError>;

    fn store(&mut self, version: u32) -> Result<(), StoreError>;
}

/// Version store backed by a decimal text file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl VersionStore for FileStore {
    fn load(&mut self) -> Result<u32, StoreError> {
        if !self.path.exists() {
            debug!("no version file at {}, assuming 0", self.path.display());
            return Ok(0);
        }
        let text = fs::read_to_string(&self.path)?;
        text.trim()
            .parse::<u32>()
            .map_err(|_| StoreError::Corrupt(text.trim().to_string()))
    }

    fn store(&mut self, version: u32) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // Write-then-rename so an interrupted write cannot leave a
        // half-written version behind.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, format!("{version}\n"))?;
        fs::rename(&tmp, &self.path)?;
        debug!("stored version {version} in {}", self.path.display());
        Ok(())
    }
}
