//! Advisory locks, one per controlled host.
//!
//! A lock is an empty file named after the host address inside the lock directory. The file
//! existing *is* the lock, nothing else is checked. A crashed instance leaves its marker behind,
//! and it has to be removed by hand.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils::address::HostAddress;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("{0} is already controlled by another instance (remove {1} if it is not)")]
    Contended(HostAddress, PathBuf),
    #[error("no lock is held for {0}")]
    NotFound(HostAddress),
    #[error("cannot access lock marker: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct LockDir {
    dir: PathBuf,
}

impl LockDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Path of the marker for the given host.
    pub fn marker(&self, host: &HostAddress) -> PathBuf {
        self.dir.join(format!("{}.lock", host.file_stem()))
    }

    pub fn is_locked(&self, host: &HostAddress) -> bool {
        self.marker(host).exists()
    }

    /// Creates the marker for `host`.
    ///
    /// # Errors
    /// [`LockError::Contended`] if the marker already exists, [`LockError::Io`] if the directory
    /// or the marker cannot be created.
    pub fn acquire(&self, host: &HostAddress) -> Result<(), LockError> {
        let marker = self.marker(host);
        if marker.exists() {
            return Err(LockError::Contended(host.clone(), marker));
        }
        std::fs::create_dir_all(&self.dir)?;
        match OpenOptions::new().write(true).create_new(true).open(&marker) {
            Ok(_) => {
                log::debug!("locked {host} at {}", marker.to_string_lossy());
                Ok(())
            }
            // Lost a race against another instance
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                Err(LockError::Contended(host.clone(), marker))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Removes the marker for `host`.
    ///
    /// # Errors
    /// [`LockError::NotFound`] if there is no marker.
    pub fn release(&self, host: &HostAddress) -> Result<(), LockError> {
        match std::fs::remove_file(self.marker(host)) {
            Ok(()) => {
                log::debug!("unlocked {host}");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Err(LockError::NotFound(host.clone())),
            Err(err) => Err(err.into()),
        }
    }
}
