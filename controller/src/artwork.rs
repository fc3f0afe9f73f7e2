//! Local mirror of remote artwork.
//!
//! Files are named after the SHA-256 of the remote base name. Artwork for a given name is assumed
//! to never change, so a file that exists is used as is and never fetched again.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Shown whenever there is no artwork to show.
pub const DEFAULT_ARTWORK: &str = "default.png";

/// Copies a remote file to a local path.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Returns whether `local` was written.
    async fn fetch(&self, remote: &str, local: &Path) -> bool;
}

#[derive(Debug, Clone)]
pub struct ArtworkCache {
    dir: PathBuf,
    placeholder: PathBuf,
}

impl ArtworkCache {
    pub fn new(dir: impl Into<PathBuf>, placeholder: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            placeholder: placeholder.into(),
        }
    }

    pub fn placeholder(&self) -> &Path {
        &self.placeholder
    }

    /// Where the artwork for `remote` is kept locally, fetched or not.
    pub fn local_path(&self, remote: &str) -> PathBuf {
        let name = Path::new(remote)
            .file_name()
            .map_or_else(|| remote.into(), |name| name.to_string_lossy());
        let digest = Sha256::digest(name.as_bytes());
        self.dir.join(format!("{}.png", hex::encode(digest)))
    }

    /// Returns a local file showing the artwork at `remote`.
    ///
    /// Fetches at most once per call, and only if the file is not there yet. Falls back to the
    /// placeholder if the fetch fails.
    pub async fn resolve<F: Fetcher>(&self, remote: &str, fetcher: &F) -> PathBuf {
        let local = self.local_path(remote);
        if local.exists() {
            return local;
        }

        if let Err(err) = std::fs::create_dir_all(&self.dir) {
            log::info!(
                "cannot create artwork cache {}: {err}",
                self.dir.to_string_lossy()
            );
            return self.placeholder.clone();
        }
        if fetcher.fetch(remote, &local).await && local.exists() {
            log::debug!("cached {remote} as {}", local.to_string_lossy());
            local
        } else {
            log::info!("could not fetch artwork {remote}, using placeholder");
            self.placeholder.clone()
        }
    }
}
