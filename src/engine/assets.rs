//! Pre-recorded asset fallback
//!
//! Recorded identifiers bypass synthesis and return the raw bytes of a file
//! from the asset directory. A missing file is reported; synthesis is never
//! attempted as a substitute.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::engine::request::RecordedAsset;
use crate::error::{Result, SynthError};

/// Directory of pre-recorded sound files
#[derive(Debug, Clone)]
pub struct AssetLibrary {
    root: PathBuf,
}

impl AssetLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of an asset, whether or not it exists
    pub fn path_of(&self, asset: RecordedAsset) -> PathBuf {
        self.root.join(asset.file_name())
    }

    /// Raw bytes of an asset
    pub fn load(&self, asset: RecordedAsset) -> Result<Vec<u8>> {
        let path = self.path_of(asset);
        if !path.is_file() {
            warn!(path = %path.display(), "recorded asset not found");
            return Err(SynthError::MissingAsset {
                path: path.display().to_string(),
            });
        }
        let bytes = fs::read(&path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "loaded recorded asset");
        Ok(bytes)
    }

    /// Assets present on disk
    pub fn available(&self) -> Vec<RecordedAsset> {
        RecordedAsset::ALL
            .iter()
            .copied()
            .filter(|&asset| self.path_of(asset).is_file())
            .collect()
    }
}
