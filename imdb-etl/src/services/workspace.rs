//! Working folder bookkeeping: raw sources and result artifacts

use std::path::{Path, PathBuf};

use imdb_common::config::{ensure_dir, RootFolderInitializer};
use tracing::info;

use crate::error::EtlResult;

#[derive(Debug, Clone)]
pub struct Workspace {
    folders: RootFolderInitializer,
    raw_folder: PathBuf,
    result_folder: PathBuf,
}

impl Workspace {
    pub fn from_initializer(initializer: &RootFolderInitializer) -> Self {
        Self {
            folders: initializer.clone(),
            raw_folder: initializer.raw_folder(),
            result_folder: initializer.result_folder(),
        }
    }

    pub fn raw_folder(&self) -> &Path {
        &self.raw_folder
    }

    pub fn result_folder(&self) -> &Path {
        &self.result_folder
    }

    /// Create the root and both working folders if missing
    pub fn ensure(&self) -> EtlResult<()> {
        self.folders.ensure_working_folders()?;
        Ok(())
    }

    /// Number of files in the result folder (0 when it does not exist)
    pub fn result_file_count(&self) -> EtlResult<usize> {
        if !self.result_folder.is_dir() {
            return Ok(0);
        }
        let mut count = 0;
        for entry in std::fs::read_dir(&self.result_folder)? {
            if entry?.file_type()?.is_file() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Delete everything in the result folder and recreate it empty
    pub fn clear_results(&self) -> EtlResult<()> {
        if self.result_folder.exists() {
            std::fs::remove_dir_all(&self.result_folder)?;
            info!("Cleared result folder {}", self.result_folder.display());
        }
        ensure_dir(&self.result_folder)?;
        Ok(())
    }

    /// Delete every entry of the raw folder, then the folder itself
    ///
    /// `on_removed` is called for each deleted path, the folder last.
    pub fn remove_raw_sources(&self, mut on_removed: impl FnMut(&Path)) -> EtlResult<usize> {
        if !self.raw_folder.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in std::fs::read_dir(&self.raw_folder)? {
            let path = entry?.path();
            if path.is_dir() {
                std::fs::remove_dir_all(&path)?;
            } else {
                std::fs::remove_file(&path)?;
            }
            removed += 1;
            on_removed(&path);
        }

        std::fs::remove_dir(&self.raw_folder)?;
        on_removed(&self.raw_folder);
        info!(removed, "Removed raw folder {}", self.raw_folder.display());
        Ok(removed)
    }
}
