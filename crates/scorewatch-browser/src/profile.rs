use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Chrome user-data directory for one browser session
pub struct ProfileManager {
    path: PathBuf,
    is_temporary: bool,
}

impl ProfileManager {
    /// Create a temporary profile that will be deleted on drop
    pub fn temporary() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("scorewatch-profile-")
            .tempdir()
            .map_err(|e| Error::Init(format!("Failed to create browser profile: {}", e)))?;

        Ok(Self {
            path: temp_dir.keep(),
            is_temporary: true,
        })
    }

    /// Use a persistent profile at the given path, creating it if needed
    pub fn persistent(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path).map_err(|e| {
                Error::Init(format!(
                    "Failed to create browser profile at {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            path,
            is_temporary: false,
        })
    }

    /// Temporary profile unless a directory is given
    pub fn for_session(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::persistent(path),
            None => Self::temporary(),
        }
    }

    /// Get the profile directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }
}

impl Drop for ProfileManager {
    fn drop(&mut self) {
        if self.is_temporary && self.path.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                tracing::debug!("Failed to remove profile {}: {}", self.path.display(), e);
            }
        }
    }
}
