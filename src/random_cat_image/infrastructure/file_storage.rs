use super::error::InfrastructureError;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// Writes decoded images to disk.
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Saves under the storage root, creating it if missing.
    pub async fn save_named(&self, file_name: &str, data: &[u8]) -> Result<PathBuf, InfrastructureError> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name == ".." {
            return Err(InfrastructureError::FileStorageError(format!(
                "invalid file name: {:?}",
                file_name
            )));
        }
        fs::create_dir_all(&self.root).await?;
        let path = self.root.join(file_name);
        save_image(&path, data).await?;
        Ok(path)
    }
}

/// Saves to an explicit path, as given on the command line.
pub async fn save_image(path: &Path, data: &[u8]) -> Result<(), InfrastructureError> {
    let mut file = File::create(path).await.map_err(InfrastructureError::IoError)?;
    file.write_all(data).await.map_err(InfrastructureError::IoError)?;
    file.flush().await?;
    Ok(())
}
