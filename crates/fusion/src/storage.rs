//! Persistence of finished artifacts to the public output directory.

use std::path::PathBuf;

use faceswap_core::media;

use crate::poller::Artifact;

/// Writes artifacts under a single root directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

/// Location of an artifact after it was written.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    /// File name relative to the store root; this is what callers receive.
    pub filename: String,
    pub size_bytes: u64,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Write `artifact` under a fresh filename derived from its content type.
    ///
    /// The root directory is created on first use.
    pub async fn save(&self, artifact: &Artifact) -> std::io::Result<StoredArtifact> {
        tokio::fs::create_dir_all(&self.root).await?;

        let extension = media::extension_for_content_type(artifact.content_type.as_deref());
        let filename = media::artifact_filename(&extension);
        let path = self.path_for(&filename);

        tokio::fs::write(&path, &artifact.data).await?;

        tracing::info!(
            filename = %filename,
            size_bytes = artifact.data.len(),
            "Stored fusion artifact",
        );

        Ok(StoredArtifact {
            filename,
            size_bytes: artifact.data.len() as u64,
        })
    }

    /// Delete a previously stored artifact. A missing file is not an error.
    pub async fn remove(&self, filename: &str) -> std::io::Result<()> {
        match tokio::fs::remove_file(self.path_for(filename)).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
