//! ImageStore — uploaded token images on the local filesystem.
//!
//! Layout under the configured storage root:
//!
//! ```text
//! <storage-root>/
//!   images/
//!     <uuid>.<ext>     # one file per upload, never reused
//! ```
//!
//! The storage root itself is served statically, so a file written here is
//! reachable at `/images/<uuid>.<ext>` as soon as the write completes.

use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::RngCore;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Directory (relative to the storage root) holding uploaded images.
pub const IMAGES_DIR: &str = "images";

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    /// Create `<root>/images` if it does not exist yet.
    pub async fn init(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.images_dir()).await
    }

    /// Open a new image file named after a fresh random id, keeping the
    /// extension of `original_filename`.
    pub async fn create(&self, original_filename: &str) -> anyhow::Result<ImageWriter> {
        let file_name = match file_extension(original_filename) {
            Some(ext) => format!("{}.{}", random_file_name()?, ext),
            None => random_file_name()?,
        };

        self.init()
            .await
            .context("failed to create images directory")?;
        let path = self.images_dir().join(&file_name);
        let file = File::create(&path)
            .await
            .with_context(|| format!("failed to create {}", path.display()))?;

        Ok(ImageWriter {
            file,
            path,
            file_name,
            written: 0,
        })
    }

    /// Delete a previously stored image. A file that is already gone is not an error.
    pub async fn remove(&self, file_name: &str) -> std::io::Result<()> {
        match tokio::fs::remove_file(self.images_dir().join(file_name)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// An image file being written chunk by chunk.
#[derive(Debug)]
pub struct ImageWriter {
    file: File,
    path: PathBuf,
    file_name: String,
    written: u64,
}

impl ImageWriter {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flush the file and return the stored file name.
    pub async fn finish(mut self) -> std::io::Result<StoredImage> {
        self.file.flush().await?;
        Ok(StoredImage {
            file_name: self.file_name,
            size: self.written,
        })
    }

    /// Drop the partially written file.
    pub async fn discard(self) {
        let Self { file, path, .. } = self;
        drop(file);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial image");
        }
    }
}

/// A fully written image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub file_name: String,
    pub size: u64,
}

impl StoredImage {
    /// Path of the image relative to the storage root, as served over HTTP.
    pub fn url_path(&self) -> String {
        format!("{}/{}", IMAGES_DIR, self.file_name)
    }
}

/// Extension of an uploaded file name: the text after its last dot.
///
/// Directory components sent by the client are ignored, and a name
/// without a dot (or ending in one) has no extension.
pub fn file_extension(original_filename: &str) -> Option<&str> {
    let base = original_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_filename);
    base.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// A random (v4) UUID in hyphenated form, read from the OS RNG.
///
/// RNG failure is reported to the caller rather than panicking.
pub fn random_file_name() -> anyhow::Result<String> {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate random file name")?;
    Ok(uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .hyphenated()
        .to_string())
}
