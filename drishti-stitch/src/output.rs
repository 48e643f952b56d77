//! Durable storage for stitched panoramas.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Reference to a persisted panorama.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRef {
    /// Generated identifier, `pano-<unix-ms>-<hex>`
    pub id: String,
    pub path: PathBuf,
}

/// Writes panoramas into a directory under generated identifiers.
#[derive(Clone, Debug)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an encoded JPEG and return its reference.
    pub fn persist(&self, jpeg: &[u8]) -> std::io::Result<OutputRef> {
        std::fs::create_dir_all(&self.dir)?;
        let id = generate_id();
        let path = self.dir.join(format!("{id}.jpg"));

        let partial = self.dir.join(format!(".{id}.partial"));
        write_then_rename(&partial, &path, jpeg)?;

        tracing::info!("Saved panorama {} ({} bytes)", path.display(), jpeg.len());
        Ok(OutputRef { id, path })
    }

    /// Path a reference id resolves to.
    pub fn resolve(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.jpg"))
    }
}

/// Readers never see a partial file; it is removed if either step fails.
fn write_then_rename(partial: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let result = std::fs::write(partial, bytes).and_then(|()| std::fs::rename(partial, path));
    if let Err(e) = &result {
        tracing::warn!("Discarding {}: {}", partial.display(), e);
        if let Err(cleanup) = std::fs::remove_file(partial)
            && cleanup.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!("Could not remove {}: {}", partial.display(), cleanup);
        }
    }
    result
}

fn generate_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("pano-{}-{:08x}", millis, rand::random::<u32>())
}
