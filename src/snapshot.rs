//! The snapshot file the dashboard reads: a pretty-printed JSON array of
//! [`BidRecord`]s.

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::models::BidRecord;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SnapshotError + '_ {
    move |source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Sibling temp path, so the final rename stays on one filesystem.
fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot.json".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}

/// Replace the snapshot at `path` with `records`.
///
/// The collection is written to a temp file next to the target and renamed
/// over it, so a reader sees either the previous snapshot or the new one.
pub async fn write_snapshot(path: &Path, records: &[BidRecord]) -> Result<(), SnapshotError> {
    let bytes = serde_json::to_vec_pretty(records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(io_error(parent))?;
    }

    let temp_file = temp_path(path);

    let result = async {
        let mut file = tokio::fs::File::create(&temp_file).await?;
        file.write_all(&bytes).await?;
        file.write_all(b"\n").await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&temp_file, path).await
    }
    .await;

    if let Err(e) = result {
        if temp_file.exists() {
            let _ = tokio::fs::remove_file(&temp_file).await;
        }
        return Err(io_error(path)(e));
    }

    tracing::debug!(path = %path.display(), records = records.len(), "Snapshot written");
    Ok(())
}

/// Load a snapshot written by [`write_snapshot`].
pub async fn read_snapshot(path: &Path) -> Result<Vec<BidRecord>, SnapshotError> {
    let bytes = tokio::fs::read(path).await.map_err(io_error(path))?;
    Ok(serde_json::from_slice(&bytes)?)
}
