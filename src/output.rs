use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", dir.display()))
}

/// Write `body` to `dir/file_name`, replacing any previous file.
///
/// The whole buffer goes out in one call and the handle is closed on every path.
pub async fn write_document(dir: &Path, file_name: &str, body: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    tokio::fs::write(&path, body.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
