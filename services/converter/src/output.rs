//! JSON output for the dashboard.

use crate::error::ConvertError;
use crate::model::Measurement;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Write `records` as a pretty-printed JSON array (2-space indent).
///
/// The document is written to a sibling temp file and renamed over `path`,
/// so readers see either the old file or the new one. The destination
/// directory must already exist.
pub async fn write_json(path: &Path, records: &[Measurement]) -> Result<(), ConvertError> {
    let json = serde_json::to_string_pretty(records)?;
    let tmp = temp_path(path);

    if let Err(e) = fs::write(&tmp, json.as_bytes()).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(ConvertError::io(path, e));
    }

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(ConvertError::io(path, e));
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "medicoes.json".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}
