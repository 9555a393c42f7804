//! Error types for the converter library.
//!
//! Only fatal conditions live here. Cells that cannot be coerced to a number
//! or a date are not errors: they degrade to `0` or an absent date.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook has no sheets")]
    NoSheets,

    #[error("sheet '{sheet}' has no header row with a '{column}' column")]
    MissingHeader { sheet: String, column: &'static str },

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
