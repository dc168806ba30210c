use std::path::PathBuf;

use thiserror::Error;

/// Loader and exporter failures.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot read spreadsheet {path}: {source}")]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("cannot write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported file type \"{extension}\" for {path} (expected csv, tsv, txt, xlsx, xlsm, xls, xlsb, ods or json)")]
    UnsupportedExtension { path: PathBuf, extension: String },

    #[error("{path}: {message}")]
    Shape { path: PathBuf, message: String },
}

impl IoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn shape(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Shape { path: path.into(), message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, IoError>;
