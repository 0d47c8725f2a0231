//! # Document Renderers
//!
//! A renderer turns a [`ReportDocument`] into a file. The report generator builds
//! documents without knowing the output format; the presentation layer picks a
//! renderer and a destination.

pub mod json;
pub mod pdf;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::report::ReportDocument;

pub use json::JsonRenderer;
pub use pdf::PdfRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to build PDF: {0}")]
    Pdf(String),

    #[error("table row {row} has {found} cells but the table has {expected} columns")]
    RaggedTable {
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Font used for every text element of a report.
///
/// `data` holds the TrueType bytes when the configured font file was loaded; without
/// it renderers fall back to a built-in face.
#[derive(Debug, Clone, PartialEq)]
pub struct FontFace {
    pub family: String,
    pub data: Option<Vec<u8>>,
}

impl FontFace {
    pub fn fallback(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            data: None,
        }
    }
}

pub trait DocumentRenderer {
    /// File extension of the produced files, without the dot
    fn extension(&self) -> &'static str;

    fn render(&self, document: &ReportDocument, font: &FontFace, path: &Path)
        -> Result<(), RenderError>;
}

/// Write rendered output through a temp file so a failed render never leaves a
/// truncated report behind
pub(crate) fn write_output(path: &Path, content: &[u8]) -> Result<(), RenderError> {
    let io_error = |source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, content).map_err(io_error)?;
    std::fs::rename(&temp_path, path).map_err(io_error)
}
