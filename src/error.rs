//! Error types for the invoice layout engine.

use std::io;
use thiserror::Error;

/// Result type alias for invoice-forge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while composing or writing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// The logo (or another raster) could not be decoded.
    ///
    /// Recovered by the engine: the header band is rendered without a logo.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// A zero-sized image or target width was passed to the fitter.
    #[error("Invalid image geometry: {0}")]
    InvalidImage(String),

    /// A table's shape is inconsistent: bad weights, spans or row coverage.
    #[error("Invalid layout: {0}")]
    InvalidLayout(#[from] LayoutError),

    /// The invoice configuration cannot produce a document.
    #[error("Invalid invoice config: {0}")]
    InvalidConfig(String),

    /// An operation was attempted on a document that is already closed.
    #[error("Document is closed")]
    DocumentClosed,

    /// The build was aborted; the sink was released and no output was kept.
    #[error("Document build failed: {source}")]
    DocumentBuildFailed {
        #[source]
        source: Box<Error>,
    },

    /// I/O error while writing the output file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invoice config or layout JSON could not be (de)serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The PDF renderer rejected the layout.
    #[error("Rendering error: {0}")]
    Render(String),
}

/// Structural table problems, all reported as [`Error::InvalidLayout`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("a table needs at least one column")]
    NoColumns,

    #[error("column weights must be positive and finite, got {0}")]
    BadWeight(f32),

    #[error("{given} column widths given for {columns} columns")]
    WidthCount { given: usize, columns: usize },

    /// Colspans plus columns held by open rowspans differ from the column
    /// count.
    #[error("row {row}: expected {expected} columns, got {actual}")]
    Coverage {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("row {row}: colspan and rowspan must be at least 1 (got {colspan}×{rowspan})")]
    ZeroSpan {
        row: usize,
        colspan: usize,
        rowspan: usize,
    },

    #[error("row {row}: colspan {colspan} is wider than the {columns}-column table")]
    SpanTooWide {
        row: usize,
        colspan: usize,
        columns: usize,
    },

    #[error("row {row}: rowspan extends past the last row ({rows} rows)")]
    DanglingRowspan { row: usize, rows: usize },

    /// A rowspan starting in the header (or body) reaches into the next
    /// section, which would break header/footer repetition.
    #[error("row {row}: rowspan crosses the end of the {section} rows")]
    SpanCrossesSection { row: usize, section: &'static str },

    #[error("{header} header + {footer} footer rows exceed {rows} total rows")]
    SectionOverflow {
        header: usize,
        footer: usize,
        rows: usize,
    },
}

impl Error {
    /// Wrap `self` as the cause of a failed build.
    pub fn into_build_failure(self) -> Self {
        match self {
            e @ Error::DocumentBuildFailed { .. } => e,
            e => Error::DocumentBuildFailed {
                source: Box::new(e),
            },
        }
    }

    /// The innermost cause of a build failure (or `self`).
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::DocumentBuildFailed { source } => source.root_cause(),
            e => e,
        }
    }
}
