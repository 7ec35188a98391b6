//! Engine – ties logo loading, page composition and the document lifecycle
//! into a single build call.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::compose::{
    compose_detail_header, compose_header_page, compose_line_items, InvoiceDetails, LineItems,
};
use crate::document::{Document, DocumentState};
use crate::error::{Error, Result};
use crate::image_fit::{load_logo, ImageSource};
use crate::layout_config::LayoutConfig;
use crate::sink::{PdfSink, Sink};
use crate::style::StyleConfig;

/// Width the logo is scaled to, in pixels (rendered at 1 px = 1 pt).
pub const DEFAULT_LOGO_WIDTH: u32 = 130;

/// Everything the caller supplies for one invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceConfig {
    /// Directory the PDF is written to.
    pub output_dir: PathBuf,
    /// File name; `.pdf` is appended when missing.
    pub file_name: String,
    /// Text on the right of the header band; `\n` starts a new line.
    pub right_header: String,
    pub title: String,
    /// Number of identical cover pages before the detail section.
    pub repeat_count: usize,
    pub details: InvoiceDetails,
    /// Logo resource id, resolved through an [`ImageSource`].
    pub logo: Option<String>,
    pub logo_width: u32,
    pub line_items: Option<LineItems>,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_name: "invoice.pdf".to_string(),
            right_header: String::new(),
            title: "SALES INVOICE".to_string(),
            repeat_count: 1,
            details: InvoiceDetails::default(),
            logo: None,
            logo_width: DEFAULT_LOGO_WIDTH,
            line_items: None,
        }
    }
}

impl InvoiceConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// `output_dir/file_name`, with `.pdf` appended when missing.
    pub fn output_path(&self) -> PathBuf {
        output_file_path(&self.output_dir, &self.file_name)
    }
}

/// Join `dir` and `name`, appending `.pdf` when `name` lacks it.
pub fn output_file_path(dir: &Path, name: &str) -> PathBuf {
    if name.ends_with(".pdf") {
        dir.join(name)
    } else {
        dir.join(format!("{name}.pdf"))
    }
}

/// Builds one document end to end. Create a fresh engine per document.
pub struct DocumentEngine<S: Sink> {
    document: Document<S>,
    style: StyleConfig,
}

impl<S: Sink> DocumentEngine<S> {
    pub fn new(sink: S, style: StyleConfig) -> Self {
        Self {
            document: Document::new(sink),
            style,
        }
    }

    pub fn state(&self) -> DocumentState {
        self.document.state()
    }

    pub fn sink(&self) -> &S {
        self.document.sink()
    }

    /// Compose and close the document.
    ///
    /// Returns [`Error::DocumentClosed`] when called on a finished engine.
    /// Any other failure aborts the sink and is reported as
    /// [`Error::DocumentBuildFailed`].
    pub fn build(&mut self, invoice: &InvoiceConfig, images: &dyn ImageSource) -> Result<()> {
        if self.document.state() == DocumentState::Closed {
            return Err(Error::DocumentClosed);
        }
        self.compose(invoice, images).map_err(|e| {
            log::error!("Building '{}' failed: {e}", invoice.file_name);
            self.document.abort();
            e.into_build_failure()
        })
    }

    fn compose(&mut self, invoice: &InvoiceConfig, images: &dyn ImageSource) -> Result<()> {
        if invoice.repeat_count == 0 {
            return Err(Error::InvalidConfig(
                "repeat count must be at least 1".to_string(),
            ));
        }

        let logo = load_logo(images, invoice.logo.as_deref(), invoice.logo_width);
        let cover = compose_header_page(&logo, &invoice.right_header, &invoice.title, &self.style)?;

        for i in 0..invoice.repeat_count {
            self.document.add_all(cover.iter().cloned())?;
            if i != invoice.repeat_count - 1 {
                self.document.new_page()?;
            }
        }

        let details = compose_detail_header(&invoice.details.rows(), &self.style)?;
        self.document.add(Block::Table(details))?;

        if let Some(items) = &invoice.line_items {
            self.document
                .add(Block::Table(compose_line_items(items, &self.style)?))?;
        }

        log::debug!(
            "Composed {} blocks, {} page breaks",
            self.document.block_count(),
            self.document.page_break_count()
        );
        self.document.close()
    }
}

/// Render `invoice` to `invoice.output_path()` and return the path and the
/// paginated layout.
pub fn render_invoice(
    invoice: &InvoiceConfig,
    images: &dyn ImageSource,
) -> Result<(PathBuf, LayoutConfig)> {
    let mut sink = PdfSink::new(invoice.output_path(), &invoice.title);
    {
        let mut engine = DocumentEngine::new(&mut sink, StyleConfig::default());
        engine.build(invoice, images)?;
    }
    let target = sink.target().to_path_buf();
    let layout = sink
        .into_layout()
        .ok_or_else(|| Error::Render("PDF sink closed without a layout".to_string()))?;
    Ok((target, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_fit::MemoryImageSource;
    use crate::sink::{RecordingSink, SinkEvent};

    fn invoice(repeat_count: usize) -> InvoiceConfig {
        InvoiceConfig {
            right_header: "Acme\nStreet".into(),
            repeat_count,
            ..InvoiceConfig::default()
        }
    }

    #[test]
    fn output_path_appends_suffix() {
        let dir = Path::new("/tmp/out");
        assert_eq!(output_file_path(dir, "a"), dir.join("a.pdf"));
        assert_eq!(output_file_path(dir, "a.pdf"), dir.join("a.pdf"));
    }

    #[test]
    fn cover_pages_and_breaks() {
        for k in [1, 2, 5] {
            let mut sink = RecordingSink::new();
            DocumentEngine::new(&mut sink, StyleConfig::default())
                .build(&invoice(k), &MemoryImageSource::new())
                .unwrap();
            let bands = sink.count(|e| matches!(e, SinkEvent::Block(Block::HeaderBand(_))));
            let titles = sink.count(|e| matches!(e, SinkEvent::Block(Block::Title(_))));
            let breaks = sink.count(|e| matches!(e, SinkEvent::PageBreak));
            let tables = sink.count(|e| matches!(e, SinkEvent::Block(Block::Table(_))));
            assert_eq!((bands, titles, breaks, tables), (k, k, k - 1, 1), "k = {k}");
            assert_eq!(sink.events.first(), Some(&SinkEvent::Opened));
            assert_eq!(sink.events.last(), Some(&SinkEvent::Closed));
        }
    }

    #[test]
    fn second_build_fails_closed() {
        let mut sink = RecordingSink::new();
        let mut engine = DocumentEngine::new(&mut sink, StyleConfig::default());
        engine.build(&invoice(1), &MemoryImageSource::new()).unwrap();
        assert!(matches!(
            engine.build(&invoice(1), &MemoryImageSource::new()),
            Err(Error::DocumentClosed)
        ));
    }

    #[test]
    fn zero_repeat_count_fails_before_opening() {
        let mut sink = RecordingSink::new();
        {
            let mut engine = DocumentEngine::new(&mut sink, StyleConfig::default());
            let err = engine
                .build(&invoice(0), &MemoryImageSource::new())
                .unwrap_err();
            assert!(matches!(err.root_cause(), Error::InvalidConfig(_)));
            assert_eq!(engine.state(), DocumentState::Closed);
        }
        assert!(sink.events.is_empty());
    }

    #[test]
    fn sink_failure_aborts() {
        let mut sink = RecordingSink::failing_on_append(3);
        {
            let mut engine = DocumentEngine::new(&mut sink, StyleConfig::default());
            let err = engine
                .build(&invoice(3), &MemoryImageSource::new())
                .unwrap_err();
            assert!(matches!(err, Error::DocumentBuildFailed { .. }));
            assert!(matches!(err.root_cause(), Error::Io(_)));
        }
        assert_eq!(sink.events.last(), Some(&SinkEvent::Aborted));
        assert_eq!(sink.count(|e| matches!(e, SinkEvent::Closed)), 0);
    }

    #[test]
    fn config_from_json_uses_defaults() {
        let config = InvoiceConfig::from_json(
            r#"{ "file_name": "inv", "repeat_count": 3, "details": { "customer": "C1" } }"#,
        )
        .unwrap();
        assert_eq!(config.repeat_count, 3);
        assert_eq!(config.logo_width, DEFAULT_LOGO_WIDTH);
        assert_eq!(config.title, "SALES INVOICE");
        assert_eq!(config.details.customer, "C1");
        assert!(config.output_path().ends_with("inv.pdf"));
    }
}
