//! Output sinks: where composed blocks go.
//!
//! A sink is a scoped resource. [`Sink::open`] is called before the first
//! block, and exactly one of [`Sink::close`] or [`Sink::abort`] ends its
//! life. The [`Document`](crate::document::Document) wrapper enforces that
//! order.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::block::Block;
use crate::error::Result;
use crate::layout_config::LayoutConfig;
use crate::pagination::{paginate, FlowItem, PageSetup};
use crate::render::render_pdf;

pub trait Sink {
    /// Acquire the underlying resource.
    fn open(&mut self) -> Result<()>;

    /// Append a block in document order.
    fn append(&mut self, block: &Block) -> Result<()>;

    /// Force the following blocks onto a new page.
    fn page_break(&mut self) -> Result<()>;

    /// Finalise the output and release the resource.
    fn close(&mut self) -> Result<()>;

    /// Release the resource and discard partial output. Must not fail.
    fn abort(&mut self);
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn append(&mut self, block: &Block) -> Result<()> {
        (**self).append(block)
    }

    fn page_break(&mut self) -> Result<()> {
        (**self).page_break()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn abort(&mut self) {
        (**self).abort()
    }
}

// ---------------------------------------------------------------------------
// Recording sink
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Opened,
    Block(Block),
    PageBreak,
    Closed,
    Aborted,
}

/// Keeps every event in memory. Can be told to fail the n-th append to
/// exercise error paths.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
    fail_on_append: Option<usize>,
    appended: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`-th call to `append` (0-based) with an I/O error.
    pub fn failing_on_append(n: usize) -> Self {
        Self {
            fail_on_append: Some(n),
            ..Self::default()
        }
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.events.iter().filter_map(|e| match e {
            SinkEvent::Block(b) => Some(b),
            _ => None,
        })
    }

    pub fn count(&self, pred: impl Fn(&SinkEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Sink for RecordingSink {
    fn open(&mut self) -> Result<()> {
        self.events.push(SinkEvent::Opened);
        Ok(())
    }

    fn append(&mut self, block: &Block) -> Result<()> {
        if self.fail_on_append == Some(self.appended) {
            return Err(io::Error::other(format!("append {} refused", self.appended)).into());
        }
        self.appended += 1;
        self.events.push(SinkEvent::Block(block.clone()));
        Ok(())
    }

    fn page_break(&mut self) -> Result<()> {
        self.events.push(SinkEvent::PageBreak);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.events.push(SinkEvent::Closed);
        Ok(())
    }

    fn abort(&mut self) {
        self.events.push(SinkEvent::Aborted);
    }
}

// ---------------------------------------------------------------------------
// PDF sink
// ---------------------------------------------------------------------------

/// Paginates the block flow and writes a PDF file.
///
/// Output goes to `<target>.part` while the sink is open and is renamed to
/// `target` only once the whole file has been written, so a failed build
/// never leaves a truncated PDF behind.
#[derive(Debug)]
pub struct PdfSink {
    target: PathBuf,
    title: String,
    setup: PageSetup,
    file: Option<File>,
    flow: Vec<FlowItem>,
    layout: Option<LayoutConfig>,
}

impl PdfSink {
    pub fn new(target: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            title: title.into(),
            setup: PageSetup::a4_landscape(),
            file: None,
            flow: Vec::new(),
            layout: None,
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    fn partial_path(&self) -> PathBuf {
        let mut name = self.target.clone().into_os_string();
        name.push(".part");
        PathBuf::from(name)
    }

    /// The paginated layout, available after a successful `close`.
    pub fn layout(&self) -> Option<&LayoutConfig> {
        self.layout.as_ref()
    }

    pub fn into_layout(self) -> Option<LayoutConfig> {
        self.layout
    }

    fn ensure_open(&self) -> Result<()> {
        if self.file.is_none() {
            return Err(io::Error::other("PDF sink is not open").into());
        }
        Ok(())
    }
}

impl Sink for PdfSink {
    fn open(&mut self) -> Result<()> {
        if let Some(parent) = self.target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        self.file = Some(File::create(self.partial_path())?);
        self.flow.clear();
        log::debug!("Opened {}", self.partial_path().display());
        Ok(())
    }

    fn append(&mut self, block: &Block) -> Result<()> {
        self.ensure_open()?;
        self.flow.push(FlowItem::Block(block.clone()));
        Ok(())
    }

    fn page_break(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.flow.push(FlowItem::PageBreak);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        let layout = paginate(&self.flow, &self.setup, &self.title);
        let bytes = render_pdf(&layout)?;

        if let Some(mut file) = self.file.take() {
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(self.partial_path(), &self.target)?;
        log::info!(
            "Wrote '{}' ({} bytes, {} page{})",
            self.target.display(),
            bytes.len(),
            layout.pages.len(),
            if layout.pages.len() == 1 { "" } else { "s" }
        );
        self.layout = Some(layout);
        Ok(())
    }

    fn abort(&mut self) {
        self.file = None;
        let partial = self.partial_path();
        match fs::remove_file(&partial) {
            Ok(()) => log::debug!("Removed partial output {}", partial.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not remove {}: {e}", partial.display()),
        }
    }
}
