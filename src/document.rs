//! The document lifecycle: `Empty -> Writing -> Closed`.
//!
//! [`Document`] owns a [`Sink`] and is the only thing that talks to it. The
//! sink is opened before the first block, closed exactly once, and aborted
//! if the document is dropped (or fails) without being closed.

use crate::block::Block;
use crate::error::{Error, Result};
use crate::sink::Sink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Nothing written yet; the sink has not been opened.
    Empty,
    Writing,
    /// Finalised or aborted. Every further operation fails.
    Closed,
}

pub struct Document<S: Sink> {
    sink: S,
    state: DocumentState,
    blocks: usize,
    page_breaks: usize,
}

impl<S: Sink> Document<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: DocumentState::Empty,
            blocks: 0,
            page_breaks: 0,
        }
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Number of blocks appended so far.
    pub fn block_count(&self) -> usize {
        self.blocks
    }

    pub fn page_break_count(&self) -> usize {
        self.page_breaks
    }

    /// Move to `Writing`, opening the sink on first use.
    fn ensure_writing(&mut self) -> Result<()> {
        match self.state {
            DocumentState::Closed => Err(Error::DocumentClosed),
            DocumentState::Writing => Ok(()),
            DocumentState::Empty => {
                self.sink.open()?;
                self.state = DocumentState::Writing;
                Ok(())
            }
        }
    }

    pub fn add(&mut self, block: Block) -> Result<()> {
        self.ensure_writing()?;
        self.sink.append(&block)?;
        self.blocks += 1;
        Ok(())
    }

    pub fn add_all(&mut self, blocks: impl IntoIterator<Item = Block>) -> Result<()> {
        blocks.into_iter().try_for_each(|b| self.add(b))
    }

    pub fn new_page(&mut self) -> Result<()> {
        self.ensure_writing()?;
        self.sink.page_break()?;
        self.page_breaks += 1;
        Ok(())
    }

    /// Finalise the document. On failure the sink is aborted; either way the
    /// document ends up `Closed`.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_writing()?;
        self.state = DocumentState::Closed;
        if let Err(e) = self.sink.close() {
            self.sink.abort();
            return Err(e);
        }
        Ok(())
    }

    /// Discard the document. A no-op once closed.
    pub fn abort(&mut self) {
        match self.state {
            DocumentState::Closed => {}
            DocumentState::Empty => self.state = DocumentState::Closed,
            DocumentState::Writing => {
                self.state = DocumentState::Closed;
                self.sink.abort();
            }
        }
    }
}

impl<S: Sink> Drop for Document<S> {
    fn drop(&mut self) {
        if self.state == DocumentState::Writing {
            log::warn!("Document dropped before close; discarding partial output");
            self.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Paragraph;
    use crate::sink::{RecordingSink, SinkEvent};
    use crate::style::Font;

    fn title() -> Block {
        Block::Title(Paragraph::new("T", &Font::helvetica(12.0).shared()))
    }

    #[test]
    fn lifecycle() {
        let mut sink = RecordingSink::new();
        {
            let mut doc = Document::new(&mut sink);
            assert_eq!(doc.state(), DocumentState::Empty);
            doc.add(title()).unwrap();
            assert_eq!(doc.state(), DocumentState::Writing);
            doc.new_page().unwrap();
            doc.add(title()).unwrap();
            doc.close().unwrap();
            assert_eq!(doc.state(), DocumentState::Closed);
            assert_eq!((doc.block_count(), doc.page_break_count()), (2, 1));
        }
        assert_eq!(
            sink.events,
            vec![
                SinkEvent::Opened,
                SinkEvent::Block(title()),
                SinkEvent::PageBreak,
                SinkEvent::Block(title()),
                SinkEvent::Closed,
            ]
        );
    }

    #[test]
    fn operations_after_close_fail() {
        let mut sink = RecordingSink::new();
        {
            let mut doc = Document::new(&mut sink);
            doc.add(title()).unwrap();
            doc.close().unwrap();
            assert!(matches!(doc.add(title()), Err(Error::DocumentClosed)));
            assert!(matches!(doc.new_page(), Err(Error::DocumentClosed)));
            assert!(matches!(doc.close(), Err(Error::DocumentClosed)));
        }
        // Nothing reached the sink after the close.
        assert_eq!(sink.events.last(), Some(&SinkEvent::Closed));
        assert_eq!(sink.count(|e| matches!(e, SinkEvent::Closed)), 1);
    }

    #[test]
    fn drop_without_close_aborts() {
        let mut sink = RecordingSink::new();
        {
            let mut doc = Document::new(&mut sink);
            doc.add(title()).unwrap();
        }
        assert_eq!(sink.events.last(), Some(&SinkEvent::Aborted));
    }

    #[test]
    fn empty_document_never_opens_sink_on_abort() {
        let mut sink = RecordingSink::new();
        {
            let mut doc = Document::new(&mut sink);
            doc.abort();
            assert!(matches!(doc.add(title()), Err(Error::DocumentClosed)));
        }
        assert!(sink.events.is_empty());
    }
}
