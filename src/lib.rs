//! # invoice-forge – sales invoice layout engine
//!
//! Composes a multi-page sales invoice into abstract blocks and hands them to
//! a sink. The stages are:
//!
//! 1. **Fit** – decode and scale the logo ([`image_fit`])
//! 2. **Compose** – build styled cells and validated tables into header
//!    bands, titles and detail tables ([`cell`], [`table`], [`compose`])
//! 3. **Document** – drive the `Empty -> Writing -> Closed` lifecycle and
//!    the cover-page loop ([`document`], [`engine`])
//! 4. **Paginate** – place blocks on A4 landscape pages, splitting long
//!    tables with repeated header/footer rows ([`pagination`])
//! 5. **Render** – emit PDF bytes via printpdf ([`render`])
//!
//! Stages 4 and 5 live behind the [`sink::Sink`] trait; [`sink::PdfSink`]
//! runs them, [`sink::RecordingSink`] just records the block stream.

pub mod block;
pub mod cell;
pub mod compose;
pub mod document;
pub mod engine;
pub mod error;
pub mod fonts;
pub mod image_fit;
pub mod layout_config;
pub mod pagination;
pub mod render;
pub mod sink;
pub mod style;
pub mod table;
pub mod templates;

// Re-exports for convenience
pub use engine::{render_invoice, DocumentEngine, InvoiceConfig};
pub use error::{Error, LayoutError, Result};
