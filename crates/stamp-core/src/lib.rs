//! PDF seal stamping
//!
//! Draws seal and signature images onto existing PDFs with lopdf, splits
//! perforation seals across page edges, renders page previews, and wraps it
//! all in a contract-level [`StampService`] that emits audit records.
//!
//! The document functions in [`engine`] work on bytes and know nothing about
//! contracts; [`service`] adds storage, state checks and previews.

pub mod cache;
pub mod config;
pub mod coords;
pub mod document;
pub mod engine;
pub mod preview;
pub mod service;
pub mod store;
pub mod xobject;

pub use cache::{PreviewCache, PreviewVariant};
pub use config::EngineConfig;
pub use coords::CoordinateMapper;
pub use document::{page_count, PdfDocument};
pub use engine::{batch_stamp_document, perforate_document, stamp_document, ImagePlacements};
#[cfg(feature = "pdfium")]
pub use preview::PdfiumRasterizer;
pub use preview::{
    render_page, PagePreview, PageRasterizer, PreviewResult, RenderedPage, DEFAULT_PREVIEW_DPI,
};
pub use service::{BatchItem, StampOutcome, StampService};
pub use store::{DocumentStore, FsDocumentStore};
