// Résumé PDF layout engine.
// cleaned HTML → DocNode tree → positioned draw ops → PDF bytes.
// Layout and PDF emission are CPU-bound and run inside tokio::task::spawn_blocking.

pub mod document;
pub mod engine;
pub mod font_metrics;
pub mod handlers;
pub mod pdf_writer;

// Re-export the public API consumed by other modules (analysis, handlers, state).
pub use document::clean_optimized_html;
pub use engine::{
    default_page_config, layout_html, suggested_filename, LayoutDocument, PageConfig,
};
pub use pdf_writer::{render_pdf, PdfError};
