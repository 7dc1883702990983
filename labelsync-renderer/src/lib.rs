//! # labelsync-renderer
//!
//! Tera-based renderer that turns the reports of a sync run into Markdown.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use labelsync_renderer::{Renderer, ReportKind};
//! use labelsync_sync::SyncReport;
//!
//! fn print_overview(reports: &[SyncReport]) {
//!     if let Ok(renderer) = Renderer::new() {
//!         if let Ok(markdown) = renderer.render(reports, ReportKind::Overview) {
//!             println!("{markdown}");
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::TemplateContext;
pub use engine::{Renderer, ReportKind, TemplateEngine};
pub use error::RenderError;
