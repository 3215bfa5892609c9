//! # stylesync-renderer
//!
//! Tera-based rendering of the `README.md` placed at the root of the
//! distribution repository.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stylesync_renderer::{ReadmeContext, Renderer};
//!
//! fn readme() -> String {
//!     let ctx = ReadmeContext::from_upstream("https://github.com/citation-style-language/styles");
//!     Renderer::new()
//!         .and_then(|renderer| renderer.render_readme(&ctx))
//!         .unwrap_or_default()
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::ReadmeContext;
pub use engine::{Renderer, README_FILE};
pub use error::RenderError;
