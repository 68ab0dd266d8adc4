//! Content renderers.

mod format;

pub use format::FormatRenderer;
