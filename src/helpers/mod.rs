//! Helper functions for assembling page HTML

mod html;
mod url;

pub use html::*;
pub use url::*;
