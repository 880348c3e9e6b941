//! Content module - loads posts and renders them to HTML

mod catalog;
mod frontmatter;
mod markdown;
mod post;

pub use catalog::{Catalog, CatalogEntry};
pub use frontmatter::FrontMatter;
pub use markdown::{document_shell, format_html, HtmlRenderer};
pub use post::{PostMeta, RenderedPost};
