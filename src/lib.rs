//! inkpress: a Markdown blog engine
//!
//! This crate reads a flat directory of Markdown documents with YAML
//! front-matter, builds a slug-indexed catalog of their metadata, and
//! renders individual posts to complete HTML documents with highlighted
//! code blocks.

pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod server;

use anyhow::Result;
use std::path::Path;

/// One blog site rooted at a directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Directory holding the markdown documents
    pub content_dir: std::path::PathBuf,
    /// Directory holding static assets
    pub public_dir: std::path::PathBuf,
}

impl Site {
    /// Create a site from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        })
    }

    /// Scan the content directory into a catalog
    pub fn load_catalog(&self) -> Result<content::Catalog, error::ContentError> {
        content::Catalog::load(self)
    }

    /// Build a renderer from this site's highlight settings
    pub fn renderer(&self) -> content::HtmlRenderer {
        content::HtmlRenderer::new(&self.config.highlight)
    }
}
