//! Post catalog built from the content directory
//!
//! The catalog is the slug index: it is loaded once, explicitly, at
//! startup (no hidden scan on first access) and every later lookup goes
//! through it.

use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{FrontMatter, HtmlRenderer, PostMeta, RenderedPost};
use crate::error::ContentError;
use crate::Site;

/// One catalog entry: metadata plus where the source file lives
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub meta: PostMeta,
    pub path: PathBuf,
}

/// The slug index over all posts in the content directory
#[derive(Debug, Default)]
pub struct Catalog {
    posts: IndexMap<String, CatalogEntry>,
}

impl Catalog {
    /// Scan the content directory and build the slug index.
    ///
    /// Markdown files that fail to parse are logged and skipped so one bad
    /// document cannot take the whole catalog down. Files are scanned in
    /// file-name order; when two documents claim the same slug the first
    /// one wins and the collision is logged. The finished catalog is
    /// ordered newest first, undated posts after dated ones, ties broken
    /// by slug.
    pub fn load(site: &Site) -> Result<Self, ContentError> {
        let dir = &site.content_dir;
        fs::metadata(dir).map_err(|e| ContentError::ContentDir {
            path: dir.clone(),
            source: e,
        })?;

        let mut posts: IndexMap<String, CatalogEntry> = IndexMap::new();

        for entry in WalkDir::new(dir)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }
            match load_meta(path, &site.config.author) {
                Ok(meta) => {
                    if let Some(existing) = posts.get(&meta.slug) {
                        tracing::warn!(
                            "Duplicate slug '{}' in {:?}, keeping {:?}",
                            meta.slug,
                            path,
                            existing.path
                        );
                        continue;
                    }
                    posts.insert(
                        meta.slug.clone(),
                        CatalogEntry {
                            meta,
                            path: path.to_path_buf(),
                        },
                    );
                }
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", path, e);
                }
            }
        }

        posts.sort_by(|_, a, _, b| compare_posts(&a.meta, &b.meta));

        tracing::debug!("Loaded {} posts from {:?}", posts.len(), dir);
        Ok(Catalog { posts })
    }

    /// Render the post behind a slug to a complete HTML document.
    ///
    /// An unknown slug, or a file that vanished since the catalog was
    /// built, surfaces as [`ContentError::PostNotFound`]. Anything else
    /// that goes wrong on a known slug is a render failure carrying the
    /// cause, never conflated with not-found.
    pub async fn render(
        &self,
        site: &Site,
        renderer: &HtmlRenderer,
        slug: &str,
    ) -> Result<RenderedPost, ContentError> {
        let entry = self
            .posts
            .get(slug)
            .ok_or_else(|| ContentError::PostNotFound {
                slug: slug.to_string(),
            })?;

        let content = tokio::fs::read_to_string(&entry.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ContentError::PostNotFound {
                    slug: slug.to_string(),
                }
            } else {
                ContentError::Read {
                    path: entry.path.clone(),
                    source: e,
                }
            }
        })?;

        // Parse fresh so edits since the catalog was built show up
        let (front, body) = FrontMatter::parse(&content).map_err(|e| ContentError::FrontMatter {
            path: entry.path.clone(),
            source: e,
        })?;

        let meta = meta_for(&front, &entry.path, &site.config.author);
        let html = renderer.render_document(&meta, body, &site.config.language);

        Ok(RenderedPost { meta, html })
    }

    /// Metadata records in catalog order
    pub fn posts(&self) -> impl Iterator<Item = &PostMeta> {
        self.posts.values().map(|entry| &entry.meta)
    }

    /// Look up one entry by slug
    pub fn get(&self, slug: &str) -> Option<&CatalogEntry> {
        self.posts.get(slug)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Newest first, undated posts last, slug as the tie-breaker
fn compare_posts(a: &PostMeta, b: &PostMeta) -> Ordering {
    match (a.date, b.date) {
        (Some(da), Some(db)) => db.cmp(&da).then_with(|| a.slug.cmp(&b.slug)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.slug.cmp(&b.slug),
    }
}

/// Read one file's metadata without rendering its body
fn load_meta(path: &Path, default_author: &str) -> Result<PostMeta, ContentError> {
    let content = fs::read_to_string(path).map_err(|e| ContentError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let (front, _body) = FrontMatter::parse(&content).map_err(|e| ContentError::FrontMatter {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(meta_for(&front, path, default_author))
}

fn meta_for(front: &FrontMatter, path: &Path, default_author: &str) -> PostMeta {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    let source = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(stem)
        .to_string();
    PostMeta::from_front_matter(front, stem, &source, default_author)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
