//! Post metadata model

use crate::content::FrontMatter;
use chrono::NaiveDate;
use serde::Serialize;

/// Metadata for one blog post
#[derive(Debug, Clone, Serialize)]
pub struct PostMeta {
    /// Post title
    pub title: String,

    /// Short description for listings
    pub description: Option<String>,

    /// Post author
    pub author: String,

    /// Publication date
    pub date: Option<NaiveDate>,

    /// Cover image URL or path
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,

    /// Slug (URL-friendly lookup key)
    pub slug: String,

    /// Post tags, always a list
    pub tags: Vec<String>,

    /// Source file name
    pub source: String,
}

impl PostMeta {
    /// Build metadata from parsed front-matter, filling gaps with defaults
    /// derived from the file name and site configuration. An explicit slug
    /// field wins over the file stem; either way the result is slugified.
    pub fn from_front_matter(
        front: &FrontMatter,
        stem: &str,
        source: &str,
        default_author: &str,
    ) -> Self {
        let slug = slug::slugify(front.slug.as_deref().unwrap_or(stem));
        Self {
            title: front.title.clone().unwrap_or_else(|| stem.to_string()),
            description: front.description.clone(),
            author: front
                .author
                .clone()
                .unwrap_or_else(|| default_author.to_string()),
            date: front.parse_date(),
            image_url: front.image_url.clone(),
            slug,
            tags: front.tags.clone(),
            source: source.to_string(),
        }
    }
}

/// A post rendered to a full HTML document
#[derive(Debug, Clone)]
pub struct RenderedPost {
    pub meta: PostMeta,
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_come_from_file_and_site() {
        let front = FrontMatter::default();
        let meta = PostMeta::from_front_matter(&front, "first-post", "first-post.md", "Jo");
        assert_eq!(meta.title, "first-post");
        assert_eq!(meta.author, "Jo");
        assert_eq!(meta.slug, "first-post");
        assert_eq!(meta.source, "first-post.md");
        assert!(meta.tags.is_empty());
        assert!(meta.date.is_none());
    }

    #[test]
    fn test_explicit_slug_wins_over_stem() {
        let front = FrontMatter {
            slug: Some("custom-slug".to_string()),
            ..Default::default()
        };
        let meta = PostMeta::from_front_matter(&front, "some-file", "some-file.md", "Jo");
        assert_eq!(meta.slug, "custom-slug");
    }

    #[test]
    fn test_slug_is_normalized() {
        let front = FrontMatter::default();
        let meta = PostMeta::from_front_matter(&front, "My First Post", "My First Post.md", "Jo");
        assert_eq!(meta.slug, "my-first-post");
    }

    #[test]
    fn test_front_matter_fields_carry_over() {
        let front = FrontMatter {
            title: Some("Intro".to_string()),
            description: Some("Short".to_string()),
            author: Some("Ana".to_string()),
            date: Some("2025-03-28".to_string()),
            image_url: Some("/images/cover.webp".to_string()),
            tags: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        };
        let meta = PostMeta::from_front_matter(&front, "intro", "intro.md", "Jo");
        assert_eq!(meta.title, "Intro");
        assert_eq!(meta.description, Some("Short".to_string()));
        assert_eq!(meta.author, "Ana");
        assert_eq!(
            meta.date,
            NaiveDate::from_ymd_opt(2025, 3, 28)
        );
        assert_eq!(meta.image_url, Some("/images/cover.webp".to_string()));
        assert_eq!(meta.tags, vec!["a", "b"]);
    }
}
