//! HTML helper functions

use super::url::url_for;
use crate::config::SiteConfig;

/// Generate an anchor tag
///
/// # Examples
/// ```ignore
/// link_to(&config, "/blogpost/intro", "Intro", false) // -> <a href="/blogpost/intro">Intro</a>
/// ```
pub fn link_to(config: &SiteConfig, path: &str, text: &str, external: bool) -> String {
    let href = if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        url_for(config, path)
    };

    if external || path.starts_with("http://") || path.starts_with("https://") {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            html_escape(&href),
            html_escape(text)
        )
    } else {
        format!(r#"<a href="{}">{}</a>"#, html_escape(&href), html_escape(text))
    }
}

/// Generate an image tag
///
/// # Examples
/// ```ignore
/// image_tag(&config, "/images/cover.webp", Some("Cover"))
/// ```
pub fn image_tag(config: &SiteConfig, path: &str, alt: Option<&str>) -> String {
    let src = if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        url_for(config, path)
    };

    format!(
        r#"<img src="{}" alt="{}">"#,
        html_escape(&src),
        html_escape(alt.unwrap_or(""))
    )
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
