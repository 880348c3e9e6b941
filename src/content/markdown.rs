//! Markdown rendering with syntax highlighting
//!
//! The pipeline mirrors the stages of a classic text-processing chain:
//! parse markdown, build HTML, wrap it in a document shell, pretty-format
//! the result, with fenced code blocks highlighted along the way.

use crate::config::HighlightConfig;
use crate::content::PostMeta;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// How long the copy button shows its "copied" feedback, in milliseconds
const COPY_FEEDBACK_MS: u32 = 2000;

/// Renders markdown bodies to HTML
pub struct HtmlRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    default_lang: String,
    copy_button: bool,
}

impl HtmlRenderer {
    /// Create a renderer from highlighting settings
    pub fn new(config: &HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.theme.clone(),
            default_lang: config.default_lang.clone(),
            copy_button: config.copy_button,
        }
    }

    /// Render a markdown body to an HTML fragment
    pub fn render_body(&self, markdown: &str) -> String {
        // Enable most options but NOT YAML metadata blocks; front-matter
        // is stripped before the body ever reaches this point
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_DEFINITION_LIST
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        // (language, accumulated source) while inside a code block
        let mut code_block: Option<(String, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => lang.to_string(),
                        // Unlabelled fences and indented blocks highlight as
                        // the configured default language
                        _ => self.default_lang.clone(),
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlight_code(&code, &lang);
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) => match code_block.as_mut() {
                    Some((_, code)) => code.push_str(&text),
                    None => events.push(Event::Text(text)),
                },
                other => {
                    if code_block.is_none() {
                        events.push(other);
                    }
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        html_output
    }

    /// Render a markdown body into a complete, pretty-formatted HTML document.
    /// The page is an article with a metadata header (title, quoted
    /// description, byline, date) above the rendered content; the slug lands
    /// in the shell's `<title>`.
    pub fn render_document(&self, meta: &PostMeta, markdown: &str, lang: &str) -> String {
        let body = format!(
            "<article class=\"post\">{}{}</article>",
            post_header(meta),
            self.render_body(markdown)
        );
        let document = document_shell(&body, &meta.slug, lang);
        format_html(&document)
    }

    /// Highlight one code block and wrap it in a figure carrying the
    /// language label and, when enabled, a copy-to-clipboard button
    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .unwrap_or_else(|| {
                self.theme_set
                    .themes
                    .values()
                    .next()
                    .expect("No themes available")
            });

        let pre = match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => highlighted,
            // Fallback to a plain escaped block
            Err(_) => format!(
                "<pre><code class=\"language-{}\">{}</code></pre>\n",
                html_escape(lang),
                html_escape(code)
            ),
        };

        let mut figure = format!(
            "<figure class=\"code-block\" data-language=\"{}\">",
            html_escape(lang)
        );
        if self.copy_button {
            // Visible on hover via the stylesheet; the script reads the
            // source from data-code and flips the label for the feedback
            // window
            figure.push_str(&format!(
                "<button type=\"button\" class=\"copy-button\" data-code=\"{}\" data-feedback-duration=\"{}\" aria-label=\"Copy code to clipboard\">Copy</button>",
                html_escape(code.trim_end_matches('\n')),
                COPY_FEEDBACK_MS
            ));
        }
        figure.push_str(&pre);
        figure.push_str("</figure>");
        figure
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new(&HighlightConfig::default())
    }
}

/// The metadata header shown above the rendered post body. Absent fields
/// drop their elements rather than rendering empty ones.
fn post_header(meta: &PostMeta) -> String {
    let mut header = String::from("<header class=\"post-header\">");
    header.push_str(&format!("<h1>{}</h1>", html_escape(&meta.title)));
    if let Some(description) = meta.description.as_deref().filter(|d| !d.is_empty()) {
        header.push_str(&format!(
            "<p class=\"post-description\">&quot;{}&quot;</p>",
            html_escape(description)
        ));
    }
    header.push_str(&format!(
        "<p class=\"post-byline\">By {}",
        html_escape(&meta.author)
    ));
    if let Some(date) = meta.date {
        header.push_str(&format!(
            " <span class=\"post-date\">{}</span>",
            date.format("%B %-d, %Y")
        ));
    }
    header.push_str("</p></header>");
    header
}

/// Wrap an HTML fragment in a standalone document shell
pub fn document_shell(body: &str, title: &str, lang: &str) -> String {
    format!(
        "<!doctype html><html lang=\"{}\"><head><meta charset=\"utf-8\"><title>{}</title><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"></head><body>{}</body></html>",
        html_escape(lang),
        html_escape(title),
        body
    )
}

/// Block-level tags placed on their own indented lines when formatting
const BLOCK_TAGS: &[&str] = &[
    "html", "head", "body", "title", "meta", "link", "article", "section", "header", "footer",
    "nav", "main", "aside", "div", "figure", "figcaption", "blockquote", "p", "h1", "h2", "h3",
    "h4", "h5", "h6", "ul", "ol", "li", "dl", "dt", "dd", "table", "thead", "tbody", "tfoot",
    "tr", "td", "th", "pre", "hr", "form", "fieldset", "button",
];

/// Tags that never take a closing tag and so leave the nesting depth alone
const VOID_TAGS: &[&str] = &["meta", "link", "br", "hr", "img", "input", "source", "wbr"];

/// Pretty-format an HTML document: block-level tags go on their own lines,
/// indented two spaces per nesting level, while text inside `<pre>` passes
/// through byte-for-byte. Running the formatter over its own output changes
/// nothing, so repeated renders stay identical.
pub fn format_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + html.len() / 8);
    let mut rest = html;
    let mut depth: usize = 0;
    let mut pre_depth: usize = 0;
    // Whether the last emitted piece was a block tag; a closing block tag
    // only gets its own line when it follows one (so `<p>text</p>` stays
    // on a single line)
    let mut after_block = false;

    while let Some(lt) = rest.find('<') {
        let (text, tail) = rest.split_at(lt);
        if !text.is_empty() && (pre_depth > 0 || !text.chars().all(char::is_whitespace)) {
            out.push_str(text);
            after_block = false;
        }

        let Some(gt) = tail.find('>') else {
            // Unterminated tag, emit as-is
            out.push_str(tail);
            return out;
        };
        let tag = &tail[..=gt];
        rest = &tail[gt + 1..];

        let inner = tag[1..tag.len() - 1].trim();
        let closing = inner.starts_with('/');
        let name: String = inner
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        let block = BLOCK_TAGS.contains(&name.as_str());
        let void = VOID_TAGS.contains(&name.as_str()) || inner.ends_with('/');

        if pre_depth > 0 {
            out.push_str(tag);
            if name == "pre" {
                if closing {
                    pre_depth -= 1;
                    if pre_depth == 0 {
                        depth = depth.saturating_sub(1);
                        after_block = true;
                    }
                } else {
                    pre_depth += 1;
                }
            }
            continue;
        }

        if closing && block {
            depth = depth.saturating_sub(1);
            if after_block {
                break_line(&mut out, depth);
            }
            out.push_str(tag);
            after_block = true;
        } else if block {
            if !out.is_empty() {
                break_line(&mut out, depth);
            }
            out.push_str(tag);
            if name == "pre" {
                pre_depth += 1;
                depth += 1;
            } else if !void {
                depth += 1;
            }
            after_block = true;
        } else {
            // Inline tags flow with their surrounding text
            out.push_str(tag);
            after_block = false;
        }
    }

    if !rest.is_empty() && (pre_depth > 0 || !rest.chars().all(char::is_whitespace)) {
        out.push_str(rest);
    }
    out
}

fn break_line(out: &mut String, depth: usize) {
    // Text runs can end in whitespace (a list item keeps its newline before
    // a nested list); trim it here or every pass over already-formatted
    // output would add another indented blank run
    out.truncate(out.trim_end().len());
    out.push('\n');
    for _ in 0..depth {
        out.push_str("  ");
    }
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_meta(slug: &str) -> PostMeta {
        PostMeta {
            title: "Intro Post".to_string(),
            description: Some("A short hello".to_string()),
            author: "Ana".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 28),
            image_url: None,
            slug: slug.to_string(),
            tags: Vec::new(),
            source: format!("{}.md", slug),
        }
    }

    #[test]
    fn test_render_basic_markdown() {
        let renderer = HtmlRenderer::default();
        let html = renderer.render_body("# Hello World\n\nThis is a test.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_heading_survives_full_pipeline() {
        let renderer = HtmlRenderer::default();
        let html = renderer.render_document(&sample_meta("intro"), "# Hi", "en");
        assert!(html.contains("<h1>Hi</h1>"));
    }

    #[test]
    fn test_document_carries_metadata_header() {
        let renderer = HtmlRenderer::default();
        let html = renderer.render_document(&sample_meta("intro"), "# Hi\n", "en");
        assert!(html.contains("<article class=\"post\">"));
        assert!(html.contains("<h1>Intro Post</h1>"));
        assert!(html.contains("&quot;A short hello&quot;"));
        assert!(html.contains("By Ana"));
        assert!(html.contains("March 28, 2025"));
        assert!(html.contains("<title>intro</title>"));
    }

    #[test]
    fn test_metadata_header_is_escaped() {
        let mut meta = sample_meta("sneaky");
        meta.title = "<script>alert(1)</script>".to_string();
        meta.author = "A \"quoted\" name".to_string();
        let renderer = HtmlRenderer::default();
        let html = renderer.render_document(&meta, "Body text.\n", "en");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("By A &quot;quoted&quot; name"));
    }

    #[test]
    fn test_metadata_header_omits_absent_fields() {
        let mut meta = sample_meta("bare");
        meta.description = None;
        meta.date = None;
        let renderer = HtmlRenderer::default();
        let html = renderer.render_document(&meta, "x\n", "en");
        assert!(html.contains("By Ana"));
        assert!(!html.contains("post-description"));
        assert!(!html.contains("post-date"));
    }

    #[test]
    fn test_fenced_code_block_is_highlighted() {
        let renderer = HtmlRenderer::default();
        let html = renderer.render_body("```rust\nfn main() {}\n```");
        assert!(html.contains("<figure class=\"code-block\" data-language=\"rust\">"));
        assert!(html.contains("<pre"));
    }

    #[test]
    fn test_copy_button_present_for_code_blocks_only() {
        let renderer = HtmlRenderer::default();

        let with_code = renderer.render_body("```rust\nfn main() {}\n```");
        assert!(with_code.contains("copy-button"));
        assert!(with_code.contains("data-feedback-duration=\"2000\""));
        assert!(with_code.contains("data-code=\"fn main() {}\""));

        let without_code = renderer.render_body("# No code here\n\nJust prose.");
        assert!(!without_code.contains("copy-button"));
    }

    #[test]
    fn test_copy_button_can_be_disabled() {
        let config = HighlightConfig {
            copy_button: false,
            ..Default::default()
        };
        let renderer = HtmlRenderer::new(&config);
        let html = renderer.render_body("```rust\nfn main() {}\n```");
        assert!(!html.contains("copy-button"));
    }

    #[test]
    fn test_unlabelled_fence_uses_default_language() {
        let config = HighlightConfig {
            default_lang: "js".to_string(),
            ..Default::default()
        };
        let renderer = HtmlRenderer::new(&config);
        let html = renderer.render_body("```\nconsole.log(1)\n```");
        assert!(html.contains("data-language=\"js\""));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let renderer = HtmlRenderer::default();
        let html = renderer.render_body("```qzx\nmystery\n```");
        assert!(html.contains("data-language=\"qzx\""));
        assert!(html.contains("mystery"));
    }

    #[test]
    fn test_document_shell_carries_title_and_lang() {
        let html = document_shell("<p>Hi</p>", "my-post", "en");
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<html lang=\"en\">"));
        assert!(html.contains("<title>my-post</title>"));
        assert!(html.contains("<meta charset=\"utf-8\">"));
        assert!(html.contains("<body><p>Hi</p></body>"));
    }

    #[test]
    fn test_format_html_indents_blocks() {
        let formatted = format_html("<html lang=\"en\"><body><h1>Hi</h1><p>Text</p></body></html>");
        assert_eq!(
            formatted,
            "<html lang=\"en\">\n  <body>\n    <h1>Hi</h1>\n    <p>Text</p>\n  </body>\n</html>"
        );
    }

    #[test]
    fn test_format_html_leaves_pre_content_alone() {
        let input = "<body><pre>line one\n  line two\n</pre></body>";
        let formatted = format_html(input);
        assert!(formatted.contains("<pre>line one\n  line two\n</pre>"));
    }

    #[test]
    fn test_format_html_is_idempotent() {
        let renderer = HtmlRenderer::default();
        let document = renderer.render_document(
            &sample_meta("sample"),
            "# Title\n\nSome text.\n\n```rust\nlet x = 1;\n```\n",
            "en",
        );
        assert_eq!(format_html(&document), document);
    }

    #[test]
    fn test_format_html_stable_over_nested_lists() {
        let renderer = HtmlRenderer::default();
        let document =
            renderer.render_document(&sample_meta("nested"), "- item\n  - sub\n", "en");
        // The text run inside <li> keeps its newline; formatting again must
        // not grow a blank run out of it
        assert_eq!(format_html(&document), document);
        assert!(!document.contains("\n\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = HtmlRenderer::default();
        let markdown = "# Hello\n\n```js\nconsole.log('hi')\n```\n";
        let first = renderer.render_document(&sample_meta("hello"), markdown, "en");
        let second = renderer.render_document(&sample_meta("hello"), markdown, "en");
        assert_eq!(first, second);
    }

    #[test]
    fn test_smart_punctuation_enabled() {
        let renderer = HtmlRenderer::default();
        let html = renderer.render_body("\"Quoted\" text");
        assert!(html.contains("\u{201c}Quoted\u{201d}"));
    }
}
