//! Blog server
//!
//! Routes: `/blog` lists every post, `/blogpost/{slug}` renders one, `/`
//! redirects to the listing, and anything else falls through to static
//! files in the public directory.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::content::{document_shell, format_html, Catalog, HtmlRenderer};
use crate::error::ContentError;
use crate::helpers;
use crate::Site;

/// Server state
struct ServerState {
    site: Site,
    catalog: Catalog,
    renderer: HtmlRenderer,
}

/// Start the blog server.
///
/// The catalog is built here, once, before the listener binds; request
/// handlers only ever look slugs up in it and read the matching file.
pub async fn start(site: Site, ip: &str, port: u16, open: bool) -> Result<()> {
    let catalog = site.load_catalog()?;
    tracing::info!(
        "Serving {} posts from {:?}",
        catalog.len(),
        site.content_dir
    );

    let renderer = site.renderer();
    let public_dir = site.public_dir.clone();
    let state = Arc::new(ServerState {
        site,
        catalog,
        renderer,
    });

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/blog", get(list_handler))
        .route("/blogpost/:slug", get(post_handler))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root_handler(State(state): State<Arc<ServerState>>) -> Redirect {
    Redirect::to(&helpers::url_for(&state.site.config, "/blog"))
}

async fn list_handler(State(state): State<Arc<ServerState>>) -> Html<String> {
    Html(listing_page(&state.site, &state.catalog))
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    match state
        .catalog
        .render(&state.site, &state.renderer, &slug)
        .await
    {
        Ok(post) => Html(post.html).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// Map a content error onto an HTTP response: an unknown slug is a 404,
/// everything else on a known slug is a 500 with the cause in the body
/// and the log. The two are never conflated.
fn error_response(err: &ContentError) -> (StatusCode, String) {
    if err.is_not_found() {
        (StatusCode::NOT_FOUND, err.to_string())
    } else {
        tracing::error!("Failed to render post: {}", err);
        if let Some(source) = std::error::Error::source(err) {
            tracing::error!("Caused by: {}", source);
        }
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render post: {}", err),
        )
    }
}

/// Assemble the listing page from catalog metadata
fn listing_page(site: &Site, catalog: &Catalog) -> String {
    let config = &site.config;

    let mut body = String::new();
    body.push_str(&format!("<h1>{}</h1>", helpers::html_escape(&config.title)));
    if !config.description.is_empty() {
        body.push_str(&format!(
            "<p>{}</p>",
            helpers::html_escape(&config.description)
        ));
    }

    body.push_str("<ul class=\"post-list\">");
    for meta in catalog.posts() {
        body.push_str("<li>");
        if let Some(image) = &meta.image_url {
            body.push_str(&helpers::image_tag(config, image, Some(&meta.title)));
        }
        body.push_str(&helpers::link_to(
            config,
            &format!("/blogpost/{}", meta.slug),
            &meta.title,
            false,
        ));
        if let Some(date) = meta.date {
            body.push_str(&format!(
                "<span class=\"date\">{}</span>",
                date.format("%B %-d, %Y")
            ));
        }
        body.push_str(&format!(
            "<span class=\"author\">by {}</span>",
            helpers::html_escape(&meta.author)
        ));
        if let Some(description) = &meta.description {
            body.push_str(&format!(
                "<p>{}</p>",
                helpers::html_escape(description)
            ));
        }
        if !meta.tags.is_empty() {
            body.push_str(&format!(
                "<span class=\"tags\">{}</span>",
                helpers::html_escape(&meta.tags.join(", "))
            ));
        }
        body.push_str("</li>");
    }
    body.push_str("</ul>");

    format_html(&document_shell(&body, &config.title, &config.language))
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
