//! CLI entry point for inkpress

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "inkpress")]
#[command(version = "0.1.0")]
#[command(about = "A Markdown blog engine that serves posts straight from a content directory", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the blog server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// List every post in the content directory
    List {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render one post to HTML
    Render {
        /// Slug of the post to render
        slug: String,

        /// Write the HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "inkpress=debug,info"
    } else {
        "inkpress=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = cli.cwd.unwrap_or_else(|| std::env::current_dir().unwrap());

    match cli.command {
        Commands::Serve { port, ip, open } => {
            let site = inkpress::Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            inkpress::server::start(site, &ip, port, open).await?;
        }

        Commands::List { json } => {
            let site = inkpress::Site::new(&base_dir)?;
            let catalog = site.load_catalog()?;

            if json {
                let posts: Vec<_> = catalog.posts().collect();
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else {
                println!("Posts ({}):", catalog.len());
                for meta in catalog.posts() {
                    let date = meta
                        .date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "----------".to_string());
                    println!("  {} - {} [{}]", date, meta.title, meta.source);
                }
            }
        }

        Commands::Render { slug, output } => {
            let site = inkpress::Site::new(&base_dir)?;
            let catalog = site.load_catalog()?;
            let renderer = site.renderer();
            let post = catalog.render(&site, &renderer, &slug).await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &post.html)?;
                    println!("Rendered '{}' to {:?}", slug, path);
                }
                None => println!("{}", post.html),
            }
        }

        Commands::Version => {
            println!("inkpress version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
