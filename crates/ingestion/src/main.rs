//! BlogForge ingestion CLI
//!
//! Imports `.docx` documents as blog posts and manages the blog schema.

use anyhow::Context;
use blogforge_common::{config::AppConfig, db::schema, metrics, telemetry, DbPool, Repository, VERSION};
use blogforge_ingestion::IngestionPipeline;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "blogforge-ingest", version, about = "Import Word documents into the blog store")]
struct Cli {
    /// Configuration file to use instead of the layered config directory
    #[arg(long, global = true, env = "BLOGFORGE_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a .docx file as a new blog post
    Ingest {
        /// Path to the document
        docx: PathBuf,

        /// Post title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,

        /// Post author (defaults to ingestion.default_author)
        #[arg(long)]
        author: Option<String>,

        /// Keep extracted images in this directory
        #[arg(long)]
        images_dir: Option<PathBuf>,
    },

    /// Delete a blog post by title
    Remove {
        #[arg(long)]
        title: String,
    },

    /// Create the blog tables if they are missing
    InitDb,

    /// Drop the blog tables
    DropDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    telemetry::init_tracing(&config.observability);
    metrics::register_metrics();

    info!(version = VERSION, "BlogForge ingestion starting");

    let db = DbPool::new(&config.database)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Command::Ingest {
            docx,
            title,
            author,
            images_dir,
        } => {
            let author = author.unwrap_or_else(|| config.ingestion.default_author.clone());
            let images_dir = images_dir.or_else(|| config.ingestion.images_dir.clone());

            let pipeline = IngestionPipeline::new(db, images_dir);
            let stored = pipeline
                .ingest_docx(&docx, title, Some(author))
                .await
                .with_context(|| format!("Failed to ingest {}", docx.display()))?;

            println!(
                "Stored post {} ({} blocks, {} images, {} without payload)",
                stored.post_id, stored.blocks, stored.images, stored.degraded
            );
        }
        Command::Remove { title } => {
            let repository = Repository::new(db);
            if repository.delete_post_by_title(&title).await? {
                info!(%title, "Blog post removed");
                println!("Removed '{}'", title);
            } else {
                warn!(%title, "No blog post with that title");
                println!("No post titled '{}'", title);
            }
        }
        Command::InitDb => {
            schema::create_all(db.write()).await?;
            println!("Blog tables ready");
        }
        Command::DropDb => {
            schema::drop_all(db.write()).await?;
            println!("Blog tables dropped");
        }
    }

    Ok(())
}
