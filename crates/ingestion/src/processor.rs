//! Ingestion pipeline
//!
//! Extracts a document on the blocking pool, then hands the parts and image
//! map to the blog store writer. The staging directory lives until the write
//! has finished reading the image files back.

use crate::docx::extract_document;
use crate::errors::IngestionError;
use blogforge_common::db::{DbPool, NewPost, Repository, StoredPost};
use blogforge_common::metrics;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempDir;
use tracing::{error, info, instrument};

/// Where extracted images are written before they are stored
enum Staging {
    Dir(PathBuf),
    Temp(TempDir),
}

impl Staging {
    fn path(&self) -> &Path {
        match self {
            Staging::Dir(path) => path.as_path(),
            Staging::Temp(dir) => dir.path(),
        }
    }
}

/// Document-to-blog-post pipeline
#[derive(Clone)]
pub struct IngestionPipeline {
    repository: Repository,
    images_dir: Option<PathBuf>,
}

impl IngestionPipeline {
    /// `images_dir` keeps staged images after ingestion; without it a
    /// temporary directory is used and removed afterwards.
    pub fn new(db_pool: DbPool, images_dir: Option<PathBuf>) -> Self {
        Self {
            repository: Repository::new(db_pool),
            images_dir,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Ingest a `.docx` file as a new blog post.
    ///
    /// The title defaults to the file stem.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn ingest_docx(
        &self,
        path: &Path,
        title: Option<String>,
        author: Option<String>,
    ) -> Result<StoredPost, IngestionError> {
        let started = Instant::now();
        let result = self.run(path, title, author).await;

        metrics::record_ingestion(started.elapsed().as_secs_f64(), result.is_ok());

        match &result {
            Ok(stored) => info!(
                post_id = stored.post_id,
                blocks = stored.blocks,
                images = stored.images,
                degraded = stored.degraded,
                "Document ingested"
            ),
            Err(e) => error!(error = %e, "Ingestion failed"),
        }

        result
    }

    async fn run(
        &self,
        path: &Path,
        title: Option<String>,
        author: Option<String>,
    ) -> Result<StoredPost, IngestionError> {
        let title = title.unwrap_or_else(|| default_title(path));

        let staging = match &self.images_dir {
            Some(dir) => Staging::Dir(dir.clone()),
            None => Staging::Temp(tempfile::Builder::new().prefix("blogforge-").tempdir()?),
        };

        info!(%title, staging = %staging.path().display(), "Extracting document");

        let source = path.to_path_buf();
        let output_dir = staging.path().to_path_buf();
        let document = tokio::task::spawn_blocking(move || extract_document(&source, &output_dir))
            .await
            .map_err(|e| IngestionError::Task(e.to_string()))??;

        let stored = self
            .repository
            .store_post(NewPost::new(title, author), &document.parts, &document.images)
            .await?;

        drop(staging);
        Ok(stored)
    }
}

/// File stem of the document, or `Untitled`
pub fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_title() {
        assert_eq!(default_title(Path::new("/tmp/Smith Charts.docx")), "Smith Charts");
        assert_eq!(default_title(Path::new("notes")), "notes");
        assert_eq!(default_title(Path::new("/")), "Untitled");
    }
}
