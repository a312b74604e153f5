//! Ingestion error types

use thiserror::Error;

/// Failures that abort an ingestion
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Document parse error for {path}: {message}")]
    DocumentParse { path: String, message: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] blogforge_common::AppError),

    #[error("Extraction task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failures resolving a single embedded image.
///
/// These never abort the document; the image is kept as a bare marker.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("drawing has no embedded image reference")]
    MissingEmbed,

    #[error("relationship {0} not found")]
    UnknownRelationship(String),

    #[error("relationship {0} points outside the package")]
    ExternalTarget(String),

    #[error("package part {0} is missing")]
    MissingPart(String),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
