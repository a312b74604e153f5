//! BlogForge Ingestion
//!
//! Turns a `.docx` file into an ordered list of content parts and stores it
//! as a blog post:
//! 1. Extract paragraphs and embedded images (`docx`)
//! 2. Stage image payloads on disk
//! 3. Persist everything in one transaction (`processor`)

pub mod docx;
pub mod errors;
pub mod processor;

pub use docx::{extract_document, ExtractedDocument};
pub use errors::{ImageError, IngestionError};
pub use processor::IngestionPipeline;
