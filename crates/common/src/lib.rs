//! BlogForge Common Library
//!
//! Shared code for the BlogForge gateway and ingestion tool:
//! - Configuration management
//! - Error types and handling
//! - Database entities, schema bootstrap and the blog store
//! - Typed hand-off between document extraction and the store
//! - Logging and metrics helpers

pub mod config;
pub mod content;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod telemetry;

// Re-export commonly used types
pub use config::AppConfig;
pub use content::{ContentPart, ImageMap, ImageMapEntry, StagedImage};
pub use db::{DbPool, NewPost, Repository};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Timestamp format used by the public API
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
