//! Typed hand-off between document extraction and the blog store
//!
//! The extractor produces an ordered list of [`ContentPart`]s and an
//! [`ImageMap`]; the writer consumes both and persists them in order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// One ordered unit of an extracted document body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Paragraph text, kept verbatim
    Paragraph { text: String },

    /// Placeholder for an embedded image, keyed into the [`ImageMap`]
    Image { id: String },
}

impl ContentPart {
    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentPart::Paragraph { text: text.into() }
    }

    pub fn image(id: impl Into<String>) -> Self {
        ContentPart::Image { id: id.into() }
    }

    /// The image id if this part is an image placeholder
    pub fn image_id(&self) -> Option<&str> {
        match self {
            ContentPart::Image { id } => Some(id),
            ContentPart::Paragraph { .. } => None,
        }
    }
}

/// An image that was resolved, decoded and written to the staging directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedImage {
    pub file_path: PathBuf,
    pub file_name: String,
    pub content_type: String,
    pub width: u32,
    pub height: u32,
}

/// Extraction-time metadata for one embedded drawing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMapEntry {
    /// 1-based position of the drawing in the document
    pub source_index: usize,

    /// `None` when the image could not be resolved or decoded
    pub staged: Option<StagedImage>,
}

impl ImageMapEntry {
    pub fn unresolved(source_index: usize) -> Self {
        Self {
            source_index,
            staged: None,
        }
    }

    pub fn staged(source_index: usize, staged: StagedImage) -> Self {
        Self {
            source_index,
            staged: Some(staged),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.staged.is_some()
    }
}

/// Image id -> extraction metadata
pub type ImageMap = HashMap<String, ImageMapEntry>;
