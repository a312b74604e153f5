//! Word document extraction
//!
//! Turns a `.docx` package into an ordered list of [`ContentPart`]s plus an
//! [`ImageMap`] describing the images that were staged to disk.

mod package;
mod paragraphs;

use crate::errors::{ImageError, IngestionError};
use blogforge_common::{ContentPart, ImageMap, ImageMapEntry, StagedImage};
use image::ImageReader;
use package::DocxPackage;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Extraction result handed to the blog store writer
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractedDocument {
    pub parts: Vec<ContentPart>,
    pub images: ImageMap,
}

impl ExtractedDocument {
    /// Number of images that were decoded and staged
    pub fn staged_images(&self) -> usize {
        self.images.values().filter(|entry| entry.is_resolved()).count()
    }
}

/// Extract a `.docx` file, staging its images under `output_dir`.
///
/// Per-image problems are logged and leave the image unresolved; only
/// document-level problems are returned as errors.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn extract_document(path: &Path, output_dir: &Path) -> Result<ExtractedDocument, IngestionError> {
    if !path.is_file() {
        return Err(IngestionError::FileNotFound(path.display().to_string()));
    }

    std::fs::create_dir_all(output_dir)?;

    let file = File::open(path)?;
    let document = extract(BufReader::new(file), output_dir).map_err(|message| {
        IngestionError::DocumentParse {
            path: path.display().to_string(),
            message,
        }
    })?;

    info!(
        parts = document.parts.len(),
        images = document.images.len(),
        staged = document.staged_images(),
        "Document extracted"
    );

    Ok(document)
}

fn extract<R: Read + Seek>(reader: R, output_dir: &Path) -> Result<ExtractedDocument, String> {
    let mut package = DocxPackage::open(reader)?;
    let xml = package.main_document()?;
    let paragraphs = paragraphs::parse_body(&xml)?;

    debug!(paragraphs = paragraphs.len(), "Parsed document body");

    let mut document = ExtractedDocument::default();
    let mut source_index = 0;

    for paragraph in paragraphs {
        // Blank text is dropped; drawings in the same paragraph still count
        if !paragraph.is_blank() {
            document.parts.push(ContentPart::paragraph(paragraph.text));
        }

        for rel_id in paragraph.drawings {
            source_index += 1;
            let id = new_image_id(&document.images);

            let entry = match stage_image(&mut package, rel_id.as_deref(), &id, output_dir) {
                Ok(staged) => ImageMapEntry::staged(source_index, staged),
                Err(e) => {
                    warn!(
                        image_id = %id,
                        source_index,
                        rel_id = rel_id.as_deref().unwrap_or("-"),
                        error = %e,
                        "Image could not be extracted, keeping marker"
                    );
                    ImageMapEntry::unresolved(source_index)
                }
            };

            document.images.insert(id.clone(), entry);
            document.parts.push(ContentPart::image(id));
        }
    }

    Ok(document)
}

/// `img_` followed by 8 hex digits, unique within `images`
fn new_image_id(images: &ImageMap) -> String {
    loop {
        let hex = Uuid::new_v4().simple().to_string();
        let id = format!("img_{}", &hex[..8]);
        if !images.contains_key(&id) {
            return id;
        }
    }
}

/// Resolve, decode and write one image. Nothing is written unless the
/// bytes decode.
fn stage_image<R: Read + Seek>(
    package: &mut DocxPackage<R>,
    rel_id: Option<&str>,
    id: &str,
    output_dir: &Path,
) -> Result<StagedImage, ImageError> {
    let rel_id = rel_id.ok_or(ImageError::MissingEmbed)?;
    let part = package.image_part(rel_id)?;

    let (width, height) = ImageReader::new(Cursor::new(&part.bytes))
        .with_guessed_format()?
        .into_dimensions()?;

    let file_name = format!("{}.{}", id, file_extension(&part.content_type));
    let file_path = output_dir.join(&file_name);
    std::fs::write(&file_path, &part.bytes)?;

    debug!(image_id = %id, %file_name, width, height, "Staged image");

    Ok(StagedImage {
        file_path,
        file_name,
        content_type: part.content_type,
        width,
        height,
    })
}

/// `image/png` -> `png`, `image/svg+xml` -> `svg`
fn file_extension(content_type: &str) -> String {
    let subtype = content_type
        .split_once('/')
        .map(|(_, sub)| sub)
        .unwrap_or(content_type);

    let ext: String = subtype
        .split(['+', ';'])
        .next()
        .unwrap_or_default()
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '.')
        .collect();

    if ext.is_empty() {
        "bin".to_string()
    } else {
        ext.to_ascii_lowercase()
    }
}
