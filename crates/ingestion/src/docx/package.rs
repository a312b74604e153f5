//! OPC package access: zip entries, relationships and content types

use crate::errors::ImageError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const DEFAULT_MAIN_PART: &str = "word/document.xml";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// One `<Relationship>` from a `.rels` part
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// A resolved binary part
#[derive(Debug, Clone)]
pub(crate) struct BinaryPart {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A word-processing package opened for reading
pub(crate) struct DocxPackage<R: Read + Seek> {
    archive: ZipArchive<R>,
    main_part: String,
    relationships: HashMap<String, Relationship>,
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl<R: Read + Seek> DocxPackage<R> {
    /// Open the package and index the main document's relationships
    pub fn open(reader: R) -> Result<Self, String> {
        let mut archive = ZipArchive::new(reader).map_err(|e| format!("not a zip package: {}", e))?;

        let main_part = match read_optional(&mut archive, "_rels/.rels")? {
            Some(xml) => parse_relationships(&xml)?
                .into_values()
                .find(|rel| rel.rel_type == OFFICE_DOCUMENT_REL && !rel.external)
                .map(|rel| resolve_target("", &rel.target))
                .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()),
            None => DEFAULT_MAIN_PART.to_string(),
        };

        let relationships = match read_optional(&mut archive, &rels_part_for(&main_part))? {
            Some(xml) => parse_relationships(&xml)?,
            None => HashMap::new(),
        };

        let (defaults, overrides) = match read_optional(&mut archive, "[Content_Types].xml")? {
            Some(xml) => parse_content_types(&xml)?,
            None => (HashMap::new(), HashMap::new()),
        };

        Ok(Self {
            archive,
            main_part,
            relationships,
            defaults,
            overrides,
        })
    }

    /// XML of the main document part
    pub fn main_document(&mut self) -> Result<String, String> {
        let name = self.main_part.clone();
        read_optional(&mut self.archive, &name)?
            .ok_or_else(|| format!("main document part {} is missing", name))
    }

    /// Resolve an embedded image by relationship id
    pub fn image_part(&mut self, rel_id: &str) -> Result<BinaryPart, ImageError> {
        let rel = self
            .relationships
            .get(rel_id)
            .ok_or_else(|| ImageError::UnknownRelationship(rel_id.to_string()))?;

        if rel.external {
            return Err(ImageError::ExternalTarget(rel_id.to_string()));
        }

        let part_name = resolve_target(parent_dir(&self.main_part), &rel.target);

        let mut bytes = Vec::new();
        match self.archive.by_name(&part_name) {
            Ok(mut file) => {
                file.read_to_end(&mut bytes)?;
            }
            Err(ZipError::FileNotFound) => return Err(ImageError::MissingPart(part_name)),
            Err(e) => return Err(e.into()),
        }

        Ok(BinaryPart {
            content_type: self.content_type_of(&part_name),
            bytes,
        })
    }

    /// Override by part name, then default by extension, then a guess
    fn content_type_of(&self, part_name: &str) -> String {
        if let Some(ct) = self.overrides.get(&format!("/{}", part_name).to_ascii_lowercase()) {
            return ct.clone();
        }

        let extension = part_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if let Some(ct) = self.defaults.get(&extension) {
            return ct.clone();
        }

        mime_guess::from_path(part_name)
            .first_raw()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string()
    }
}

fn read_optional<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, String> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(format!("failed to open {}: {}", name, e)),
    };

    let mut xml = String::new();
    file.read_to_string(&mut xml)
        .map_err(|e| format!("failed to read {}: {}", name, e))?;
    Ok(Some(xml))
}

/// `word/document.xml` -> `word/_rels/document.xml.rels`
fn rels_part_for(part_name: &str) -> String {
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_name),
    }
}

fn parent_dir(part_name: &str) -> &str {
    part_name.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolve a relationship target against the source part's directory
fn resolve_target(base_dir: &str, target: &str) -> String {
    let mut segments: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        base_dir.split('/').filter(|s| !s.is_empty()).collect()
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

fn attributes(element: &BytesStart) -> Result<HashMap<String, String>, String> {
    let mut attrs = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| format!("malformed attribute: {}", e))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("malformed attribute value: {}", e))?
            .into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

/// Visit every start or empty element in an XML document
fn for_each_element(
    xml: &str,
    mut visit: impl FnMut(&[u8], &BytesStart) -> Result<(), String>,
) -> Result<(), String> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => visit(e.local_name().as_ref(), &e)?,
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
        }
    }
}

pub(crate) fn parse_relationships(xml: &str) -> Result<HashMap<String, Relationship>, String> {
    let mut rels = HashMap::new();

    for_each_element(xml, |name, element| {
        if name != b"Relationship" {
            return Ok(());
        }

        let mut attrs = attributes(element)?;
        if let (Some(id), Some(target)) = (attrs.remove("Id"), attrs.remove("Target")) {
            rels.insert(
                id,
                Relationship {
                    rel_type: attrs.remove("Type").unwrap_or_default(),
                    target,
                    external: attrs
                        .get("TargetMode")
                        .is_some_and(|mode| mode.eq_ignore_ascii_case("External")),
                },
            );
        }
        Ok(())
    })?;

    Ok(rels)
}

type ContentTypeTables = (HashMap<String, String>, HashMap<String, String>);

pub(crate) fn parse_content_types(xml: &str) -> Result<ContentTypeTables, String> {
    let mut defaults = HashMap::new();
    let mut overrides = HashMap::new();

    for_each_element(xml, |name, element| {
        match name {
            b"Default" => {
                let mut attrs = attributes(element)?;
                if let (Some(ext), Some(ct)) = (attrs.remove("Extension"), attrs.remove("ContentType")) {
                    defaults.insert(ext.to_ascii_lowercase(), ct);
                }
            }
            b"Override" => {
                let mut attrs = attributes(element)?;
                if let (Some(part), Some(ct)) = (attrs.remove("PartName"), attrs.remove("ContentType")) {
                    overrides.insert(part.to_ascii_lowercase(), ct);
                }
            }
            _ => {}
        }
        Ok(())
    })?;

    Ok((defaults, overrides))
}
