//! In-memory `.docx` fixtures

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const IMAGE_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Encode a blank RGBA PNG of the given size
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::new(width, height))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Inline drawing whose blip embeds `rel_id`
pub fn drawing(rel_id: &str) -> String {
    format!(
        r#"<w:r><w:drawing><wp:inline><wp:extent cx="952500" cy="635000"/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:blipFill><a:blip r:embed="{}"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#,
        rel_id
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn run(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, escape(text))
    }
}

#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    relationships: Vec<(String, String, bool)>,
    media: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        self.body.push_str(&format!("<w:p>{}</w:p>", run(text)));
        self
    }

    /// Paragraph with optional text followed by one drawing per rel id
    pub fn image_paragraph(mut self, text: &str, rel_ids: &[&str]) -> Self {
        let drawings: String = rel_ids.iter().map(|id| drawing(id)).collect();
        self.body.push_str(&format!("<w:p>{}{}</w:p>", run(text), drawings));
        self
    }

    /// Raw body XML
    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// Image stored at `word/media/<name>` and referenced by `rel_id`
    pub fn image(mut self, rel_id: &str, name: &str, bytes: Vec<u8>) -> Self {
        self.relationships
            .push((rel_id.to_string(), format!("media/{}", name), false));
        self.media.push((name.to_string(), bytes));
        self
    }

    /// Relationship without a backing part
    pub fn relationship(mut self, rel_id: &str, target: &str, external: bool) -> Self {
        self.relationships
            .push((rel_id.to_string(), target.to_string(), external));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut add = |name: &str, bytes: &[u8]| {
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            zip.start_file(name, options).unwrap();
            zip.write_all(bytes).unwrap();
        };

        add("[Content_Types].xml", CONTENT_TYPES.as_bytes());
        add("_rels/.rels", PACKAGE_RELS.as_bytes());
        add("word/document.xml", self.document_xml().as_bytes());
        add("word/_rels/document.xml.rels", self.rels_xml().as_bytes());
        for (name, bytes) in &self.media {
            add(&format!("word/media/{}", name), bytes);
        }

        zip.finish().unwrap().into_inner()
    }

    /// Write the package to `dir/name` and return its path
    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }

    fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body>{}<w:sectPr/></w:body></w:document>"#,
            self.body
        )
    }

    fn rels_xml(&self) -> String {
        let rels: String = self
            .relationships
            .iter()
            .map(|(id, target, external)| {
                let mode = if *external { r#" TargetMode="External""# } else { "" };
                format!(
                    r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                    id, IMAGE_REL, target, mode
                )
            })
            .collect();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            rels
        )
    }
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Default Extension="jpeg" ContentType="image/jpeg"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;
