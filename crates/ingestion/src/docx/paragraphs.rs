//! Streaming walk over the main document body
//!
//! Only paragraphs that are direct children of `w:body` are collected.
//! Paragraphs nested in tables, content controls or text boxes are skipped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A body paragraph before it is turned into content parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawParagraph {
    pub text: String,
    /// One entry per drawing, holding its blip's `r:embed` id if any
    pub drawings: Vec<Option<String>>,
}

impl RawParagraph {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

struct OpenParagraph {
    /// Stack index of the `w:p` element
    depth: usize,
    /// Stack index of the drawing currently open, if any
    drawing: Option<usize>,
    raw: RawParagraph,
}

impl OpenParagraph {
    /// Element path below the paragraph, excluding `name` itself
    fn path<'a>(&self, stack: &'a [Vec<u8>]) -> Vec<&'a [u8]> {
        stack[self.depth + 1..].iter().map(Vec::as_slice).collect()
    }

    fn on_element(&mut self, stack: &[Vec<u8>], name: &[u8], element: &BytesStart, opens: bool) {
        let path = self.path(stack);
        let in_run = matches!(path.as_slice(), [b"r"] | [b"hyperlink", b"r"]);

        match name {
            b"drawing" => {
                self.raw.drawings.push(None);
                if opens {
                    self.drawing = Some(stack.len());
                }
            }
            b"blip" if self.drawing.is_some() => {
                if let Some(slot) = self.raw.drawings.last_mut() {
                    if slot.is_none() {
                        *slot = embed_id(element);
                    }
                }
            }
            b"tab" if in_run => self.raw.text.push('\t'),
            b"br" if in_run && is_line_break(element) => self.raw.text.push('\n'),
            b"cr" if in_run => self.raw.text.push('\n'),
            _ => {}
        }
    }

    fn accepts_text(&self, stack: &[Vec<u8>]) -> bool {
        matches!(
            self.path(stack).as_slice(),
            [b"r", b"t"] | [b"hyperlink", b"r", b"t"]
        )
    }
}

fn embed_id(element: &BytesStart) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"embed")
        .and_then(|attr| attr.unescape_value().ok())
        .map(|value| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Page and column breaks carry no text; only text-wrapping breaks do
fn is_line_break(element: &BytesStart) -> bool {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"type")
        .map_or(true, |attr| attr.value.as_ref() == b"textWrapping")
}

fn is_body(stack: &[Vec<u8>]) -> bool {
    stack.last().is_some_and(|parent| parent.as_slice() == b"body")
}

/// Collect the body's top-level paragraphs in document order
pub(crate) fn parse_body(xml: &str) -> Result<Vec<RawParagraph>, String> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<OpenParagraph> = None;
    let mut paragraphs = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            format!("XML error at position {}: {}", reader.buffer_position(), e)
        })?;

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();

                if let Some(open) = current.as_mut() {
                    open.on_element(&stack, &name, &e, true);
                } else if name == b"p" && is_body(&stack) {
                    current = Some(OpenParagraph {
                        depth: stack.len(),
                        drawing: None,
                        raw: RawParagraph::default(),
                    });
                }

                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name();
                if let Some(open) = current.as_mut() {
                    open.on_element(&stack, name.as_ref(), &e, false);
                } else if name.as_ref() == b"p" && is_body(&stack) {
                    paragraphs.push(RawParagraph::default());
                }
            }
            Event::Text(e) => {
                if let Some(open) = current.as_mut() {
                    if open.accepts_text(&stack) {
                        let text = e
                            .unescape()
                            .map_err(|err| format!("bad text content: {}", err))?;
                        open.raw.text.push_str(&text);
                    }
                }
            }
            Event::End(_) => {
                stack.pop();
                let depth = stack.len();

                if let Some(open) = current.as_mut() {
                    if open.drawing == Some(depth) {
                        open.drawing = None;
                    }
                    if open.depth == depth {
                        if let Some(done) = current.take() {
                            paragraphs.push(done.raw);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!(
            "unexpected end of document inside <{}>",
            String::from_utf8_lossy(open)
        ));
    }

    Ok(paragraphs)
}
