//! Decoder for Word documents (`.docx`).
//!
//! A `.docx` file is a ZIP package. Body text lives in `word/document.xml`,
//! page headers and footers in `word/header*.xml` / `word/footer*.xml`:
//! ```xml
//! <w:document>
//!   <w:body>
//!     <w:p><w:r><w:t>This finding confirms </w:t></w:r><w:r><w:t>Smith et al., 2010.</w:t></w:r></w:p>
//!   </w:body>
//! </w:document>
//! ```
//! Text is taken from `<w:t>` runs only, so deleted text and field codes are
//! left out.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;

use citescan_core::{DecodeError, Document, DocumentDecoder, Paragraph};

const BODY_PART: &str = "word/document.xml";

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxDecoder;

impl DocumentDecoder for DocxDecoder {
    fn format_name(&self) -> &'static str {
        "docx"
    }

    fn decode(&self, data: &[u8]) -> Result<Document, DecodeError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))
            .map_err(|e| DecodeError::Corrupt(format!("not a valid .docx package: {e}")))?;

        let mut headers = Vec::new();
        let mut footers = Vec::new();
        let mut has_body = false;
        for name in archive.file_names() {
            if name == BODY_PART {
                has_body = true;
            }
            if !name.ends_with(".xml") {
                continue;
            }
            if name.starts_with("word/header") {
                headers.push(name.to_string());
            } else if name.starts_with("word/footer") {
                footers.push(name.to_string());
            }
        }
        headers.sort();
        footers.sort();

        if !has_body {
            return Err(DecodeError::Corrupt(format!("missing {BODY_PART}")));
        }

        let mut paragraphs = Vec::new();
        for part in &headers {
            let texts = read_part(&mut archive, part)?;
            paragraphs.extend(texts.into_iter().map(Paragraph::header_or_footer));
        }
        let body = read_part(&mut archive, BODY_PART)?;
        paragraphs.extend(body.into_iter().map(Paragraph::body));
        for part in &footers {
            let texts = read_part(&mut archive, part)?;
            paragraphs.extend(texts.into_iter().map(Paragraph::header_or_footer));
        }

        tracing::debug!(
            paragraphs = paragraphs.len(),
            header_parts = headers.len(),
            footer_parts = footers.len(),
            "decoded docx"
        );
        Ok(Document::new(paragraphs))
    }
}

fn read_part(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Vec<String>, DecodeError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| DecodeError::Corrupt(format!("{name}: {e}")))?;
    let mut xml = Vec::new();
    entry
        .read_to_end(&mut xml)
        .map_err(|e| DecodeError::Corrupt(format!("{name}: {e}")))?;
    parse_paragraphs(&xml).map_err(|e| DecodeError::Corrupt(format!("{name}: {e}")))
}

/// Collect the text of every `<w:p>` in a WordprocessingML part, in document
/// order. `<w:tab/>` becomes a tab and `<w:br/>`/`<w:cr/>` a newline.
pub(crate) fn parse_paragraphs(xml: &[u8]) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    // Paragraphs can nest through text boxes, so keep a stack.
    let mut open: Vec<String> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut run_depth: u32 = 0;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => open.push(String::new()),
                b"r" => run_depth += 1,
                b"t" if run_depth > 0 => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" if run_depth > 0 => push_char(&mut open, '\t'),
                b"br" | b"cr" if run_depth > 0 => push_char(&mut open, '\n'),
                _ => {}
            },
            Event::Text(e) if in_text => {
                if let Some(current) = open.last_mut() {
                    current.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(done) = open.pop() {
                        paragraphs.push(done);
                    }
                }
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

fn push_char(open: &mut [String], c: char) {
    if let Some(current) = open.last_mut() {
        current.push(c);
    }
}
