use citescan_core::{DecodeError, Document, DocumentDecoder};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decoder for `.txt` files. Blank lines separate paragraphs.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextDecoder;

impl DocumentDecoder for PlainTextDecoder {
    fn format_name(&self) -> &'static str {
        "text"
    }

    fn decode(&self, data: &[u8]) -> Result<Document, DecodeError> {
        let text = decode_text(data)?;
        Ok(Document::from_plain_text(&text))
    }
}

/// Decode text bytes as UTF-8 (with or without a byte-order mark), falling
/// back to Latin-1. Content with NUL bytes is treated as binary and rejected.
pub fn decode_text(data: &[u8]) -> Result<String, DecodeError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    if data.contains(&0) {
        return Err(DecodeError::Encoding(
            "file contains NUL bytes and does not look like text".to_string(),
        ));
    }

    match std::str::from_utf8(data) {
        Ok(text) => Ok(text.to_string()),
        Err(e) => {
            tracing::debug!(valid_up_to = e.valid_up_to(), "not UTF-8, decoding as Latin-1");
            Ok(data.iter().map(|&b| char::from(b)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8() {
        assert_eq!(decode_text("Müller, 2001".as_bytes()).unwrap(), "Müller, 2001");
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let mut data = UTF8_BOM.to_vec();
        data.extend_from_slice(b"Smith, 2005");
        assert_eq!(decode_text(&data).unwrap(), "Smith, 2005");
    }

    #[test]
    fn test_latin1_fallback() {
        // "Müller" in Latin-1: 0xFC is not valid UTF-8 on its own.
        assert_eq!(decode_text(b"M\xFCller, 2001").unwrap(), "Müller, 2001");
    }

    #[test]
    fn test_binary_rejected() {
        assert!(matches!(
            decode_text(b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR"),
            Err(DecodeError::Encoding(_))
        ));
    }

    #[test]
    fn test_decode_splits_paragraphs() {
        let doc = PlainTextDecoder
            .decode(b"First paragraph\ncontinues.\n\nSecond paragraph.\n")
            .unwrap();
        assert_eq!(doc.paragraphs.len(), 2);
        assert!(doc.paragraphs.iter().all(|p| !p.is_header_or_footer));
    }
}
