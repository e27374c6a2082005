use crate::types::{DecodeError, Result};
use lopdf::{Document, Object};

/// Informational document metadata; never consumed by navigation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub declared_pages: usize,
}

impl DocumentMetadata {
    /// Read the info dictionary and page tree without rendering anything
    pub fn probe(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| DecodeError::Open(e.to_string()))?;

        let info = doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|obj| match obj {
                Object::Reference(id) => doc.get_dictionary(*id).ok(),
                Object::Dictionary(dict) => Some(dict),
                _ => None,
            });

        let text = |key: &[u8]| decode_text(info?.get(key).ok()?);

        Ok(Self {
            title: text(b"Title"),
            author: text(b"Author"),
            declared_pages: doc.get_pages().len(),
        })
    }
}

/// Text string in UTF-16BE, UTF-8 or PDFDocEncoding; blank values count as absent
fn decode_text(obj: &Object) -> Option<String> {
    lopdf::decode_text_string(obj)
        .ok()
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(bytes: &[u8]) -> Object {
        Object::String(bytes.to_vec(), lopdf::StringFormat::Literal)
    }

    #[test]
    fn decodes_utf16_titles() {
        let title = literal(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]);
        assert_eq!(decode_text(&title).as_deref(), Some("Hi"));
    }

    #[test]
    fn decodes_pdfdoc_punctuation() {
        assert_eq!(decode_text(&literal(b"Caf\xe9")).as_deref(), Some("Café"));
        assert_eq!(
            decode_text(&literal(b"Notes \x84 Part\x80Two")).as_deref(),
            Some("Notes \u{2014} Part\u{2022}Two")
        );
    }

    #[test]
    fn blank_titles_are_absent() {
        assert_eq!(decode_text(&literal(b"   ")), None);
        assert_eq!(decode_text(&Object::Integer(3)), None);
    }

    #[test]
    fn rejects_garbage() {
        assert!(DocumentMetadata::probe(b"not a pdf").is_err());
    }
}
