//! DOCX text extraction: paragraph-by-paragraph text of `word/document.xml`.

use std::io::{Cursor, Read};
use std::sync::OnceLock;

use regex::Regex;

use crate::extract::ExtractError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Matches text runs, tabs, line breaks and paragraph ends in document order.
fn token_regex() -> &'static Regex {
    static TOKENS: OnceLock<Regex> = OnceLock::new();
    TOKENS.get_or_init(|| {
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab/>|<w:br(?:\s[^>]*)?/>|</w:p>")
            .expect("docx token regex is valid")
    })
}

pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::Docx(format!("{DOCUMENT_PART}: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;

    Ok(document_xml_to_text(&xml))
}

/// Flattens WordprocessingML into text, one line per paragraph.
pub fn document_xml_to_text(xml: &str) -> String {
    let mut out = String::new();
    for caps in token_regex().captures_iter(xml) {
        if let Some(run) = caps.get(1) {
            out.push_str(&decode_entities(run.as_str()));
            continue;
        }
        match caps.get(0).map(|m| m.as_str()) {
            Some("<w:tab/>") => out.push('\t'),
            Some("</w:p>") => out.push('\n'),
            Some(_) => out.push('\n'),
            None => {}
        }
    }
    out.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn entity_regex() -> &'static Regex {
    static ENTITIES: OnceLock<Regex> = OnceLock::new();
    ENTITIES.get_or_init(|| {
        Regex::new(r"&(?:#[xX]([0-9a-fA-F]{1,6})|#([0-9]{1,7})|(lt|gt|quot|apos|amp));")
            .expect("entity regex is valid")
    })
}

/// Decodes the XML named entities and numeric character references in one pass.
/// References to invalid code points are left as written.
fn decode_entities(s: &str) -> String {
    entity_regex()
        .replace_all(s, |caps: &regex::Captures| {
            let code = if let Some(hex) = caps.get(1) {
                u32::from_str_radix(hex.as_str(), 16).ok()
            } else if let Some(dec) = caps.get(2) {
                dec.as_str().parse::<u32>().ok()
            } else {
                let named = match caps.get(3).map(|m| m.as_str()) {
                    Some("lt") => '<',
                    Some("gt") => '>',
                    Some("quot") => '"',
                    Some("apos") => '\'',
                    _ => '&',
                };
                return named.to_string();
            };
            match code.and_then(char::from_u32) {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BODY: &str = r#"<w:document><w:body>
<w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
<w:p><w:r><w:t xml:space="preserve">Rust </w:t></w:r><w:r><w:t>&amp; Go</w:t></w:r></w:p>
<w:p><w:r><w:t>Skills</w:t><w:tab/><w:t>Tokio</w:t><w:br/><w:t>Axum</w:t></w:r></w:p>
</w:body></w:document>"#;

    #[test]
    fn test_paragraphs_become_lines() {
        let text = document_xml_to_text(BODY);
        assert_eq!(text, "Jane Doe\nRust & Go\nSkills\tTokio\nAxum");
    }

    #[test]
    fn test_empty_document_xml() {
        assert_eq!(document_xml_to_text("<w:document/>"), "");
    }

    #[test]
    fn test_extract_from_zip_archive() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file(DOCUMENT_PART, options).unwrap();
            writer.write_all(BODY.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        let text = extract_docx_text(buf.get_ref()).unwrap();
        assert!(text.starts_with("Jane Doe\n"));
    }

    #[test]
    fn test_not_a_zip_is_docx_error() {
        assert!(matches!(
            extract_docx_text(b"plain bytes"),
            Err(ExtractError::Docx(_))
        ));
    }

    #[test]
    fn test_numeric_character_references_decode() {
        assert_eq!(decode_entities("2019&#8211;2023"), "2019\u{2013}2023");
        assert_eq!(decode_entities("Jane&#x2019;s"), "Jane\u{2019}s");
        assert_eq!(decode_entities("R&amp;D &lt;team&gt;"), "R&D <team>");
    }

    #[test]
    fn test_entities_decode_once() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&#xD800;"), "&#xD800;");
    }
}
