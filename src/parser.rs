//! Reader for the Qt Linguist `.ts` XML format.
//!
//! The format is shallow and fixed: a `<TS>` root holding `<context>`
//! elements, each with a `<name>` and a run of `<message>` elements.
//! Elements this crate does not model (`oldsource`, `extracomment`,
//! vendor `extra-*` tags and the like) are skipped with a warning rather
//! than rejected, so catalogs produced by newer toolchains still load.

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::warn;

use crate::error::{CatalogError, CatalogResult};
use crate::ts::{Location, Translation, TranslationStatus, TsContext, TsDocument, TsMessage};

/// Parses a `.ts` document from a string.
pub fn parse_str(xml: &str) -> CatalogResult<TsDocument> {
    let mut reader = Reader::from_str(xml);
    let mut document = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"TS" => {
                if document.is_some() {
                    return Err(CatalogError::Malformed("multiple <TS> roots".to_string()));
                }
                document = Some(parse_ts(&mut reader, &e)?);
            }
            Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_) => {}
            Event::Text(t) if is_blank(&t) => {}
            Event::Eof => break,
            other => {
                return Err(CatalogError::Malformed(format!(
                    "unexpected content before <TS> root: {:?}",
                    other
                )));
            }
        }
    }

    document.ok_or_else(|| CatalogError::Malformed("missing <TS> root element".to_string()))
}

/// Parses a `.ts` document from a file.
pub fn parse_file(path: &Path) -> CatalogResult<TsDocument> {
    let xml = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    parse_str(&xml)
}

fn parse_ts(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> CatalogResult<TsDocument> {
    let mut document = TsDocument {
        version: attr(start, "version")?,
        language: attr(start, "language")?,
        source_language: attr(start, "sourcelanguage")?,
        contexts: Vec::new(),
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"context" => {
                document.contexts.push(parse_context(reader)?);
            }
            Event::Start(e) => skip_unknown(reader, &e)?,
            Event::Empty(e) => warn_unknown(&e),
            Event::Text(t) if is_blank(&t) => {}
            Event::Comment(_) => {}
            Event::End(e) if e.name().as_ref() == b"TS" => break,
            Event::Eof => {
                return Err(CatalogError::Malformed("unclosed <TS> element".to_string()));
            }
            other => {
                return Err(CatalogError::Malformed(format!(
                    "unexpected content in <TS>: {:?}",
                    other
                )));
            }
        }
    }

    Ok(document)
}

fn parse_context(reader: &mut Reader<&[u8]>) -> CatalogResult<TsContext> {
    let mut name = None;
    let mut messages = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"name" => {
                name = Some(read_text(reader, b"name")?);
            }
            Event::Empty(e) if e.name().as_ref() == b"name" => {
                name = Some(String::new());
            }
            Event::Start(e) if e.name().as_ref() == b"message" => {
                messages.push(parse_message(reader)?);
            }
            Event::Start(e) => skip_unknown(reader, &e)?,
            Event::Empty(e) => warn_unknown(&e),
            Event::Text(t) if is_blank(&t) => {}
            Event::Comment(_) => {}
            Event::End(e) if e.name().as_ref() == b"context" => break,
            Event::Eof => {
                return Err(CatalogError::Malformed(
                    "unclosed <context> element".to_string(),
                ));
            }
            other => {
                return Err(CatalogError::Malformed(format!(
                    "unexpected content in <context>: {:?}",
                    other
                )));
            }
        }
    }

    let name =
        name.ok_or_else(|| CatalogError::Malformed("<context> without <name>".to_string()))?;
    Ok(TsContext { name, messages })
}

fn parse_message(reader: &mut Reader<&[u8]>) -> CatalogResult<TsMessage> {
    let mut source = None;
    let mut comment = None;
    let mut locations = Vec::new();
    let mut translation = Translation::default();

    loop {
        match reader.read_event()? {
            Event::Empty(e) if e.name().as_ref() == b"location" => {
                locations.push(parse_location(&e)?);
            }
            Event::Start(e) if e.name().as_ref() == b"location" => {
                // Tolerate the non-self-closing spelling.
                locations.push(parse_location(&e)?);
                reader.read_to_end(e.to_end().name())?;
            }
            Event::Start(e) if e.name().as_ref() == b"source" => {
                source = Some(read_text(reader, b"source")?);
            }
            Event::Empty(e) if e.name().as_ref() == b"source" => {
                source = Some(String::new());
            }
            Event::Start(e) if e.name().as_ref() == b"comment" => {
                comment = Some(read_text(reader, b"comment")?);
            }
            Event::Empty(e) if e.name().as_ref() == b"comment" => {
                comment = Some(String::new());
            }
            Event::Start(e) if e.name().as_ref() == b"translation" => {
                let status = translation_status(&e)?;
                let text = read_text(reader, b"translation")?;
                translation = Translation { text, status };
            }
            Event::Empty(e) if e.name().as_ref() == b"translation" => {
                translation = Translation {
                    text: String::new(),
                    status: translation_status(&e)?,
                };
            }
            Event::Start(e) => skip_unknown(reader, &e)?,
            Event::Empty(e) => warn_unknown(&e),
            Event::Text(t) if is_blank(&t) => {}
            Event::Comment(_) => {}
            Event::End(e) if e.name().as_ref() == b"message" => break,
            Event::Eof => {
                return Err(CatalogError::Malformed(
                    "unclosed <message> element".to_string(),
                ));
            }
            other => {
                return Err(CatalogError::Malformed(format!(
                    "unexpected content in <message>: {:?}",
                    other
                )));
            }
        }
    }

    let source =
        source.ok_or_else(|| CatalogError::Malformed("<message> without <source>".to_string()))?;
    Ok(TsMessage {
        source,
        comment,
        locations,
        translation,
    })
}

fn parse_location(e: &BytesStart<'_>) -> CatalogResult<Location> {
    let line = match attr(e, "line")? {
        Some(raw) => Some(
            raw.parse()
                .map_err(|_| CatalogError::Malformed(format!("invalid location line '{}'", raw)))?,
        ),
        None => None,
    };
    Ok(Location {
        filename: attr(e, "filename")?,
        line,
    })
}

fn translation_status(e: &BytesStart<'_>) -> CatalogResult<TranslationStatus> {
    match attr(e, "type")? {
        Some(raw) => raw.parse(),
        None => Ok(TranslationStatus::Finished),
    }
}

/// Accumulates the text content of a leaf element up to its end tag,
/// decoding entity references (`&lt;`, `&quot;`, ...). Rich-text messages
/// arrive as one escaped blob, so leading/trailing whitespace must be kept
/// exactly as written.
fn read_text(reader: &mut Reader<&[u8]>, end: &[u8]) -> CatalogResult<String> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => {
                let decoded = t
                    .unescape()
                    .map_err(|e| CatalogError::Malformed(format!("bad entity reference: {}", e)))?;
                text.push_str(&decoded);
            }
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::End(e) if e.name().as_ref() == end => break,
            Event::Comment(_) => {}
            Event::Eof => {
                return Err(CatalogError::Malformed(format!(
                    "unclosed <{}> element",
                    String::from_utf8_lossy(end)
                )));
            }
            other => {
                return Err(CatalogError::Malformed(format!(
                    "unexpected content in <{}>: {:?}",
                    String::from_utf8_lossy(end),
                    other
                )));
            }
        }
    }
    Ok(text)
}

fn attr(e: &BytesStart<'_>, name: &str) -> CatalogResult<Option<String>> {
    match e.try_get_attribute(name)? {
        Some(a) => {
            let value = a
                .unescape_value()
                .map_err(|e| CatalogError::Malformed(format!("bad attribute value: {}", e)))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

fn skip_unknown(reader: &mut Reader<&[u8]>, e: &BytesStart<'_>) -> CatalogResult<()> {
    warn_unknown(e);
    reader.read_to_end(e.to_end().name())?;
    Ok(())
}

fn warn_unknown(e: &BytesStart<'_>) {
    warn!(
        element = %String::from_utf8_lossy(e.name().as_ref()),
        "skipping unrecognized element"
    );
}

fn is_blank(raw: &[u8]) -> bool {
    raw.iter().all(|b| b.is_ascii_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="pt-BR" sourcelanguage="en">
  <context>
    <name>PdfExport</name>
    <message>
      <location filename="../pdfexport.cpp" line="95"/>
      <location filename="../pdfexport.cpp" line="149"/>
      <source>Exported table: %1</source>
      <translation>Tabela exportada: %1</translation>
    </message>
    <message>
      <location filename="../pdfexport.cpp" line="230"/>
      <source>Property</source>
      <comment>index header</comment>
      <translation>Propriedade</translation>
    </message>
    <message>
      <location filename="../pdfexport.cpp" line="300"/>
      <source>Page size:</source>
      <translation type="unfinished"></translation>
    </message>
  </context>
</TS>
"#;

    #[test]
    fn test_parse_minimal() {
        let doc = parse_str(MINIMAL).unwrap();
        assert_eq!(doc.version.as_deref(), Some("2.1"));
        assert_eq!(doc.language.as_deref(), Some("pt-BR"));
        assert_eq!(doc.source_language.as_deref(), Some("en"));
        assert_eq!(doc.contexts.len(), 1);

        let ctx = &doc.contexts[0];
        assert_eq!(ctx.name, "PdfExport");
        assert_eq!(ctx.messages.len(), 3);

        let msg = &ctx.messages[0];
        assert_eq!(msg.source, "Exported table: %1");
        assert_eq!(msg.locations.len(), 2);
        assert_eq!(
            msg.locations[0].filename.as_deref(),
            Some("../pdfexport.cpp")
        );
        assert_eq!(msg.locations[0].line, Some(95));
        assert_eq!(msg.locations[1].line, Some(149));
        assert_eq!(msg.translation.text, "Tabela exportada: %1");
        assert_eq!(msg.translation.status, TranslationStatus::Finished);

        let msg = &ctx.messages[1];
        assert_eq!(msg.comment.as_deref(), Some("index header"));

        let msg = &ctx.messages[2];
        assert_eq!(msg.translation.status, TranslationStatus::Unfinished);
        assert_eq!(msg.translation.text, "");
    }

    #[test]
    fn test_parse_rich_text_entities() {
        let xml = r#"<TS version="2.1" language="tr-TR">
  <context>
    <name>AboutDialog</name>
    <message>
      <source>&lt;b&gt;Look &amp; feel&lt;/b&gt; &quot;%1&quot;</source>
      <translation>&lt;b&gt;Görünüş &amp; İzlenim&lt;/b&gt; &quot;%1&quot;</translation>
    </message>
  </context>
</TS>"#;
        let doc = parse_str(xml).unwrap();
        let msg = &doc.contexts[0].messages[0];
        assert_eq!(msg.source, "<b>Look & feel</b> \"%1\"");
        assert_eq!(msg.translation.text, "<b>Görünüş & İzlenim</b> \"%1\"");
    }

    #[test]
    fn test_parse_self_closing_translation() {
        let xml = r#"<TS>
  <context>
    <name>DataView</name>
    <message>
      <source>Filter data</source>
      <translation type="unfinished"/>
    </message>
  </context>
</TS>"#;
        let doc = parse_str(xml).unwrap();
        let msg = &doc.contexts[0].messages[0];
        assert_eq!(msg.translation.status, TranslationStatus::Unfinished);
        assert_eq!(msg.translation.text, "");
    }

    #[test]
    fn test_unknown_elements_are_skipped() {
        let xml = r#"<TS version="2.1">
  <context>
    <name>SqlEditor</name>
    <message>
      <source>Execute</source>
      <oldsource>Run</oldsource>
      <extracomment>toolbar button</extracomment>
      <translation>Çalıştır</translation>
    </message>
  </context>
</TS>"#;
        let doc = parse_str(xml).unwrap();
        let msg = &doc.contexts[0].messages[0];
        assert_eq!(msg.source, "Execute");
        assert_eq!(msg.translation.text, "Çalıştır");
    }

    #[test]
    fn test_missing_source_is_malformed() {
        let xml = r#"<TS>
  <context>
    <name>DbTree</name>
    <message>
      <translation>oops</translation>
    </message>
  </context>
</TS>"#;
        assert!(matches!(
            parse_str(xml),
            Err(CatalogError::Malformed(msg)) if msg.contains("<source>")
        ));
    }

    #[test]
    fn test_missing_context_name_is_malformed() {
        let xml = r#"<TS><context></context></TS>"#;
        assert!(matches!(
            parse_str(xml),
            Err(CatalogError::Malformed(msg)) if msg.contains("<name>")
        ));
    }

    #[test]
    fn test_missing_root() {
        assert!(parse_str("<?xml version=\"1.0\"?>").is_err());
    }

    #[test]
    fn test_preserves_whitespace_in_text() {
        let xml = "<TS><context><name>C</name><message><source> padded </source><translation> acolchoado </translation></message></context></TS>";
        let doc = parse_str(xml).unwrap();
        let msg = &doc.contexts[0].messages[0];
        assert_eq!(msg.source, " padded ");
        assert_eq!(msg.translation.text, " acolchoado ");
    }
}
