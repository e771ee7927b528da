//! Writer for the Qt Linguist `.ts` XML format.
//!
//! Output follows the layout the Qt toolchain itself produces: UTF-8
//! prolog, `<!DOCTYPE TS>`, two-space indentation, locations as
//! self-closing tags. Parsing a file and writing it back preserves every
//! (context, source, comment, translation, locations) tuple and their
//! order.

use std::fmt::Display;
use std::fs;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{CatalogError, CatalogResult};
use crate::ts::{TsContext, TsDocument, TsMessage};

/// Serializes a document to TS XML.
pub fn to_string(doc: &TsDocument) -> CatalogResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    emit(writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None))))?;
    emit(writer.write_event(Event::DocType(BytesText::from_escaped("TS"))))?;

    let mut ts = BytesStart::new("TS");
    if let Some(version) = &doc.version {
        ts.push_attribute(("version", version.as_str()));
    }
    if let Some(language) = &doc.language {
        ts.push_attribute(("language", language.as_str()));
    }
    if let Some(source_language) = &doc.source_language {
        ts.push_attribute(("sourcelanguage", source_language.as_str()));
    }
    emit(writer.write_event(Event::Start(ts)))?;

    for context in &doc.contexts {
        write_context(&mut writer, context)?;
    }

    emit(writer.write_event(Event::End(BytesEnd::new("TS"))))?;

    let mut xml = String::from_utf8(writer.into_inner())
        .map_err(|e| CatalogError::Malformed(format!("non-UTF-8 output: {}", e)))?;
    xml.push('\n');
    Ok(xml)
}

/// Serializes a document and writes it to a file.
pub fn write_file(doc: &TsDocument, path: &Path) -> CatalogResult<()> {
    let xml = to_string(doc)?;
    fs::write(path, xml).map_err(|e| CatalogError::io(path, e))
}

fn write_context(writer: &mut Writer<Vec<u8>>, context: &TsContext) -> CatalogResult<()> {
    emit(writer.write_event(Event::Start(BytesStart::new("context"))))?;
    write_text_element(writer, "name", &context.name)?;
    for message in &context.messages {
        write_message(writer, message)?;
    }
    emit(writer.write_event(Event::End(BytesEnd::new("context"))))
}

fn write_message(writer: &mut Writer<Vec<u8>>, message: &TsMessage) -> CatalogResult<()> {
    emit(writer.write_event(Event::Start(BytesStart::new("message"))))?;

    for location in &message.locations {
        let mut el = BytesStart::new("location");
        if let Some(filename) = &location.filename {
            el.push_attribute(("filename", filename.as_str()));
        }
        if let Some(line) = location.line {
            el.push_attribute(("line", line.to_string().as_str()));
        }
        emit(writer.write_event(Event::Empty(el)))?;
    }

    write_text_element(writer, "source", &message.source)?;
    if let Some(comment) = &message.comment {
        write_text_element(writer, "comment", comment)?;
    }

    let mut el = BytesStart::new("translation");
    if let Some(status) = message.translation.status.as_attr() {
        el.push_attribute(("type", status));
    }
    if message.translation.text.is_empty() {
        emit(writer.write_event(Event::Empty(el)))?;
    } else {
        emit(writer.write_event(Event::Start(el)))?;
        emit(writer.write_event(Event::Text(BytesText::new(&message.translation.text))))?;
        emit(writer.write_event(Event::End(BytesEnd::new("translation"))))?;
    }

    emit(writer.write_event(Event::End(BytesEnd::new("message"))))
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> CatalogResult<()> {
    if text.is_empty() {
        return emit(writer.write_event(Event::Empty(BytesStart::new(tag))));
    }
    emit(writer.write_event(Event::Start(BytesStart::new(tag))))?;
    emit(writer.write_event(Event::Text(BytesText::new(text))))?;
    emit(writer.write_event(Event::End(BytesEnd::new(tag))))
}

fn emit<E: Display>(result: Result<(), E>) -> CatalogResult<()> {
    result.map_err(|e| CatalogError::Malformed(format!("failed to write XML: {}", e)))
}
