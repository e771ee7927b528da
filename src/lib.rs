//! Load, query and validate Qt Linguist translation catalogs.
//!
//! A `.ts` file is an XML string table: contexts (one per UI component)
//! holding messages, where each message pairs a source-language string
//! with its translation for one target locale. This crate parses those
//! files into [`TsDocument`] values, indexes them as [`Catalog`]s for
//! display-string lookup with positional `%1`/`%2` substitution, collects
//! catalogs per locale in [`I18n`], re-serializes documents byte-faithfully
//! enough to round-trip every message, and audits catalogs for placeholder
//! drift.
//!
//! A missing translation is never an error: lookup falls back silently to
//! the source string, exactly as the host toolkit does at runtime.

use std::collections::HashMap;

use tracing::debug;

pub mod check;
pub mod error;
pub mod loader;
pub mod locale;
pub mod parser;
pub mod placeholder;
pub mod ts;
pub mod writer;

pub use check::{Issue, IssueKind, Severity, audit, has_errors};
pub use error::{CatalogError, CatalogResult};
pub use loader::{load_all_catalogs_from_dir, load_catalog_from_file};
pub use parser::{parse_file, parse_str};
pub use ts::{Location, Translation, TranslationStatus, TsContext, TsDocument, TsMessage};
pub use writer::write_file;

type MessageKey = (String, Option<String>);

/// A read-only lookup index over one parsed catalog.
///
/// Only finished, non-empty translations are returned; everything else
/// falls back to the source string at lookup time.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    language: Option<String>,
    contexts: HashMap<String, HashMap<MessageKey, Option<String>>>,
}

impl Catalog {
    /// Indexes a parsed document. When a context carries duplicate
    /// (source, comment) identities the first entry wins, matching the
    /// catalog invariant (the audit reports the duplicate).
    pub fn from_document(document: TsDocument) -> Self {
        let mut contexts: HashMap<String, HashMap<MessageKey, Option<String>>> = HashMap::new();
        for context in document.contexts {
            let entries = contexts.entry(context.name).or_default();
            for message in context.messages {
                let text = message
                    .translation
                    .is_displayable()
                    .then_some(message.translation.text);
                entries.entry((message.source, message.comment)).or_insert(text);
            }
        }
        Catalog {
            language: document.language,
            contexts,
        }
    }

    /// The catalog's target locale, from the document's `language`
    /// attribute.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Returns the finished translation for (context, source, comment),
    /// or None when the context or message is absent or the entry is not
    /// displayable.
    pub fn lookup(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&str> {
        let key = (source.to_string(), comment.map(str::to_string));
        self.contexts
            .get(context)?
            .get(&key)?
            .as_deref()
            .filter(|text| !text.is_empty())
    }

    /// Lookup with silent fallback to the source string.
    pub fn tr<'a>(&'a self, context: &str, source: &'a str) -> &'a str {
        self.tr_c(context, source, None)
    }

    /// Like [`Catalog::tr`] with a disambiguation comment.
    pub fn tr_c<'a>(&'a self, context: &str, source: &'a str, comment: Option<&str>) -> &'a str {
        self.lookup(context, source, comment).unwrap_or(source)
    }

    /// Full display path: lookup, fallback, then positional substitution
    /// of `%N` markers with `values`.
    pub fn translate(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        values: &[&str],
    ) -> String {
        placeholder::substitute(self.tr_c(context, source, comment), values)
    }
}

/// Multi-locale catalog store.
///
/// Holds one [`Catalog`] per normalized locale plus the source locale of
/// the application. Lookup walks the locale fallback chain (`pt-BR` ->
/// `pt`) before giving up and returning the source string.
#[derive(Debug, Default)]
pub struct I18n {
    catalogs: HashMap<String, Catalog>,
    source_locale: String,
}

impl I18n {
    pub fn new() -> Self {
        I18n {
            catalogs: HashMap::new(),
            source_locale: "en".to_string(),
        }
    }

    /// Sets the locale the source strings are written in. Requests for
    /// this locale skip catalog lookup entirely.
    pub fn with_source_locale(&mut self, tag: &str) -> &mut Self {
        self.source_locale = normalize_or_keep(tag);
        self
    }

    pub fn source_locale(&self) -> &str {
        &self.source_locale
    }

    pub fn with_catalog_for_locale(&mut self, tag: &str, catalog: Catalog) -> &mut Self {
        self.catalogs.insert(normalize_or_keep(tag), catalog);
        self
    }

    pub fn catalog(&self, tag: &str) -> Option<&Catalog> {
        self.catalogs.get(&normalize_or_keep(tag))
    }

    /// Translated string for (context, source, comment) in the requested
    /// locale, following the locale fallback chain, or the source string.
    pub fn tr<'a>(
        &'a self,
        tag: &str,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
    ) -> &'a str {
        let requested = normalize_or_keep(tag);
        if requested == self.source_locale {
            return source;
        }

        for (i, candidate) in locale::fallback_chain(&requested).iter().enumerate() {
            if let Some(catalog) = self.catalogs.get(candidate) {
                if let Some(text) = catalog.lookup(context, source, comment) {
                    if i > 0 {
                        debug!(
                            requested = %requested,
                            used = %candidate,
                            context,
                            "resolved message through locale fallback"
                        );
                    }
                    return text;
                }
            }
        }
        source
    }

    /// Full display path with `%N` substitution.
    pub fn translate(
        &self,
        tag: &str,
        context: &str,
        source: &str,
        comment: Option<&str>,
        values: &[&str],
    ) -> String {
        placeholder::substitute(self.tr(tag, context, source, comment), values)
    }
}

fn normalize_or_keep(tag: &str) -> String {
    locale::normalize(tag).unwrap_or_else(|_| tag.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt_br_catalog() -> Catalog {
        let doc = parse_str(
            r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="pt-BR" sourcelanguage="en">
  <context>
    <name>PdfExportConfig</name>
    <message>
      <source>Page size:</source>
      <translation>Tamanho da página:</translation>
    </message>
    <message>
      <source>Exported table: %1</source>
      <translation>Tabela exportada: %1</translation>
    </message>
    <message>
      <source>Margins</source>
      <translation type="unfinished">Margins</translation>
    </message>
  </context>
  <context>
    <name>PdfExport</name>
    <message>
      <source>Property</source>
      <comment>index header</comment>
      <translation>Propriedade</translation>
    </message>
    <message>
      <source>Property</source>
      <comment>trigger header</comment>
      <translation>Característica</translation>
    </message>
  </context>
</TS>
"#,
        )
        .unwrap();
        Catalog::from_document(doc)
    }

    #[test]
    fn test_finished_lookup_returns_translation() {
        let catalog = pt_br_catalog();
        assert_eq!(
            catalog.tr("PdfExportConfig", "Page size:"),
            "Tamanho da página:"
        );
    }

    #[test]
    fn test_unfinished_falls_back_to_source() {
        let catalog = pt_br_catalog();
        assert_eq!(catalog.tr("PdfExportConfig", "Margins"), "Margins");
        assert!(catalog.lookup("PdfExportConfig", "Margins", None).is_none());
    }

    #[test]
    fn test_missing_context_falls_back_to_source() {
        let catalog = pt_br_catalog();
        assert_eq!(catalog.tr("DataView", "Page size:"), "Page size:");
    }

    #[test]
    fn test_comment_disambiguation() {
        let catalog = pt_br_catalog();
        assert_eq!(
            catalog.tr_c("PdfExport", "Property", Some("index header")),
            "Propriedade"
        );
        assert_eq!(
            catalog.tr_c("PdfExport", "Property", Some("trigger header")),
            "Característica"
        );
        // No comment means no match against commented entries.
        assert_eq!(catalog.tr("PdfExport", "Property"), "Property");
    }

    #[test]
    fn test_translate_substitutes_values() {
        let catalog = pt_br_catalog();
        assert_eq!(
            catalog.translate("PdfExportConfig", "Exported table: %1", None, &["clientes"]),
            "Tabela exportada: clientes"
        );
        // Fallback path still substitutes.
        assert_eq!(
            catalog.translate("Nowhere", "Row %1", None, &["7"]),
            "Row 7"
        );
    }

    #[test]
    fn test_i18n_locale_fallback() {
        let mut i18n = I18n::new();
        i18n.with_source_locale("en")
            .with_catalog_for_locale("pt", pt_br_catalog());

        // pt-BR has no catalog of its own; pt is next in the chain.
        assert_eq!(
            i18n.tr("pt-BR", "PdfExportConfig", "Page size:", None),
            "Tamanho da página:"
        );
        // Source locale short-circuits.
        assert_eq!(
            i18n.tr("en", "PdfExportConfig", "Page size:", None),
            "Page size:"
        );
        // Unknown locale falls back to source text.
        assert_eq!(
            i18n.tr("tr-TR", "PdfExportConfig", "Page size:", None),
            "Page size:"
        );
    }

    #[test]
    fn test_i18n_normalizes_tags() {
        let mut i18n = I18n::new();
        i18n.with_catalog_for_locale("PT_br", pt_br_catalog());
        assert_eq!(
            i18n.tr("pt-BR", "PdfExportConfig", "Page size:", None),
            "Tamanho da página:"
        );
        assert!(i18n.catalog("pt_BR").is_some());
    }

    #[test]
    fn test_i18n_translate() {
        let mut i18n = I18n::new();
        i18n.with_catalog_for_locale("pt-BR", pt_br_catalog());
        assert_eq!(
            i18n.translate(
                "pt-BR",
                "PdfExportConfig",
                "Exported table: %1",
                None,
                &["clientes"]
            ),
            "Tabela exportada: clientes"
        );
    }
}
