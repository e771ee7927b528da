use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CatalogError;

/// A parsed Qt Linguist `.ts` document.
///
/// Contexts and messages keep the order they appear in the file so that
/// re-serializing a document reproduces it faithfully.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TsDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    pub contexts: Vec<TsContext>,
}

impl TsDocument {
    pub fn context(&self, name: &str) -> Option<&TsContext> {
        self.contexts.iter().find(|ctx| ctx.name == name)
    }

    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|ctx| ctx.messages.len()).sum()
    }
}

/// Grouping of messages belonging to one UI component of the host
/// application (e.g. `MainWindow`, `DbTree`, `SqlEditor`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TsContext {
    pub name: String,
    pub messages: Vec<TsMessage>,
}

impl TsContext {
    pub fn new(name: impl Into<String>) -> Self {
        TsContext {
            name: name.into(),
            messages: Vec::new(),
        }
    }

    /// Finds a message by its identity, the (source, comment) pair.
    pub fn message(&self, source: &str, comment: Option<&str>) -> Option<&TsMessage> {
        self.messages
            .iter()
            .find(|msg| msg.source == source && msg.comment.as_deref() == comment)
    }
}

/// A single translatable unit.
///
/// Identified within its context by (source, comment) - not by location,
/// since one message may originate from several places in the host
/// application's sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TsMessage {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    pub translation: Translation,
}

impl TsMessage {
    pub fn key(&self) -> (&str, Option<&str>) {
        (&self.source, self.comment.as_deref())
    }
}

/// Source-file provenance of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Translation payload plus its workflow status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub text: String,
    pub status: TranslationStatus,
}

impl Translation {
    pub fn finished(text: impl Into<String>) -> Self {
        Translation {
            text: text.into(),
            status: TranslationStatus::Finished,
        }
    }

    pub fn unfinished(text: impl Into<String>) -> Self {
        Translation {
            text: text.into(),
            status: TranslationStatus::Unfinished,
        }
    }

    /// True when the payload is usable for display. Unfinished entries
    /// carry a copy of the source text (or nothing) and vanished/obsolete
    /// entries refer to source strings that no longer exist, so only
    /// finished, non-empty translations qualify.
    pub fn is_displayable(&self) -> bool {
        self.status == TranslationStatus::Finished && !self.text.is_empty()
    }
}

/// Status carried by the `type` attribute of `<translation>`. A missing
/// attribute means the translation is finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    #[default]
    Finished,
    Unfinished,
    Vanished,
    Obsolete,
}

impl TranslationStatus {
    /// Attribute value to emit, or None for the finished state.
    pub fn as_attr(&self) -> Option<&'static str> {
        match self {
            TranslationStatus::Finished => None,
            TranslationStatus::Unfinished => Some("unfinished"),
            TranslationStatus::Vanished => Some("vanished"),
            TranslationStatus::Obsolete => Some("obsolete"),
        }
    }
}

impl fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_attr().unwrap_or("finished"))
    }
}

impl FromStr for TranslationStatus {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unfinished" => Ok(TranslationStatus::Unfinished),
            "vanished" => Ok(TranslationStatus::Vanished),
            "obsolete" => Ok(TranslationStatus::Obsolete),
            _ => Err(CatalogError::Malformed(format!(
                "unknown translation type '{}'",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_identity() {
        let mut ctx = TsContext::new("PdfExport");
        ctx.messages.push(TsMessage {
            source: "Property".to_string(),
            comment: Some("index header".to_string()),
            locations: vec![],
            translation: Translation::finished("Propriedade"),
        });
        ctx.messages.push(TsMessage {
            source: "Property".to_string(),
            comment: Some("trigger header".to_string()),
            locations: vec![],
            translation: Translation::finished("Característica"),
        });

        let msg = ctx.message("Property", Some("index header")).unwrap();
        assert_eq!(msg.translation.text, "Propriedade");
        let msg = ctx.message("Property", Some("trigger header")).unwrap();
        assert_eq!(msg.translation.text, "Característica");
        assert!(ctx.message("Property", None).is_none());
    }

    #[test]
    fn test_displayable() {
        assert!(Translation::finished("Coluna").is_displayable());
        assert!(!Translation::finished("").is_displayable());
        assert!(!Translation::unfinished("Column").is_displayable());
        let vanished = Translation {
            text: "gone".to_string(),
            status: TranslationStatus::Vanished,
        };
        assert!(!vanished.is_displayable());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TranslationStatus::Unfinished,
            TranslationStatus::Vanished,
            TranslationStatus::Obsolete,
        ] {
            let attr = status.as_attr().unwrap();
            assert_eq!(attr.parse::<TranslationStatus>().unwrap(), status);
        }
        assert!(TranslationStatus::Finished.as_attr().is_none());
        assert!("bogus".parse::<TranslationStatus>().is_err());
    }
}
