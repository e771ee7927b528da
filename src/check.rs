//! Catalog consistency audit.
//!
//! A translated catalog can drift from its source strings in ways the
//! Linguist toolchain does not reject: a translation can lose or invent a
//! `%N` marker, a context can carry two messages with the same identity,
//! a finished entry can be empty. The audit walks a parsed document and
//! reports these, so a build can gate on them before shipping a catalog.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::placeholder;
use crate::ts::{TranslationStatus, TsDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One finding, attached to the message it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub context: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub kind: IssueKind,
}

impl Issue {
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}] \"{}\"", self.severity(), self.context, self.source)?;
        if let Some(comment) = &self.comment {
            write!(f, " ({})", comment)?;
        }
        write!(f, ": {}", self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// The translation's set of `%N` markers differs from the source's.
    PlaceholderMismatch {
        source_markers: Vec<u32>,
        translation_markers: Vec<u32>,
    },
    /// Marker sets match but appear in a different order. Translators
    /// reorder markers legitimately, so this is informational only.
    PlaceholderOrder {
        source_order: Vec<u32>,
        translation_order: Vec<u32>,
    },
    /// Source markers do not form a contiguous `%1..%n` run.
    NonContiguousPlaceholders { markers: Vec<u32> },
    /// Two messages in one context share (source, comment).
    DuplicateMessage,
    /// A finished translation with no text.
    EmptyFinishedTranslation,
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::PlaceholderMismatch { .. } | IssueKind::DuplicateMessage => Severity::Error,
            IssueKind::PlaceholderOrder { .. }
            | IssueKind::NonContiguousPlaceholders { .. }
            | IssueKind::EmptyFinishedTranslation => Severity::Warning,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::PlaceholderMismatch {
                source_markers,
                translation_markers,
            } => write!(
                f,
                "placeholder mismatch: source has {}, translation has {}",
                format_markers(source_markers),
                format_markers(translation_markers)
            ),
            IssueKind::PlaceholderOrder {
                source_order,
                translation_order,
            } => write!(
                f,
                "placeholders reordered: {} vs {}",
                format_markers(source_order),
                format_markers(translation_order)
            ),
            IssueKind::NonContiguousPlaceholders { markers } => {
                write!(f, "non-contiguous placeholders: {}", format_markers(markers))
            }
            IssueKind::DuplicateMessage => write!(f, "duplicate (source, comment) in context"),
            IssueKind::EmptyFinishedTranslation => write!(f, "finished translation is empty"),
        }
    }
}

fn format_markers(markers: &[u32]) -> String {
    if markers.is_empty() {
        return "none".to_string();
    }
    markers
        .iter()
        .map(|n| format!("%{}", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Audits a whole document and returns its findings in document order.
pub fn audit(doc: &TsDocument) -> Vec<Issue> {
    let mut issues = Vec::new();

    for context in &doc.contexts {
        let mut seen: HashSet<(&str, Option<&str>)> = HashSet::new();

        for message in &context.messages {
            let issue = |kind: IssueKind| Issue {
                context: context.name.clone(),
                source: message.source.clone(),
                comment: message.comment.clone(),
                kind,
            };

            if !seen.insert(message.key()) {
                issues.push(issue(IssueKind::DuplicateMessage));
            }

            let source_markers = placeholder::indices(&message.source);
            if !is_contiguous(&source_markers) {
                issues.push(issue(IssueKind::NonContiguousPlaceholders {
                    markers: sorted(&source_markers),
                }));
            }

            // Unfinished/vanished/obsolete payloads are either empty or a
            // stale copy of the source; only finished entries are checked.
            if !message.translation.is_displayable() {
                if message.translation.status == TranslationStatus::Finished {
                    issues.push(issue(IssueKind::EmptyFinishedTranslation));
                }
                continue;
            }

            let translation_markers = placeholder::indices(&message.translation.text);
            if sorted(&source_markers) != sorted(&translation_markers) {
                issues.push(issue(IssueKind::PlaceholderMismatch {
                    source_markers: sorted(&source_markers),
                    translation_markers: sorted(&translation_markers),
                }));
            } else if source_markers != translation_markers {
                issues.push(issue(IssueKind::PlaceholderOrder {
                    source_order: source_markers.clone(),
                    translation_order: translation_markers,
                }));
            }
        }
    }

    issues
}

/// True when the audit found at least one error-severity issue.
pub fn has_errors(issues: &[Issue]) -> bool {
    issues.iter().any(|i| i.severity() == Severity::Error)
}

fn is_contiguous(markers: &[u32]) -> bool {
    let markers = sorted(markers);
    markers.iter().enumerate().all(|(i, &n)| n == i as u32 + 1)
}

fn sorted(markers: &[u32]) -> Vec<u32> {
    let mut markers = markers.to_vec();
    markers.sort_unstable();
    markers
}
