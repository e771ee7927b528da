//! Loading catalogs from disk.
//!
//! A single `.ts` file becomes a [`Catalog`]; a directory of them becomes
//! a locale-keyed map. The locale of a file is taken from its `language`
//! attribute when present, otherwise deduced from the Qt file-name
//! convention (`guiSQLiteStudio_tr_TR.ts` -> `tr-TR`).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::locale;
use crate::parser;
use crate::Catalog;

/// Loads a single `.ts` file.
pub fn load_catalog_from_file(path: &Path) -> CatalogResult<Catalog> {
    let document = parser::parse_file(path)?;
    debug!(
        path = %path.display(),
        contexts = document.contexts.len(),
        messages = document.message_count(),
        "loaded catalog"
    );
    Ok(Catalog::from_document(document))
}

/// Deduces the normalized locale for a catalog file: the document's
/// `language` attribute wins, then the longest parseable underscore
/// suffix of the file stem.
pub fn locale_for_file(path: &Path, language_attr: Option<&str>) -> CatalogResult<String> {
    if let Some(tag) = language_attr {
        return locale::normalize(tag);
    }
    locale_from_filename(path).ok_or_else(|| CatalogError::UnknownLocale(path.to_path_buf()))
}

/// Deduces a locale from a file name alone: `PdfExport_pt_BR.ts` ->
/// `pt-BR`, `tr-TR.ts` -> `tr-TR`. Returns None when no suffix parses.
pub fn locale_from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let parts: Vec<&str> = stem.split('_').collect();
    for start in 0..parts.len() {
        let candidate = parts[start..].join("-");
        if let Ok(tag) = locale::normalize(&candidate) {
            return Some(tag);
        }
    }
    None
}

/// Loads every `.ts` file in a directory into a locale -> catalog map.
///
/// Non-`.ts` entries are skipped. A file whose locale cannot be
/// determined is an error; so is a duplicate locale, since one of the two
/// catalogs would silently win.
pub fn load_all_catalogs_from_dir(dir: &Path) -> CatalogResult<HashMap<String, Catalog>> {
    if !dir.is_dir() {
        return Err(CatalogError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let mut catalogs = HashMap::new();

    let entries = fs::read_dir(dir).map_err(|e| CatalogError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CatalogError::io(dir, e))?;
        let path = entry.path();

        if path.extension().and_then(|ext| ext.to_str()) != Some("ts") {
            continue;
        }

        let catalog = load_catalog_from_file(&path)?;
        let locale = locale_for_file(&path, catalog.language())?;
        if catalogs.insert(locale.clone(), catalog).is_some() {
            return Err(CatalogError::DuplicateLocale {
                locale,
                dir: dir.to_path_buf(),
            });
        }
    }

    if catalogs.is_empty() {
        warn!(dir = %dir.display(), "no .ts files found in directory");
    }

    Ok(catalogs)
}
