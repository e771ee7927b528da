use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading or writing translation catalogs.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("malformed TS document: {0}")]
    Malformed(String),

    #[error("invalid locale tag '{0}'")]
    InvalidLocale(String),

    #[error("cannot determine locale for '{0}': no language attribute or file-name suffix")]
    UnknownLocale(PathBuf),

    #[error("duplicate catalog for locale '{locale}' in {}", dir.display())]
    DuplicateLocale { locale: String, dir: PathBuf },
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
