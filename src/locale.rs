//! Locale-tag normalization and fallback chains.
//!
//! Catalog files in the wild name their locale inconsistently (`pt-BR` in
//! the `language` attribute, `pt_BR` in file names), so every tag is
//! canonicalized through `icu_locale` before it is used as a map key.

use icu_locale::Locale;

use crate::error::{CatalogError, CatalogResult};

/// Rewrites a POSIX-style tag into BCP-47 syntax so `icu_locale` can
/// parse it: underscores become hyphens, and a `.codeset` or `@modifier`
/// suffix (`tr_TR.UTF-8`, `de_DE@euro`) is dropped.
fn bcp47_syntax(tag: &str) -> String {
    let tag = tag
        .split_once(['.', '@'])
        .map_or(tag, |(prefix, _)| prefix);
    tag.replace('_', "-")
}

/// Canonicalizes a locale tag: `pt_br` and `PT-br` both become `pt-BR`.
pub fn normalize(tag: &str) -> CatalogResult<String> {
    let locale = Locale::try_from_str(&bcp47_syntax(tag))
        .map_err(|_| CatalogError::InvalidLocale(tag.to_string()))?;
    Ok(locale.to_string())
}

/// Returns the fallback chain for a tag, most specific first:
/// `pt-BR` -> [`pt-BR`, `pt`], `zh-Hant-TW` -> [`zh-Hant-TW`, `zh-Hant`,
/// `zh`]. An unparseable tag gets a single-element chain of itself so a
/// caller can still try an exact match.
pub fn fallback_chain(tag: &str) -> Vec<String> {
    let Ok(locale) = Locale::try_from_str(&bcp47_syntax(tag)) else {
        return vec![tag.to_string()];
    };

    let mut chain = vec![locale.to_string()];
    let language = locale.id.language.to_string();
    if let Some(script) = locale.id.script {
        let with_script = format!("{}-{}", language, script);
        if !chain.contains(&with_script) {
            chain.push(with_script);
        }
    }
    if !chain.contains(&language) {
        chain.push(language);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("pt-BR").unwrap(), "pt-BR");
        assert_eq!(normalize("pt_br").unwrap(), "pt-BR");
        assert_eq!(normalize("pt_BR").unwrap(), "pt-BR");
        assert_eq!(normalize("TR_tr").unwrap(), "tr-TR");
        assert_eq!(normalize("en").unwrap(), "en");
        assert!(normalize("not a locale").is_err());
    }

    #[test]
    fn test_normalize_posix_suffixes() {
        assert_eq!(normalize("tr_TR.UTF-8").unwrap(), "tr-TR");
        assert_eq!(normalize("de_DE@euro").unwrap(), "de-DE");
    }

    #[test]
    fn test_fallback_chain_underscore_tag() {
        assert_eq!(fallback_chain("pt_BR"), vec!["pt-BR", "pt"]);
    }

    #[test]
    fn test_fallback_chain() {
        assert_eq!(fallback_chain("pt-BR"), vec!["pt-BR", "pt"]);
        assert_eq!(fallback_chain("en"), vec!["en"]);
        assert_eq!(
            fallback_chain("zh-Hant-TW"),
            vec!["zh-Hant-TW", "zh-Hant", "zh"]
        );
    }

    #[test]
    fn test_fallback_chain_unparseable() {
        assert_eq!(fallback_chain("???"), vec!["???"]);
    }
}
