//! Sticker catalog: the configured, ordered set of recognised stickers.
//!
//! Each entry matches labels in one of two ways:
//! - a compiled regex, expanding capture groups into the sticker's text fields
//! - a literal name or one of its aliases
//!
//! Entries are tried in configured order and the first match wins, so two
//! overlapping patterns resolve to whichever appears first in the file.

use std::path::Path;

use regex::{Captures, Regex};
use tracing::debug;

use super::model::Sticker;
use crate::error::CatalogError;

/// How a catalog entry recognises a label.
#[derive(Debug, Clone)]
enum Matcher {
    /// Parametrised match; never falls back to name or aliases.
    Template(Regex),
    /// Exact match against the sticker name, then each alias.
    Names,
}

#[derive(Debug, Clone)]
struct Entry {
    template: Sticker,
    matcher: Matcher,
}

impl Entry {
    fn matches(&self, query: &str) -> Option<Sticker> {
        match &self.matcher {
            Matcher::Template(regex) => {
                let caps = regex.captures(query)?;
                Some(Sticker {
                    title: expand(&caps, &self.template.title),
                    image: expand(&caps, &self.template.image),
                    content: expand(&caps, &self.template.content),
                    class: expand(&caps, &self.template.class),
                    ..self.template.clone()
                })
            }
            Matcher::Names => {
                let hit = self.template.name == query
                    || self.template.aliases.iter().any(|alias| alias == query);
                hit.then(|| self.template.clone())
            }
        }
    }
}

fn expand(caps: &Captures<'_>, template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    caps.expand(template, &mut out);
    out
}

/// Ordered sticker catalog, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct StickerCatalog {
    entries: Vec<Entry>,
}

impl StickerCatalog {
    /// Build a catalog, compiling every sticker regex up front.
    pub fn new(stickers: Vec<Sticker>) -> Result<Self, CatalogError> {
        let entries = stickers
            .into_iter()
            .map(|template| {
                let matcher = match template.pattern() {
                    Some(pattern) => Matcher::Template(Regex::new(pattern).map_err(|source| {
                        CatalogError::InvalidRegex {
                            name: template.name.clone(),
                            source,
                        }
                    })?),
                    None => Matcher::Names,
                };
                Ok(Entry { template, matcher })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok(Self { entries })
    }

    /// Parse a YAML list of sticker templates.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let stickers: Vec<Sticker> = serde_yaml::from_str(yaml)?;
        Self::new(stickers)
    }

    /// Load the catalog from a YAML file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_yaml(&yaml)?;
        debug!(path = %path.display(), stickers = catalog.len(), "Loaded sticker catalog");
        Ok(catalog)
    }

    /// Resolve a label or identifier to a sticker. First matching entry wins.
    pub fn matches(&self, query: &str) -> Option<Sticker> {
        self.entries.iter().find_map(|entry| entry.matches(query))
    }

    /// Names of the literal (non-regex) stickers, in catalog order.
    pub fn literal_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.matcher, Matcher::Names))
            .map(|entry| entry.template.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
