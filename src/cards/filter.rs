//! Card filtering.
//!
//! Two independent modes over the same card collection:
//! - a chained query language (`person:`, `title:`, `sticker:`, `not-sticker:`)
//!   where every term must pass and a term passes on any matching value
//! - a sticker allow/deny list matched on exact sticker names

use super::model::Card;

const PERSON: &str = "person:";
const TITLE: &str = "title:";
const STICKER: &str = "sticker:";
const NOT_STICKER: &str = "not-sticker:";

/// One directive of the chained query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTerm {
    /// Some assignee's name contains the text.
    Person(String),
    /// The title contains the text.
    Title(String),
    /// Some sticker name starts with the text.
    Sticker(String),
    /// No sticker name starts with the text.
    NotSticker(String),
    /// Unrecognised directive; keeps every card.
    Noop,
}

impl FilterTerm {
    /// Parse a raw term. Prefixes are case-insensitive and the remainder is
    /// lowercased; sticker names are later compared as stored.
    pub fn parse(raw: &str) -> Self {
        let term = raw.to_lowercase();

        if let Some(rest) = term.strip_prefix(PERSON) {
            Self::Person(rest.to_string())
        } else if let Some(rest) = term.strip_prefix(TITLE) {
            Self::Title(rest.to_string())
        } else if let Some(rest) = term.strip_prefix(STICKER) {
            Self::Sticker(rest.to_string())
        } else if let Some(rest) = term.strip_prefix(NOT_STICKER) {
            Self::NotSticker(rest.to_string())
        } else {
            Self::Noop
        }
    }

    /// Whether a card passes this term.
    pub fn keeps(&self, card: &Card) -> bool {
        match self {
            Self::Person(name) => card
                .assignees
                .iter()
                .any(|m| m.display_name().to_lowercase().contains(name.as_str())),
            Self::Title(title) => card.title.to_lowercase().contains(title.as_str()),
            Self::Sticker(prefix) => has_sticker_prefix(card, prefix),
            Self::NotSticker(prefix) => !has_sticker_prefix(card, prefix),
            Self::Noop => true,
        }
    }
}

fn has_sticker_prefix(card: &Card, prefix: &str) -> bool {
    card.stickers.iter().any(|s| s.name.starts_with(prefix))
}

/// Narrow `cards` by each term in turn. No terms keeps everything.
pub fn filter_by<S: AsRef<str>>(cards: &[Card], terms: &[S]) -> Vec<Card> {
    terms
        .iter()
        .map(|raw| FilterTerm::parse(raw.as_ref()))
        .fold(cards.to_vec(), |remaining, term| {
            remaining.into_iter().filter(|card| term.keeps(card)).collect()
        })
}

/// Allow/deny cards by exact sticker name.
///
/// A non-empty `include` wins outright and `exclude` is ignored. With both
/// empty every card is kept.
pub fn filter_by_sticker_names<S: AsRef<str>>(
    cards: &[Card],
    include: &[S],
    exclude: &[S],
) -> Vec<Card> {
    let has_any = |card: &Card, names: &[S]| {
        names.iter().any(|n| card.sticker(n.as_ref()).is_some())
    };

    cards
        .iter()
        .filter(|card| {
            if !include.is_empty() {
                has_any(card, include)
            } else if !exclude.is_empty() {
                !has_any(card, exclude)
            } else {
                true
            }
        })
        .cloned()
        .collect()
}

/// Terms that are free text rather than sticker directives.
pub fn text_terms<S: AsRef<str>>(terms: &[S]) -> Vec<String> {
    terms
        .iter()
        .filter_map(|t| {
            let t: &str = t.as_ref();
            let lower = t.to_lowercase();
            let is_sticker = lower.starts_with(STICKER) || lower.starts_with(NOT_STICKER);
            (!is_sticker).then(|| t.to_string())
        })
        .collect()
}

/// A link toggling the sticker allow/deny mode.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StickerFilter {
    pub sticker_name: String,
    pub exclude: bool,
}

impl StickerFilter {
    pub fn include(name: impl Into<String>) -> Self {
        Self {
            sticker_name: name.into(),
            exclude: false,
        }
    }

    pub fn exclude(name: impl Into<String>) -> Self {
        Self {
            sticker_name: name.into(),
            exclude: true,
        }
    }

    /// Link clearing every sticker filter.
    pub fn reset() -> Self {
        Self::include("")
    }

    /// Whether this filter's sticker is among the applied names.
    pub fn is_applied<S: AsRef<str>>(&self, applied: &[S]) -> bool {
        applied.iter().any(|s| s.as_ref() == self.sticker_name)
    }

    /// Query string selecting this filter.
    pub fn href(&self) -> String {
        if self.sticker_name.is_empty() {
            return "?".to_string();
        }
        let key = if self.exclude {
            "exclude-sticker"
        } else {
            "include-sticker"
        };
        format!("?{}={}", key, self.sticker_name)
    }
}
