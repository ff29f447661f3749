//! Sticker template: a labelled visual annotation shown on a card.

use serde::{Deserialize, Serialize};

/// A sticker as configured in the catalog, or as attached to a card.
///
/// When `regex` is set, `title`, `image`, `content` and `class` act as
/// substitution templates (`$1`, `${name}`) expanded against the label that
/// matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sticker {
    /// Identity of the sticker. Unique within a card.
    pub name: String,
    /// Optional pattern enabling parametrised matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub content: String,
    /// Alternative label names resolving to this sticker.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// CSS class hint for the renderer.
    #[serde(default)]
    pub class: String,
    /// Higher priority stickers are shown first.
    #[serde(default)]
    pub priority: i32,
}

impl Sticker {
    /// Bare sticker carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Pattern to match against, ignoring an empty configured value.
    pub(crate) fn pattern(&self) -> Option<&str> {
        self.regex.as_deref().filter(|r| !r.is_empty())
    }
}

#[cfg(test)]
impl Sticker {
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = Some(regex.into());
        self
    }
}

/// Sort stickers so the highest priority comes first.
///
/// Equal priorities carry no ordering guarantee for callers.
pub fn sort_by_priority(stickers: &mut [Sticker]) {
    stickers.sort_by(|a, b| b.priority.cmp(&a.priority));
}

/// Whether a sticker with this name is already in the list.
pub fn contains_named(stickers: &[Sticker], name: &str) -> bool {
    stickers.iter().any(|s| s.name == name)
}
