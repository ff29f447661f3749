//! Card data model: raw tracker stories in, display-ready cards out.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stickers::Sticker;

/// Column a card belongs to on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Prioritised into the backlog but not started.
    Scheduled,
    Doing,
    Reviewing,
    Approving,
    Rejected,
    Done,
    /// Tracker state we do not recognise.
    Unknown,
}

impl Status {
    /// Map a raw tracker state onto a board column.
    pub fn from_tracker_state(state: &str) -> Self {
        match state {
            "unstarted" => Self::Scheduled,
            "started" => Self::Doing,
            "finished" => Self::Reviewing,
            "delivered" => Self::Approving,
            "rejected" => Self::Rejected,
            "accepted" => Self::Done,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::Doing => write!(f, "doing"),
            Self::Reviewing => write!(f, "reviewing"),
            Self::Approving => write!(f, "approving"),
            Self::Rejected => write!(f, "rejected"),
            Self::Done => write!(f, "done"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A team member as known to the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    /// Absent for placeholders standing in for members not yet fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Member {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    /// Stand-in for an owner id that has no matching member.
    pub fn placeholder(id: u64) -> Self {
        Self { id, name: None }
    }

    /// Display name, empty for placeholders.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Members keyed by id.
pub type MemberIndex = BTreeMap<u64, Member>;

/// Build a member index from a list of members.
pub fn index_members(members: impl IntoIterator<Item = Member>) -> MemberIndex {
    members.into_iter().map(|m| (m.id, m)).collect()
}

/// A free-text annotation saying a story cannot progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocker {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resolved: bool,
}

/// One entry of a story's state history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub state: String,
    pub occurred_at: DateTime<Utc>,
}

/// A work item as returned by the tracker, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: u64,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(alias = "current_state")]
    pub state: String,
    #[serde(default)]
    pub owner_ids: Vec<u64>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<Blocker>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
    #[serde(default)]
    pub estimate: Option<i64>,
    #[serde(default)]
    pub story_type: Option<String>,
}

/// The enriched, display-ready representation of one story.
///
/// Built once per refresh and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub status: Status,
    /// Working days spent in the current state.
    #[serde(rename = "in_play")]
    pub elapsed_working_days: u32,
    pub assignees: Vec<Member>,
    /// Sorted by descending priority, unique by name.
    pub stickers: Vec<Sticker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_type: Option<String>,
}

impl Card {
    /// Look up an attached sticker by exact name.
    pub fn sticker(&self, name: &str) -> Option<&Sticker> {
        self.stickers.iter().find(|s| s.name == name)
    }
}
