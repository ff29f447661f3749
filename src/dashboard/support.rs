//! Support rota: who is on call for each kind of support.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Shown when nobody is known to be on a rota.
const NOBODY: &str = "-";

/// One rota entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Support {
    #[serde(rename = "type")]
    pub kind: String,
    pub member: String,
}

/// Rota entries keyed by kind (e.g. `in-hours`, `out-of-hours`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupportRota(BTreeMap<String, Support>);

impl SupportRota {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: impl Into<String>, member: impl Into<String>) {
        let kind = kind.into();
        self.0.insert(
            kind.clone(),
            Support {
                kind,
                member: member.into(),
            },
        );
    }

    /// Entry for `kind`, or a `-` placeholder when nobody is on it.
    pub fn get(&self, kind: &str) -> Support {
        self.0.get(kind).cloned().unwrap_or_else(|| Support {
            kind: kind.to_string(),
            member: NOBODY.to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
