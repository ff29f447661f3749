//! Snapshot store: the latest cards, members and support rota.
//!
//! Refreshes build a new [`Snapshot`] and swap it in whole; readers hold an
//! `Arc` to whichever snapshot was current when they asked and never see a
//! half-updated one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::support::SupportRota;
use crate::cards::{Card, MemberIndex};

/// Everything the dashboard renders, as of one refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub cards: Vec<Card>,
    pub members: MemberIndex,
    pub support: SupportRota,
    /// Unix timestamp of the last content change. Used as the HTTP ETag.
    /// Bumped past the previous value when changes share a second.
    pub etag: i64,
}

/// Holder of the current snapshot.
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    /// Create an empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            current: RwLock::new(Arc::new(Snapshot::default())),
        })
    }

    /// The current snapshot.
    pub async fn load(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Replace the cards. Returns whether anything changed.
    pub async fn publish_cards(&self, cards: Vec<Card>, now: DateTime<Utc>) -> bool {
        self.update(now, |s| s.cards = cards).await
    }

    /// Replace the member index. Returns whether anything changed.
    pub async fn publish_members(&self, members: MemberIndex, now: DateTime<Utc>) -> bool {
        self.update(now, |s| s.members = members).await
    }

    /// Replace the support rota. Returns whether anything changed.
    pub async fn publish_support(&self, support: SupportRota, now: DateTime<Utc>) -> bool {
        self.update(now, |s| s.support = support).await
    }

    async fn update<F>(&self, now: DateTime<Utc>, apply: F) -> bool
    where
        F: FnOnce(&mut Snapshot),
    {
        let mut current = self.current.write().await;
        let mut next = Snapshot::clone(&current);
        apply(&mut next);

        if next == **current {
            return false;
        }

        // Strictly increasing, even for two changes within one second.
        next.etag = now.timestamp().max(current.etag + 1);
        debug!(etag = next.etag, cards = next.cards.len(), "Published new snapshot");
        *current = Arc::new(next);
        true
    }
}
