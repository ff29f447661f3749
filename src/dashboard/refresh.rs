//! Background refresh: pulls from a [`TrackerSource`] and publishes snapshots.
//!
//! Members and the support rota change rarely and refresh on long timers;
//! stories refresh often. Stories need members to resolve assignees, so the
//! first story refresh is delayed by one period and members win ties.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval, interval_at};
use tracing::{debug, error, info};

use super::snapshot::SnapshotStore;
use super::source::TrackerSource;
use crate::cards::enrich_all;
use crate::cards::model::index_members;
use crate::error::SourceError;
use crate::stickers::StickerCatalog;

/// How often each part of the snapshot is refreshed.
#[derive(Debug, Clone, Copy)]
pub struct RefreshIntervals {
    pub stories: Duration,
    pub members: Duration,
    pub support: Duration,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            stories: Duration::from_secs(20),
            members: Duration::from_secs(3600),    // 1 hour
            support: Duration::from_secs(6 * 3600), // 6 hours
        }
    }
}

/// Pulls tracker data and publishes it into the snapshot store.
pub struct Refresher {
    source: Arc<dyn TrackerSource>,
    catalog: Arc<StickerCatalog>,
    store: Arc<SnapshotStore>,
}

impl Refresher {
    pub fn new(
        source: Arc<dyn TrackerSource>,
        catalog: Arc<StickerCatalog>,
        store: Arc<SnapshotStore>,
    ) -> Self {
        Self {
            source,
            catalog,
            store,
        }
    }

    /// Fetch members and publish them. An empty member list is an error.
    pub async fn refresh_members(&self) -> Result<bool, SourceError> {
        let members = self.source.fetch_members().await?;
        if members.is_empty() {
            return Err(SourceError::NoMembers);
        }
        Ok(self
            .store
            .publish_members(index_members(members), Utc::now())
            .await)
    }

    /// Fetch the support rota and publish it.
    pub async fn refresh_support(&self) -> Result<bool, SourceError> {
        let support = self.source.fetch_support().await?;
        if support.is_empty() {
            debug!("Support rota is empty");
        }
        Ok(self.store.publish_support(support, Utc::now()).await)
    }

    /// Fetch stories, enrich them against the current members and publish
    /// the cards. Nothing is published when the tracker returns no stories.
    pub async fn refresh_stories(&self) -> Result<bool, SourceError> {
        let members = self.store.load().await.members.clone();
        if members.is_empty() {
            return Err(SourceError::NoMembers);
        }

        let stories = self.source.fetch_stories().await?;
        if stories.is_empty() {
            debug!("No stories to enrich");
            return Ok(false);
        }

        let now = Utc::now();
        let cards = enrich_all(&stories, &members, &self.catalog, now);
        Ok(self.store.publish_cards(cards, now).await)
    }

    /// One full cycle: members, then support, then stories.
    ///
    /// Stops at the first failure. Returns whether any part changed.
    pub async fn refresh_once(&self) -> crate::error::Result<bool> {
        let members = self.refresh_members().await?;
        let support = self.refresh_support().await?;
        let stories = self.refresh_stories().await?;
        Ok(members || support || stories)
    }
}

/// Spawn the refresh loop.
///
/// Returns a `JoinHandle` and a shutdown flag. Set the flag to stop refreshing.
pub fn spawn_refresh_task(
    refresher: Arc<Refresher>,
    intervals: RefreshIntervals,
) -> (JoinHandle<()>, Arc<AtomicBool>) {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);

    let handle = tokio::spawn(async move {
        info!(
            stories_secs = intervals.stories.as_secs(),
            members_secs = intervals.members.as_secs(),
            support_secs = intervals.support.as_secs(),
            "Refresh loop started"
        );

        let mut members_tick = interval(intervals.members);
        let mut support_tick = interval(intervals.support);
        let mut stories_tick = interval_at(Instant::now() + intervals.stories, intervals.stories);

        loop {
            tokio::select! {
                biased;
                _ = members_tick.tick() => {
                    log_outcome("members", refresher.refresh_members().await);
                }
                _ = support_tick.tick() => {
                    log_outcome("support", refresher.refresh_support().await);
                }
                _ = stories_tick.tick() => {
                    log_outcome("stories", refresher.refresh_stories().await);
                }
            }

            if shutdown.load(Ordering::Relaxed) {
                info!("Refresh loop shutting down");
                return;
            }
        }
    });

    (handle, shutdown_flag)
}

fn log_outcome(kind: &str, outcome: Result<bool, SourceError>) {
    match outcome {
        Ok(changed) => debug!(kind, changed, "Refreshed"),
        Err(e) => error!(kind, "Refresh failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Member, Story};
    use crate::dashboard::support::SupportRota;
    use crate::stickers::Sticker;
    use async_trait::async_trait;

    struct StubSource {
        stories: Vec<Story>,
        members: Vec<Member>,
    }

    #[async_trait]
    impl TrackerSource for StubSource {
        async fn fetch_stories(&self) -> Result<Vec<Story>, SourceError> {
            Ok(self.stories.clone())
        }

        async fn fetch_members(&self) -> Result<Vec<Member>, SourceError> {
            Ok(self.members.clone())
        }

        async fn fetch_support(&self) -> Result<SupportRota, SourceError> {
            let mut rota = SupportRota::new();
            rota.insert("in-hours", "Tester");
            Ok(rota)
        }
    }

    fn story() -> Story {
        Story {
            id: 561,
            title: "Test story".into(),
            url: String::new(),
            state: "started".into(),
            owner_ids: vec![1234, 42],
            labels: vec!["test".into()],
            blockers: vec![],
            transitions: vec![],
            estimate: None,
            story_type: None,
        }
    }

    fn refresher(stories: Vec<Story>, members: Vec<Member>) -> (Refresher, Arc<SnapshotStore>) {
        let store = SnapshotStore::new();
        let catalog = StickerCatalog::new(vec![Sticker::named("test")]).unwrap();
        let source = Arc::new(StubSource { stories, members });
        (
            Refresher::new(source, Arc::new(catalog), Arc::clone(&store)),
            store,
        )
    }

    #[tokio::test]
    async fn stories_require_members() {
        let (refresher, _store) = refresher(vec![story()], vec![]);
        assert!(matches!(
            refresher.refresh_stories().await,
            Err(SourceError::NoMembers)
        ));
        assert!(matches!(
            refresher.refresh_members().await,
            Err(SourceError::NoMembers)
        ));
    }

    #[tokio::test]
    async fn refreshes_members_then_stories() {
        let (refresher, store) = refresher(vec![story()], vec![Member::new(1234, "Tester")]);

        assert!(refresher.refresh_members().await.unwrap());
        assert!(refresher.refresh_stories().await.unwrap());

        let snapshot = store.load().await;
        assert_eq!(snapshot.cards.len(), 1);
        let card = &snapshot.cards[0];
        assert_eq!(card.stickers[0].name, "test");
        assert_eq!(
            card.assignees,
            vec![Member::new(1234, "Tester"), Member::placeholder(42)]
        );
    }

    #[tokio::test]
    async fn empty_story_list_publishes_nothing() {
        let (refresher, store) = refresher(vec![], vec![Member::new(1234, "Tester")]);
        refresher.refresh_members().await.unwrap();

        assert!(!refresher.refresh_stories().await.unwrap());
        assert!(store.load().await.cards.is_empty());
    }

    #[tokio::test]
    async fn refresh_once_runs_every_part() {
        let (refresher, store) = refresher(vec![story()], vec![Member::new(1234, "Tester")]);
        assert!(refresher.refresh_once().await.unwrap());
        assert!(!refresher.refresh_once().await.unwrap());

        let snapshot = store.load().await;
        assert_eq!(snapshot.members.len(), 1);
        assert_eq!(snapshot.cards.len(), 1);
        assert_eq!(snapshot.support.get("in-hours").member, "Tester");
    }

    #[tokio::test]
    async fn refresh_once_stops_without_members() {
        let (refresher, store) = refresher(vec![story()], vec![]);
        assert!(matches!(
            refresher.refresh_once().await,
            Err(crate::error::Error::Source(SourceError::NoMembers))
        ));
        assert!(store.load().await.cards.is_empty());
    }

    #[tokio::test]
    async fn refreshes_support() {
        let (refresher, store) = refresher(vec![], vec![]);
        assert!(refresher.refresh_support().await.unwrap());
        assert!(!refresher.refresh_support().await.unwrap());
        assert_eq!(store.load().await.support.get("in-hours").member, "Tester");
    }

    #[tokio::test]
    async fn refresh_task_stops_on_shutdown() {
        let (refresher, store) = refresher(vec![story()], vec![Member::new(1234, "Tester")]);
        let intervals = RefreshIntervals {
            stories: Duration::from_millis(10),
            members: Duration::from_millis(10),
            support: Duration::from_millis(10),
        };

        let (handle, shutdown) = spawn_refresh_task(Arc::new(refresher), intervals);
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.store(true, Ordering::Relaxed);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        let snapshot = store.load().await;
        assert_eq!(snapshot.members.len(), 1);
        assert_eq!(snapshot.cards.len(), 1);
    }
}
