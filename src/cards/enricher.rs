//! Card enrichment: turns raw tracker stories into decorated cards.
//!
//! Stickers are collected in three passes:
//! 1. story labels resolved through the catalog
//! 2. one `blocked` and one `scheduled` sticker from unresolved blockers
//! 3. `zero-points` when the story is estimated at zero
//!
//! and finally sorted by descending priority. Enrichment never fails: an
//! unreadable blocker date becomes a `?/?` sticker, an unknown owner becomes
//! a placeholder assignee, a label missing from the catalog is dropped.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::blockers::BlockerSchedule;
use super::elapsed::elapsed_working_days;
use super::model::{Card, Member, MemberIndex, Status, Story};
use crate::stickers::model::{contains_named, sort_by_priority};
use crate::stickers::{Sticker, StickerCatalog};

/// Catalog sticker attached to stories estimated at zero points.
pub const ZERO_POINTS: &str = "zero-points";

/// Build a card from a story as of `now`.
pub fn enrich(
    story: &Story,
    members: &MemberIndex,
    catalog: &StickerCatalog,
    now: DateTime<Utc>,
) -> Card {
    Card {
        id: story.id,
        title: story.title.clone(),
        url: story.url.clone(),
        status: Status::from_tracker_state(&story.state),
        elapsed_working_days: elapsed_working_days(&story.transitions, &story.state, now),
        assignees: resolve_assignees(&story.owner_ids, members),
        stickers: collect_stickers(story, catalog, now),
        story_type: story.story_type.clone(),
    }
}

/// Enrich every story, preserving order.
pub fn enrich_all(
    stories: &[Story],
    members: &MemberIndex,
    catalog: &StickerCatalog,
    now: DateTime<Utc>,
) -> Vec<Card> {
    stories
        .iter()
        .map(|story| enrich(story, members, catalog, now))
        .collect()
}

fn collect_stickers(story: &Story, catalog: &StickerCatalog, now: DateTime<Utc>) -> Vec<Sticker> {
    let mut stickers: Vec<Sticker> = Vec::new();

    for label in &story.labels {
        if let Some(sticker) = catalog.matches(label) {
            push_unique(&mut stickers, sticker);
        }
    }

    for blocker in story.blockers.iter().filter(|b| !b.resolved) {
        let schedule = BlockerSchedule::resolve(blocker, now);
        let Some(name) = schedule.sticker_name() else {
            continue;
        };
        if contains_named(&stickers, name) {
            continue;
        }
        if let Some(sticker) = schedule.to_sticker(&blocker.description, catalog) {
            stickers.push(sticker);
        }
    }

    if story.estimate == Some(0) {
        if let Some(sticker) = catalog.matches(ZERO_POINTS) {
            push_unique(&mut stickers, sticker);
        }
    }

    sort_by_priority(&mut stickers);
    stickers
}

fn push_unique(stickers: &mut Vec<Sticker>, sticker: Sticker) {
    if !contains_named(stickers, &sticker.name) {
        stickers.push(sticker);
    }
}

fn resolve_assignees(owner_ids: &[u64], members: &MemberIndex) -> Vec<Member> {
    owner_ids
        .iter()
        .map(|id| match members.get(id) {
            Some(member) => member.clone(),
            None => {
                debug!(member_id = id, "Assignee not found in member index");
                Member::placeholder(*id)
            }
        })
        .collect()
}
