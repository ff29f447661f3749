//! Dashboard response: the JSON document served to board clients.

use std::collections::BTreeMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use serde::Serialize;

use super::snapshot::Snapshot;
use super::support::Support;
use crate::cards::filter::text_terms;
use crate::cards::{Card, MemberIndex, StickerFilter, filter_by, filter_by_sticker_names};
use crate::config::BoardLimits;
use crate::stickers::StickerCatalog;

/// Card selection requested by a client.
///
/// Repeated `filter` parameters use the chained query language; otherwise
/// `include-sticker` / `exclude-sticker` select by exact sticker name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CardQuery {
    pub filters: Vec<String>,
    pub include_stickers: Vec<String>,
    pub exclude_stickers: Vec<String>,
}

impl CardQuery {
    /// Collect query-string pairs, ignoring unrelated keys.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "filter" => query.filters.push(value),
                "include-sticker" => query.include_stickers.push(value),
                "exclude-sticker" => query.exclude_stickers.push(value),
                _ => {}
            }
        }
        query
    }

    /// Entity tag for this query's view of a snapshot.
    ///
    /// Distinct queries over the same snapshot get distinct tags, so a
    /// client changing filters never revalidates against another view.
    pub fn etag(&self, snapshot_etag: i64) -> String {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        format!("\"{snapshot_etag}-{:016x}\"", hasher.finish())
    }

    /// Apply whichever mode the query selects.
    pub fn apply(&self, cards: &[Card]) -> Vec<Card> {
        if self.filters.is_empty() {
            filter_by_sticker_names(cards, &self.include_stickers, &self.exclude_stickers)
        } else {
            filter_by(cards, &self.filters)
        }
    }
}

/// A sticker filter link as rendered for the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterLink {
    #[serde(flatten)]
    pub filter: StickerFilter,
    pub href: String,
    pub applied: bool,
}

/// Everything a board client needs to draw the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub cards: Vec<Card>,
    pub config: BoardLimits,
    pub support: BTreeMap<String, Support>,
    pub team_members: MemberIndex,
    /// Members with no card among `cards`.
    pub free_team_members: MemberIndex,
    /// Reset link, then one include link per literal catalog sticker.
    pub filters: Vec<FilterLink>,
    /// One exclude link per literal catalog sticker.
    pub exclude_filters: Vec<FilterLink>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applied_filters: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text_filters: Vec<String>,
}

impl DashboardResponse {
    pub fn build(
        snapshot: &Snapshot,
        query: &CardQuery,
        catalog: &StickerCatalog,
        limits: BoardLimits,
        support_kinds: &[String],
    ) -> Self {
        let cards = query.apply(&snapshot.cards);
        let free_team_members = free_members(&snapshot.members, &cards);

        let support = support_kinds
            .iter()
            .map(|kind| (kind.clone(), snapshot.support.get(kind)))
            .collect();

        let filters = links(
            std::iter::once(StickerFilter::reset())
                .chain(catalog.literal_names().map(StickerFilter::include)),
            &query.include_stickers,
        );
        let exclude_filters = links(
            catalog.literal_names().map(StickerFilter::exclude),
            &query.exclude_stickers,
        );

        Self {
            cards,
            config: limits,
            support,
            team_members: snapshot.members.clone(),
            free_team_members,
            filters,
            exclude_filters,
            applied_filters: query.filters.clone(),
            text_filters: text_terms(&query.filters),
        }
    }
}

fn links(filters: impl Iterator<Item = StickerFilter>, applied: &[String]) -> Vec<FilterLink> {
    filters
        .map(|filter| FilterLink {
            href: filter.href(),
            applied: filter.is_applied(applied),
            filter,
        })
        .collect()
}

/// Members not assigned to any of `cards`.
pub fn free_members(members: &MemberIndex, cards: &[Card]) -> MemberIndex {
    let mut free = members.clone();
    for assignee in cards.iter().flat_map(|c| &c.assignees) {
        free.remove(&assignee.id);
    }
    free
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::model::index_members;
    use crate::cards::{Member, Status};
    use crate::dashboard::support::SupportRota;
    use crate::stickers::Sticker;

    fn card(id: u64, owners: &[u64], stickers: &[&str]) -> Card {
        Card {
            id,
            title: format!("Card {id}"),
            url: String::new(),
            status: Status::Doing,
            elapsed_working_days: 0,
            assignees: owners.iter().map(|id| Member::placeholder(*id)).collect(),
            stickers: stickers.iter().map(|s| Sticker::named(*s)).collect(),
            story_type: None,
        }
    }

    fn snapshot() -> Snapshot {
        let mut support = SupportRota::new();
        support.insert("in-hours", "Alice");
        Snapshot {
            cards: vec![card(1, &[1], &["tech"]), card(2, &[2], &["non-tech"])],
            members: index_members([
                Member::new(1, "Alice"),
                Member::new(2, "Bob"),
                Member::new(3, "Carol"),
            ]),
            support,
            etag: 1,
        }
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn catalog() -> StickerCatalog {
        StickerCatalog::new(vec![
            Sticker::named("tech"),
            Sticker::named("non-tech"),
            Sticker::named("team").with_regex("^team-(.+)$"),
        ])
        .unwrap()
    }

    #[test]
    fn query_collects_known_keys() {
        let query = CardQuery::from_pairs(pairs(&[
            ("filter", "person:alice"),
            ("filter", "sticker:tech"),
            ("include-sticker", "blocked"),
            ("exclude-sticker", "tech"),
            ("page", "2"),
        ]));
        assert_eq!(query.filters, vec!["person:alice", "sticker:tech"]);
        assert_eq!(query.include_stickers, vec!["blocked"]);
        assert_eq!(query.exclude_stickers, vec!["tech"]);
    }

    #[test]
    fn chained_filters_take_precedence_over_sticker_lists() {
        let query = CardQuery::from_pairs(pairs(&[
            ("filter", "sticker:non"),
            ("exclude-sticker", "non-tech"),
        ]));
        let cards = query.apply(&snapshot().cards);
        assert_eq!(cards.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn sticker_lists_used_without_chained_filters() {
        let query = CardQuery::from_pairs(pairs(&[("exclude-sticker", "non-tech")]));
        let cards = query.apply(&snapshot().cards);
        assert_eq!(cards.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn free_members_excludes_assigned() {
        let snapshot = snapshot();
        let free = free_members(&snapshot.members, &snapshot.cards);
        assert_eq!(free.keys().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn builds_full_response() {
        let query = CardQuery::from_pairs(pairs(&[
            ("filter", "sticker:tech"),
            ("filter", "title:card"),
        ]));
        let kinds = vec!["in-hours".to_string(), "escalations".to_string()];
        let response = DashboardResponse::build(
            &snapshot(),
            &query,
            &catalog(),
            BoardLimits::default(),
            &kinds,
        );

        assert_eq!(response.cards.len(), 1);
        assert_eq!(response.free_team_members.len(), 2);
        assert_eq!(response.team_members.len(), 3);
        assert_eq!(response.support["in-hours"].member, "Alice");
        assert_eq!(response.support["escalations"].member, "-");
        assert_eq!(response.text_filters, vec!["title:card"]);
        assert_eq!(response.applied_filters.len(), 2);

        let hrefs: Vec<_> = response.filters.iter().map(|f| f.href.as_str()).collect();
        assert_eq!(
            hrefs,
            vec!["?", "?include-sticker=tech", "?include-sticker=non-tech"]
        );
    }

    #[test]
    fn marks_applied_sticker_links() {
        let query = CardQuery::from_pairs(pairs(&[("include-sticker", "tech")]));
        let response =
            DashboardResponse::build(&snapshot(), &query, &catalog(), BoardLimits::default(), &[]);
        let applied: Vec<_> = response
            .filters
            .iter()
            .filter(|f| f.applied)
            .map(|f| f.filter.sticker_name.as_str())
            .collect();
        assert_eq!(applied, vec!["tech"]);
    }

    #[test]
    fn emits_exclude_links_per_literal_sticker() {
        let query = CardQuery::from_pairs(pairs(&[("exclude-sticker", "non-tech")]));
        let response =
            DashboardResponse::build(&snapshot(), &query, &catalog(), BoardLimits::default(), &[]);

        let links: Vec<_> = response
            .exclude_filters
            .iter()
            .map(|f| (f.href.as_str(), f.applied, f.filter.exclude))
            .collect();
        assert_eq!(
            links,
            vec![
                ("?exclude-sticker=tech", false, true),
                ("?exclude-sticker=non-tech", true, true),
            ]
        );
        assert!(response.filters.iter().all(|f| !f.applied));
    }

    #[test]
    fn etag_depends_on_query() {
        let plain = CardQuery::default();
        let filtered = CardQuery::from_pairs(pairs(&[("filter", "person:alice")]));
        let other = CardQuery::from_pairs(pairs(&[("filter", "person:bob")]));

        assert_eq!(plain.etag(7), plain.etag(7));
        assert_ne!(plain.etag(7), plain.etag(8));
        assert_ne!(plain.etag(7), filtered.etag(7));
        assert_ne!(filtered.etag(7), other.etag(7));
        assert!(plain.etag(7).starts_with("\"7-"));
    }

    #[test]
    fn serializes_to_json() {
        let response = DashboardResponse::build(
            &snapshot(),
            &CardQuery::default(),
            &catalog(),
            BoardLimits::default(),
            &[],
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["config"]["reviewal_limit"], 4);
        assert_eq!(json["cards"][0]["status"], "doing");
        assert_eq!(json["team_members"]["1"]["name"], "Alice");
        assert_eq!(json["filters"][1]["sticker_name"], "tech");
        assert!(json.get("applied_filters").is_none());
    }
}
