//! Cards: enrichment of tracker stories and filtering of the result.
//!
//! Everything here is pure: the current time is passed in, nothing is
//! cached between calls, and cards are never mutated once built.

pub mod blockers;
pub mod elapsed;
pub mod enricher;
pub mod filter;
pub mod model;

pub use blockers::BlockerSchedule;
pub use enricher::{enrich, enrich_all};
pub use filter::{FilterTerm, StickerFilter, filter_by, filter_by_sticker_names};
pub use model::{Blocker, Card, Member, MemberIndex, Status, Story, Transition};
