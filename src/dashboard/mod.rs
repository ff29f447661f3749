//! Dashboard serving shell.
//!
//! Data flows one way:
//! 1. `TrackerSource`: stories, members and rota from outside
//! 2. `Refresher`: enriches stories into cards on a timer
//! 3. `SnapshotStore`: holds the latest immutable snapshot
//! 4. `dashboard_routes`: filters cards per request and renders JSON

pub mod refresh;
pub mod response;
pub mod routes;
pub mod snapshot;
pub mod source;
pub mod support;

pub use refresh::{RefreshIntervals, Refresher, spawn_refresh_task};
pub use routes::{AppState, dashboard_routes};
pub use snapshot::{Snapshot, SnapshotStore};
pub use source::{FileSource, TrackerSource};
pub use support::{Support, SupportRota};
