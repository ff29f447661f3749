//! `TrackerSource` trait: where stories, members and the support rota come from.
//!
//! Remote tracker and on-call clients plug in behind this trait. The bundled
//! [`FileSource`] reads a JSON export from disk, re-reading it on every fetch
//! so an external job can keep the file current.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use super::support::SupportRota;
use crate::cards::{Member, Story};
use crate::error::SourceError;

/// Supplier of raw tracker data.
#[async_trait]
pub trait TrackerSource: Send + Sync {
    /// Stories currently on the board.
    async fn fetch_stories(&self) -> Result<Vec<Story>, SourceError>;

    /// Project members.
    async fn fetch_members(&self) -> Result<Vec<Member>, SourceError>;

    /// Current on-call rota.
    async fn fetch_support(&self) -> Result<SupportRota, SourceError>;
}

/// Layout of the JSON export read by [`FileSource`].
#[derive(Debug, Default, Deserialize)]
struct Export {
    #[serde(default)]
    stories: Vec<Story>,
    #[serde(default)]
    members: Vec<Member>,
    #[serde(default)]
    support: SupportRota,
}

/// Tracker source backed by a JSON export file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Export, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Read {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl TrackerSource for FileSource {
    async fn fetch_stories(&self) -> Result<Vec<Story>, SourceError> {
        Ok(self.read().await?.stories)
    }

    async fn fetch_members(&self) -> Result<Vec<Member>, SourceError> {
        Ok(self.read().await?.members)
    }

    async fn fetch_support(&self) -> Result<SupportRota, SourceError> {
        Ok(self.read().await?.support)
    }
}
