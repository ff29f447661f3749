//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::dashboard::refresh::RefreshIntervals;
use crate::error::ConfigError;

/// Work-in-progress limits shown on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardLimits {
    pub reviewal_limit: u32,
    pub approval_limit: u32,
}

impl Default for BoardLimits {
    fn default() -> Self {
        Self {
            reviewal_limit: 4,
            approval_limit: 5,
        }
    }
}

/// Dashboard configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Port the HTTP server listens on.
    pub port: u16,
    /// YAML sticker catalog.
    pub stickers_path: PathBuf,
    /// JSON tracker export read by the file source.
    pub export_path: PathBuf,
    pub refresh: RefreshIntervals,
    pub limits: BoardLimits,
    /// Rota kinds shown in the support panel, in display order.
    pub support_kinds: Vec<String>,
    /// Log at debug level.
    pub verbose: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            stickers_path: PathBuf::from("stickers.yml"),
            export_path: PathBuf::from("tracker.json"),
            refresh: RefreshIntervals::default(),
            limits: BoardLimits::default(),
            support_kinds: vec![
                "in-hours".to_string(),
                "out-of-hours".to_string(),
                "escalations".to_string(),
            ],
            verbose: false,
        }
    }
}

impl DashboardConfig {
    /// Build config from `CARDWALL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_or(&lookup, "CARDWALL_PORT", defaults.port)?;
        let stickers_path = lookup("CARDWALL_STICKERS")
            .map(PathBuf::from)
            .unwrap_or(defaults.stickers_path);
        let export_path = lookup("CARDWALL_EXPORT")
            .map(PathBuf::from)
            .unwrap_or(defaults.export_path);

        let stories_secs = parse_or(
            &lookup,
            "CARDWALL_REFRESH_SECS",
            defaults.refresh.stories.as_secs(),
        )?;
        if stories_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "CARDWALL_REFRESH_SECS".into(),
                message: "must be at least 1".into(),
            });
        }

        let limits = BoardLimits {
            reviewal_limit: parse_or(
                &lookup,
                "CARDWALL_REVIEWAL_LIMIT",
                defaults.limits.reviewal_limit,
            )?,
            approval_limit: parse_or(
                &lookup,
                "CARDWALL_APPROVAL_LIMIT",
                defaults.limits.approval_limit,
            )?,
        };

        let support_kinds = match lookup("CARDWALL_SUPPORT_KINDS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.support_kinds,
        };

        let verbose = lookup("CARDWALL_VERBOSE")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            port,
            stickers_path,
            export_path,
            refresh: RefreshIntervals {
                stories: Duration::from_secs(stories_secs),
                ..defaults.refresh
            },
            limits,
            support_kinds,
            verbose,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.stickers_path, PathBuf::from("stickers.yml"));
        assert_eq!(config.refresh.stories, Duration::from_secs(20));
        assert_eq!(config.limits, BoardLimits::default());
        assert_eq!(config.support_kinds.len(), 3);
        assert!(!config.verbose);
    }

    #[test]
    fn reads_overrides() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("CARDWALL_PORT", "9090"),
            ("CARDWALL_STICKERS", "/etc/cardwall/stickers.yml"),
            ("CARDWALL_EXPORT", "/var/lib/cardwall/tracker.json"),
            ("CARDWALL_REFRESH_SECS", "5"),
            ("CARDWALL_REVIEWAL_LIMIT", "2"),
            ("CARDWALL_SUPPORT_KINDS", "in-hours, ,escalations"),
            ("CARDWALL_VERBOSE", "TRUE"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.export_path, PathBuf::from("/var/lib/cardwall/tracker.json"));
        assert_eq!(config.refresh.stories, Duration::from_secs(5));
        assert_eq!(config.refresh.members, Duration::from_secs(3600));
        assert_eq!(config.limits.reviewal_limit, 2);
        assert_eq!(config.limits.approval_limit, 5);
        assert_eq!(config.support_kinds, vec!["in-hours", "escalations"]);
        assert!(config.verbose);
    }

    #[test]
    fn rejects_unparseable_values() {
        let err = DashboardConfig::from_lookup(lookup(&[("CARDWALL_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "CARDWALL_PORT"));
    }

    #[test]
    fn rejects_zero_refresh() {
        assert!(DashboardConfig::from_lookup(lookup(&[("CARDWALL_REFRESH_SECS", "0")])).is_err());
    }
}
