//! Engine configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use crate::consts::{
    CONFIRMATION_MS, CONNECT_TIMEOUT_SECS, CURSOR_TARGET_SIZE, DEBOUNCE_MS, DOWNLOAD_TIMEOUT_SECS,
    LARGE_SUBTREE_LIMIT, MAX_FRAME_DEPTH,
};
use crate::error::ConfigError;
use crate::input::ModifierKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub modifier: ModifierKey,
    pub debounce_ms: u64,
    pub confirmation_ms: u64,
    pub max_frame_depth: usize,
    pub large_subtree_limit: usize,
    pub cursor_size: f64,
    pub timeouts: DownloadTimeouts,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            modifier: ModifierKey::default(),
            debounce_ms: DEBOUNCE_MS,
            confirmation_ms: CONFIRMATION_MS,
            max_frame_depth: MAX_FRAME_DEPTH,
            large_subtree_limit: LARGE_SUBTREE_LIMIT,
            cursor_size: CURSOR_TARGET_SIZE,
            timeouts: DownloadTimeouts { request_secs: DOWNLOAD_TIMEOUT_SECS, connect_secs: CONNECT_TIMEOUT_SECS },
        }
    }
}

impl EngineConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `POINTSHOOT_MODIFIER`: `alt` (default), `shift`, `ctrl`, or `meta`
    /// - `POINTSHOOT_DEBOUNCE_MS`: default 8
    /// - `POINTSHOOT_CONFIRMATION_MS`: default 2000
    /// - `POINTSHOOT_MAX_FRAME_DEPTH`: default 10
    /// - `POINTSHOOT_LARGE_SUBTREE_LIMIT`: default 150
    /// - `POINTSHOOT_CURSOR_SIZE`: default 20
    /// - `POINTSHOOT_DOWNLOAD_TIMEOUT_SECS`: default 30
    /// - `POINTSHOOT_CONNECT_TIMEOUT_SECS`: default 10
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Same as [`EngineConfig::from_env`] against an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let modifier = match lookup("POINTSHOOT_MODIFIER") {
            Some(raw) => raw
                .parse::<ModifierKey>()
                .map_err(|message| ConfigError::Parse { var: "POINTSHOOT_MODIFIER".into(), message })?,
            None => defaults.modifier,
        };
        let parse = |key: &str, default| env_parse(&lookup, key, default);
        Ok(Self {
            modifier,
            debounce_ms: parse("POINTSHOOT_DEBOUNCE_MS", defaults.debounce_ms),
            confirmation_ms: parse("POINTSHOOT_CONFIRMATION_MS", defaults.confirmation_ms),
            max_frame_depth: env_parse(&lookup, "POINTSHOOT_MAX_FRAME_DEPTH", defaults.max_frame_depth),
            large_subtree_limit: env_parse(&lookup, "POINTSHOOT_LARGE_SUBTREE_LIMIT", defaults.large_subtree_limit),
            cursor_size: env_parse(&lookup, "POINTSHOOT_CURSOR_SIZE", defaults.cursor_size),
            timeouts: DownloadTimeouts {
                request_secs: parse("POINTSHOOT_DOWNLOAD_TIMEOUT_SECS", defaults.timeouts.request_secs),
                connect_secs: parse("POINTSHOOT_CONNECT_TIMEOUT_SECS", defaults.timeouts.connect_secs),
            },
        })
    }

    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub fn confirmation(&self) -> Duration {
        Duration::from_millis(self.confirmation_ms)
    }
}

/// Parse `key` or fall back to `default` when absent or unparseable.
fn env_parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key).map(|raw| raw.trim().parse::<T>()) {
        Some(Ok(value)) => value,
        _ => default,
    }
}
