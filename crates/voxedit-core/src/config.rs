//! Edit session configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::side_effect::SideEffectSet;

/// How placements are reordered before reaching the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderMode {
    /// Write in the order the edit produced.
    None,
    /// Buffer placements and sort them into dependency stages.
    #[default]
    MultiStage,
    /// Write immediately, then fix lighting and neighbors in one pass at commit.
    Fast,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for one edit session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Stop accepting writes after this many attempts. `None` is unlimited.
    pub max_changed_blocks: Option<usize>,
    /// Time allowed per tick when an edit is driven incrementally.
    pub tick_budget_ms: u64,
    pub side_effects: SideEffectSet,
    pub reorder: ReorderMode,
    /// Group writes by chunk and flush them in storage order at commit.
    pub chunk_batching: bool,
    /// Capacity of each placement staging buffer.
    pub buffer_capacity: usize,
    /// Break blocks as a player would instead of replacing them with air.
    pub tool_use: bool,
    /// Drop block metadata on write.
    pub strip_nbt: bool,
    /// Record rejected writes for diagnostics.
    pub trace_failures: bool,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            max_changed_blocks: None,
            tick_budget_ms: 50,
            side_effects: SideEffectSet::defaults(),
            reorder: ReorderMode::default(),
            chunk_batching: true,
            buffer_capacity: 4096,
            tool_use: false,
            strip_nbt: false,
            trace_failures: false,
        }
    }
}

impl EditConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), ?config, "loaded edit config");
        Ok(config)
    }

    #[must_use]
    pub const fn tick_budget(&self) -> Duration {
        Duration::from_millis(self.tick_budget_ms)
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.max_changed_blocks = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::side_effect::{SideEffect, SideEffectState};

    #[test]
    fn test_defaults_from_empty_object() {
        let config = EditConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EditConfig::default());
        assert_eq!(config.tick_budget(), Duration::from_millis(50));
        assert_eq!(config.reorder, ReorderMode::MultiStage);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"max_changed_blocks": 3, "reorder": "fast", "side_effects": {{"lighting": "delayed"}}}}"#
        )
        .unwrap();

        let config = EditConfig::load(file.path()).unwrap();
        assert_eq!(config.max_changed_blocks, Some(3));
        assert_eq!(config.reorder, ReorderMode::Fast);
        assert_eq!(
            config.side_effects.state(SideEffect::Lighting),
            SideEffectState::Delayed
        );
        assert!(config.chunk_batching);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            EditConfig::from_json_str("{\"tick_budget_ms\": \"soon\"}"),
            Err(ConfigError::Json(_))
        ));
    }
}
