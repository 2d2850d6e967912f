//! Expansion configuration.
//!
//! Deserialized from TOML via `serde`. Every field has a default so a partial
//! file (or an empty one) is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Failure to load or save an [`ExpansionConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Settings for abbreviation expansion in a keyboard session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Master switch. A disabled session never expands.
    pub enabled: bool,

    /// Check the typed buffer (true) or the host-supplied text before the
    /// cursor (false). Buffer tracking only expands freshly typed words.
    pub track_typed_buffer: bool,

    /// Space triggers a check.
    pub trigger_on_space: bool,

    /// Enter triggers a check.
    pub trigger_on_enter: bool,

    /// Location of the persistent abbreviation database, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            track_typed_buffer: true,
            trigger_on_space: true,
            trigger_on_enter: true,
            store_path: None,
        }
    }
}

impl ExpansionConfig {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Whether `separator` should trigger an expansion check.
    pub fn triggers_on(&self, separator: char) -> bool {
        self.enabled
            && match separator {
                ' ' => self.trigger_on_space,
                '\n' => self.trigger_on_enter,
                _ => false,
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_everything() {
        let cfg = ExpansionConfig::default();
        assert!(cfg.enabled && cfg.track_typed_buffer);
        assert!(cfg.triggers_on(' '));
        assert!(cfg.triggers_on('\n'));
        assert!(!cfg.triggers_on('.'));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = ExpansionConfig::from_toml_str("trigger_on_enter = false\n").unwrap();
        assert!(cfg.enabled);
        assert!(!cfg.triggers_on('\n'));
        assert!(cfg.store_path.is_none());
    }

    #[test]
    fn disabled_never_triggers() {
        let cfg = ExpansionConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(!cfg.triggers_on(' '));
    }

    #[test]
    fn toml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expansion.toml");
        let cfg = ExpansionConfig {
            track_typed_buffer: false,
            store_path: Some(PathBuf::from("/tmp/abbrev.redb")),
            ..Default::default()
        };
        cfg.save_toml(&path).unwrap();
        assert_eq!(ExpansionConfig::load_toml(&path).unwrap(), cfg);
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "enabled = \"yes\"").unwrap();
        assert!(matches!(
            ExpansionConfig::load_toml(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
