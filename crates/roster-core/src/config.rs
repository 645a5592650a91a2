//! # Configuration
//!
//! Process-wide settings for the Roster model.
//!
//! Values are resolved in order:
//! 1. Built-in defaults
//! 2. An optional TOML file
//! 3. The `ROSTER_MAX_STUDENTS_PER_COURSE` environment variable
//!
//! The setting is `MAX_STUDENTS_PER_COURSE`. In TOML it may be written in
//! either case; in the environment it carries the `ROSTER_` prefix shared by
//! every Roster variable.
//!
//! ```toml
//! max_students_per_course = 30
//! ```

use crate::RosterError;
use crate::capacity::Capacity;
use crate::primitives::DEFAULT_MAX_STUDENTS_PER_COURSE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding the course capacity.
pub const MAX_STUDENTS_ENV: &str = "ROSTER_MAX_STUDENTS_PER_COURSE";

/// Roster settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RosterConfig {
    /// Course capacity used by the `is_full` rule.
    #[serde(alias = "MAX_STUDENTS_PER_COURSE")]
    pub max_students_per_course: usize,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            max_students_per_course: DEFAULT_MAX_STUDENTS_PER_COURSE,
        }
    }
}

impl RosterConfig {
    /// Parse settings from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, RosterError> {
        toml::from_str(text).map_err(|e| RosterError::ConfigError(e.to_string()))
    }

    /// Read settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RosterError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            RosterError::ConfigError(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Resolve settings from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, RosterError> {
        Self::load_with(path, std::env::var(MAX_STUDENTS_ENV).ok().as_deref())
    }

    /// Resolve settings from an optional file, then apply `env_value` as
    /// the value of `ROSTER_MAX_STUDENTS_PER_COURSE`.
    pub fn load_with(path: Option<&Path>, env_value: Option<&str>) -> Result<Self, RosterError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_override(env_value)
    }

    /// Apply a raw capacity override, as read from the environment.
    ///
    /// `None` and blank strings leave the value unchanged.
    pub fn with_override(mut self, raw: Option<&str>) -> Result<Self, RosterError> {
        if let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) {
            self.max_students_per_course = raw.parse().map_err(|_| {
                RosterError::ConfigError(format!(
                    "{} must be a non-negative integer, got '{}'",
                    MAX_STUDENTS_ENV, raw
                ))
            })?;
        }
        Ok(self)
    }

    #[must_use]
    pub fn capacity(&self) -> Capacity {
        Capacity::new(self.max_students_per_course)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity() {
        let config = RosterConfig::default();
        assert_eq!(
            config.capacity().max_students(),
            DEFAULT_MAX_STUDENTS_PER_COURSE
        );
    }

    #[test]
    fn toml_overrides_default() {
        let config = RosterConfig::from_toml_str("max_students_per_course = 3").expect("parse");
        assert_eq!(config.max_students_per_course, 3);
    }

    #[test]
    fn toml_accepts_upper_case_key() {
        let config = RosterConfig::from_toml_str("MAX_STUDENTS_PER_COURSE = 7").expect("parse");
        assert_eq!(config.max_students_per_course, 7);
    }

    #[test]
    fn empty_toml_keeps_defaults() {
        let config = RosterConfig::from_toml_str("").expect("parse");
        assert_eq!(config, RosterConfig::default());
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(matches!(
            RosterConfig::from_toml_str("max_students = 3"),
            Err(RosterError::ConfigError(_))
        ));
    }

    #[test]
    fn env_override_wins() {
        let config = RosterConfig::default()
            .with_override(Some(" 12 "))
            .expect("override");
        assert_eq!(config.max_students_per_course, 12);
    }

    #[test]
    fn blank_override_ignored() {
        let config = RosterConfig::default()
            .with_override(Some(""))
            .expect("override");
        assert_eq!(config, RosterConfig::default());
    }

    #[test]
    fn invalid_override_rejected() {
        assert!(RosterConfig::default().with_override(Some("-1")).is_err());
        assert!(RosterConfig::default().with_override(Some("many")).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("roster.toml");
        std::fs::write(&path, "max_students_per_course = 5\n").expect("write");

        let config = RosterConfig::from_file(&path).expect("load");
        assert_eq!(config.capacity().max_students(), 5);
    }

    #[test]
    fn env_value_overrides_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("roster.toml");
        std::fs::write(&path, "max_students_per_course = 5\n").expect("write");

        let from_file = RosterConfig::load_with(Some(&path), None).expect("load");
        assert_eq!(from_file.capacity().max_students(), 5);

        let overridden = RosterConfig::load_with(Some(&path), Some("8")).expect("load");
        assert_eq!(overridden.capacity().max_students(), 8);
    }

    #[test]
    fn env_value_without_file_overrides_default() {
        let config = RosterConfig::load_with(None, Some("2")).expect("load");
        assert_eq!(config.max_students_per_course, 2);
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(matches!(
            RosterConfig::from_file(&dir.path().join("absent.toml")),
            Err(RosterError::ConfigError(_))
        ));
    }
}
