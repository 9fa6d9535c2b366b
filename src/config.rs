//! Scheduler settings, read from `scheduler.json` in the platform config
//! directory. Every field is optional in the file.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "scheduler.json";

/// Permission level of the acting user, supplied by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    #[default]
    Member,
    Manager,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Viewer, Role::Member, Role::Manager];

    /// Whether tasks may be dragged, resized or linked.
    pub fn can_edit_schedule(self) -> bool {
        matches!(self, Role::Member | Role::Manager)
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Viewer => "Viewer",
            Role::Member => "Member",
            Role::Manager => "Manager",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Pixels per day at startup.
    pub day_width: f32,
    /// Gap enforced between a predecessor's end and a dependent's start.
    pub buffer_days: i64,
    /// Days added before the earliest and after the latest task date.
    pub padding_days: i64,
    pub row_height: f32,
    /// Grab width of resize handles and the link knob.
    pub handle_width: f32,
    pub role: Role,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            day_width: 18.0,
            buffer_days: 1,
            padding_days: 7,
            row_height: 32.0,
            handle_width: 7.0,
            role: Role::default(),
        }
    }
}

impl SchedulerConfig {
    /// `<config dir>/scheduler.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "hjertis", "gantt-scheduler")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults when there
    /// is no config dir or no file.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self> {
        if !(self.day_width.is_finite() && self.day_width > 0.0) {
            return Err(Error::Config(format!(
                "day_width must be positive, got {}",
                self.day_width
            )));
        }
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(Error::Config(format!(
                "row_height must be positive, got {}",
                self.row_height
            )));
        }
        if self.buffer_days < 0 || self.padding_days < 0 {
            return Err(Error::Config(
                "buffer_days and padding_days must not be negative".to_string(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SchedulerConfig::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, SchedulerConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "buffer_days": 2, "role": "viewer" }"#).unwrap();

        let config = SchedulerConfig::load_from(&path).unwrap();
        assert_eq!(config.buffer_days, 2);
        assert_eq!(config.role, Role::Viewer);
        assert_eq!(config.day_width, 18.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "day_width": 0 }"#).unwrap();
        assert!(matches!(SchedulerConfig::load_from(&path), Err(Error::Config(_))));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(SchedulerConfig::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_role_gate() {
        assert!(!Role::Viewer.can_edit_schedule());
        assert!(Role::Member.can_edit_schedule());
        assert!(Role::Manager.can_edit_schedule());
    }
}
