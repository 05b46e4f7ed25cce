//! Host configuration surface for the resolution pipeline.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::version::ReleaseStage;

/// Default directory scanned for plugin modules.
pub const DEFAULT_PLUGINS_DIR: &str = "./plugins";

/// Default filename pattern for plugin modules (single-level glob).
pub const DEFAULT_PATTERN: &str = "*.so";

/// Construction-time inputs to [`PluginResolver`](crate::PluginResolver).
///
/// An empty `app_name` together with an empty `app_version` disables
/// host-identity checking entirely: plugins that declare no supported
/// applications are then accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Host application name; empty to disable identity checking.
    pub app_name: String,

    /// Host application version (semver string); empty for none.
    pub app_version: String,

    /// Directory scanned for plugin modules, non-recursively.
    pub plugins_dir: PathBuf,

    /// Filename glob matched against directory entries.
    pub pattern: String,

    /// Release stages a plugin version may belong to. Defaults to stable
    /// only; an explicitly empty list disables stage filtering.
    pub stages: Vec<ReleaseStage>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            app_version: String::new(),
            plugins_dir: PathBuf::from(DEFAULT_PLUGINS_DIR),
            pattern: DEFAULT_PATTERN.to_string(),
            stages: vec![ReleaseStage::Stable],
        }
    }
}

impl HostConfig {
    /// Configuration for a named host application.
    pub fn new(app_name: impl Into<String>, app_version: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            app_version: app_version.into(),
            ..Self::default()
        }
    }

    /// Set the plugins directory.
    pub fn with_plugins_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.plugins_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the filename pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Set the allowed release stages. Pass an empty list to disable
    /// stage filtering.
    pub fn with_stages(mut self, stages: Vec<ReleaseStage>) -> Self {
        self.stages = stages;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable_only_in_plugins_dir() {
        let config = HostConfig::default();
        assert!(config.app_name.is_empty());
        assert!(config.app_version.is_empty());
        assert_eq!(config.plugins_dir, PathBuf::from(DEFAULT_PLUGINS_DIR));
        assert_eq!(config.pattern, DEFAULT_PATTERN);
        assert_eq!(config.stages, vec![ReleaseStage::Stable]);
    }

    #[test]
    fn builder_overrides() {
        let config = HostConfig::new("myhost", "1.5.0")
            .with_plugins_dir("/opt/myhost/plugins")
            .with_pattern("libplugin_*.so")
            .with_stages(vec![ReleaseStage::Beta, ReleaseStage::Stable]);

        assert_eq!(config.app_name, "myhost");
        assert_eq!(config.pattern, "libplugin_*.so");
        assert_eq!(config.stages.len(), 2);
    }

    #[test]
    fn deserializes_with_defaults_filled() {
        let config: HostConfig = serde_json::from_str(
            r#"{"app_name": "myhost", "stages": ["beta", "stable"]}"#,
        )
        .unwrap();
        assert_eq!(config.app_name, "myhost");
        assert_eq!(config.pattern, DEFAULT_PATTERN);
        assert_eq!(
            config.stages,
            vec![ReleaseStage::Beta, ReleaseStage::Stable]
        );
    }
}
