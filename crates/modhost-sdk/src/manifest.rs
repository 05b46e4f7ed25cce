//! Plugin manifest returned from the well-known descriptor symbol.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Default entry-point symbol name when a plugin does not declare one.
pub const DEFAULT_ENTRY_POINT: &str = "modhost_plugin_init";

/// Metadata a plugin exposes about itself.
///
/// Returned by value from the [`MANIFEST_SYMBOL`](crate::MANIFEST_SYMBOL)
/// function. The host parses `version` as a semantic version and checks
/// `apps` against its own identity before activating the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugin name; duplicate names are resolved to the highest version.
    pub name: String,

    /// Plugin version (semver string).
    pub version: String,

    /// Supported host applications: app name -> version constraint
    /// expression (e.g. `">=1.0.0, <2.0.0"`).
    pub apps: BTreeMap<String, String>,

    /// Symbol name of the plugin's initialization entry point.
    pub entry_point: String,
}

impl PluginManifest {
    /// Create a manifest with the default entry-point symbol and no
    /// declared host applications.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            apps: BTreeMap::new(),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        }
    }

    /// Declare support for a host application under a version constraint.
    pub fn with_app(mut self, app: impl Into<String>, constraint: impl Into<String>) -> Self {
        self.apps.insert(app.into(), constraint.into());
        self
    }

    /// Override the entry-point symbol name.
    pub fn with_entry_point(mut self, symbol: impl Into<String>) -> Self {
        self.entry_point = symbol.into();
        self
    }

    /// Parse the declared version string.
    pub fn parsed_version(&self) -> Result<semver::Version, semver::Error> {
        semver::Version::parse(self.version.trim())
    }
}

impl Display for PluginManifest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_defaults() {
        let manifest = PluginManifest::new("greeter", "1.2.0");
        assert_eq!(manifest.name, "greeter");
        assert_eq!(manifest.version, "1.2.0");
        assert_eq!(manifest.entry_point, DEFAULT_ENTRY_POINT);
        assert!(manifest.apps.is_empty());
    }

    #[test]
    fn builder_collects_apps() {
        let manifest = PluginManifest::new("greeter", "1.2.0")
            .with_app("myhost", ">=1.0.0")
            .with_app("other", "*")
            .with_entry_point("greeter_init");

        assert_eq!(manifest.apps.len(), 2);
        assert_eq!(manifest.apps["myhost"], ">=1.0.0");
        assert_eq!(manifest.entry_point, "greeter_init");
    }

    #[test]
    fn parsed_version_roundtrip() {
        let manifest = PluginManifest::new("greeter", "1.2.0-beta.3");
        let version = manifest.parsed_version().unwrap();
        assert_eq!(version.to_string(), "1.2.0-beta.3");
    }
}
