//! Plugin error taxonomy.
//!
//! Every failure mode is a distinct variant so callers can branch on the
//! kind without matching message strings. During bulk discovery, per-file
//! errors are logged and skipped; only [`PluginError::NoPlugins`] and
//! [`PluginError::Discovery`] abort a `resolve_all` call.

/// Result type for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;

/// Plugin loading and resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// No files matched the pattern, or no candidate survived validation
    /// and filtering.
    #[error("no plugins found")]
    NoPlugins,

    /// File could not be opened as a dynamically loadable module.
    #[error("not a plugin: {0}")]
    NotAPlugin(String),

    /// Manifest symbol missing, ABI version mismatched, or manifest
    /// otherwise unreadable.
    #[error("cannot get plugin version: {0}")]
    CannotGetVersion(String),

    /// Plugin declares support for specific applications, none of which
    /// match the running host.
    #[error("plugin not for this app: {0}")]
    NotForThisApplication(String),

    /// The plugin's own version string, or the constraint expression it
    /// declared for this host, fails to parse.
    #[error("plugin version is invalid: {0}")]
    BadPluginVersion(String),

    /// Host version does not satisfy the plugin's declared constraint.
    #[error("incompatible app version for plugin: {0}")]
    BadAppVersion(String),

    /// Declared initialization entry point not found in the module.
    #[error("cannot find init func for plugin: {0}")]
    BadInitFunc(String),

    /// Initialization entry point found but with an unexpected signature.
    #[error("wrong plugin init func declaration: {0}")]
    BadInitType(String),

    /// The host's own configured version string fails to parse.
    #[error("app version is invalid: {0}")]
    BadHostVersion(String),

    /// Directory enumeration or pattern compilation failed; fatal to the
    /// whole resolution call.
    #[error("plugin discovery failed: {0}")]
    Discovery(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_are_distinguishable() {
        let err = PluginError::NotAPlugin("x.so".into());
        assert!(matches!(err, PluginError::NotAPlugin(_)));
        assert!(!matches!(err, PluginError::NoPlugins));
    }

    #[test]
    fn messages_name_the_condition() {
        assert_eq!(PluginError::NoPlugins.to_string(), "no plugins found");
        assert_eq!(
            PluginError::BadAppVersion("greeter 1.0.0".into()).to_string(),
            "incompatible app version for plugin: greeter 1.0.0"
        );
    }
}
