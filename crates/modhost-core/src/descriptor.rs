//! Candidate descriptor: a validated plugin plus its resident module.

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use modhost_sdk::PluginManifest;
use semver::Version;

use crate::error::{PluginError, Result};
use crate::module::LoadedModule;

/// A successfully loaded and validated plugin candidate.
///
/// Created once per loadable file during the loader phase and never
/// mutated afterwards. Owns the module handle needed for deferred symbol
/// lookup; the handle (and the module behind it) lives until process
/// exit.
pub struct CandidateDescriptor {
    name: String,
    version_string: String,
    version: Version,
    apps: BTreeMap<String, String>,
    entry_point: String,
    path: PathBuf,
    module: Arc<dyn LoadedModule>,
}

impl CandidateDescriptor {
    pub(crate) fn new(
        manifest: PluginManifest,
        version: Version,
        module: Arc<dyn LoadedModule>,
    ) -> Result<Self> {
        if manifest.name.trim().is_empty() {
            return Err(PluginError::CannotGetVersion(format!(
                "{}: empty plugin name",
                module.path().display()
            )));
        }

        Ok(Self {
            name: manifest.name,
            version_string: manifest.version,
            version,
            apps: manifest.apps,
            entry_point: manifest.entry_point,
            path: module.path().to_path_buf(),
            module,
        })
    }

    /// Plugin name; unique within a resolved set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw version string as declared by the plugin.
    pub fn version_string(&self) -> &str {
        &self.version_string
    }

    /// Parsed plugin version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Declared host applications and their constraint expressions.
    pub fn apps(&self) -> &BTreeMap<String, String> {
        &self.apps
    }

    /// Symbol name of the initialization entry point.
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// File the plugin was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Handle to the resident module, for deferred symbol lookup.
    pub fn module(&self) -> &Arc<dyn LoadedModule> {
        &self.module
    }
}

impl Display for CandidateDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{} ({})", self.name, self.version, self.path.display())
    }
}

impl Debug for CandidateDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateDescriptor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("apps", &self.apps)
            .field("entry_point", &self.entry_point)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modhost_sdk::ExportedSymbol;

    struct StubModule {
        path: PathBuf,
    }

    impl LoadedModule for StubModule {
        fn manifest(&self) -> Result<PluginManifest> {
            unreachable!("not used in descriptor tests")
        }

        fn entry_point(&self, name: &str) -> Result<ExportedSymbol> {
            Err(PluginError::BadInitFunc(name.to_string()))
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    fn stub_module() -> Arc<dyn LoadedModule> {
        Arc::new(StubModule {
            path: PathBuf::from("/plugins/greeter.so"),
        })
    }

    #[test]
    fn descriptor_carries_manifest_fields() {
        let manifest = PluginManifest::new("greeter", "1.2.0")
            .with_app("myhost", ">=1.0.0")
            .with_entry_point("greeter_init");
        let version = manifest.parsed_version().unwrap();

        let descriptor = CandidateDescriptor::new(manifest, version, stub_module()).unwrap();
        assert_eq!(descriptor.name(), "greeter");
        assert_eq!(descriptor.version_string(), "1.2.0");
        assert_eq!(descriptor.entry_point(), "greeter_init");
        assert_eq!(descriptor.apps()["myhost"], ">=1.0.0");
        assert_eq!(descriptor.path(), Path::new("/plugins/greeter.so"));
        assert_eq!(
            descriptor.to_string(),
            "greeter v1.2.0 (/plugins/greeter.so)"
        );
    }

    #[test]
    fn empty_name_is_rejected() {
        let manifest = PluginManifest::new("  ", "1.0.0");
        let version = manifest.parsed_version().unwrap();
        let err = CandidateDescriptor::new(manifest, version, stub_module()).unwrap_err();
        assert!(matches!(err, PluginError::CannotGetVersion(_)));
    }
}
