//! Per-file plugin loading and host-compatibility validation.

use std::path::Path;
use std::sync::Arc;

use semver::Version;
use tracing::warn;

use crate::descriptor::CandidateDescriptor;
use crate::error::{PluginError, Result};
use crate::module::ModuleFacility;
use crate::version::{parse_constraint, parse_version, satisfies};

/// Loads candidate files through the dynamic-loading facility and checks
/// them against the running host's identity and version.
pub struct PluginLoader {
    app_name: String,
    app_version: Option<Version>,
    facility: Arc<dyn ModuleFacility>,
}

impl PluginLoader {
    pub fn new(
        app_name: impl Into<String>,
        app_version: Option<Version>,
        facility: Arc<dyn ModuleFacility>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            app_version,
            facility,
        }
    }

    /// Load a single candidate file.
    ///
    /// Opens the module, invokes its manifest symbol, parses the declared
    /// version, and runs the host-compatibility check. The module stays
    /// resident whether or not validation succeeds; validation failures
    /// only mean the candidate is not activated.
    pub fn load(&self, path: &Path) -> Result<CandidateDescriptor> {
        let module = self.facility.open(path)?;
        let manifest = module.manifest()?;

        let version = parse_version(&manifest.version).map_err(|e| {
            warn!(
                "plugin version is invalid: {} {}: {e}",
                manifest.name, manifest.version
            );
            PluginError::BadPluginVersion(format!("{} {}", manifest.name, manifest.version))
        })?;

        let descriptor = CandidateDescriptor::new(manifest, version, module)?;
        self.check_host_compat(&descriptor)?;
        Ok(descriptor)
    }

    /// Validate the plugin's declared host constraints against the
    /// running host.
    ///
    /// No entry for this host's name passes only when identity checking
    /// is disabled (empty host name and no host version); otherwise the
    /// plugin is for some other application. An entry that exists must
    /// parse and must be satisfied by the host version.
    fn check_host_compat(&self, descriptor: &CandidateDescriptor) -> Result<()> {
        let constraint = match descriptor.apps().get(&self.app_name) {
            Some(expr) => expr,
            None => {
                if self.app_name.is_empty() && self.app_version.is_none() {
                    return Ok(());
                }
                return Err(PluginError::NotForThisApplication(format!(
                    "{} {}",
                    descriptor.name(),
                    descriptor.version_string()
                )));
            }
        };

        let req = parse_constraint(constraint).map_err(|e| {
            warn!("cannot parse app version constraint in plugin: {constraint}: {e}");
            PluginError::BadPluginVersion(format!(
                "{} {}: bad constraint {constraint:?}",
                descriptor.name(),
                descriptor.version_string()
            ))
        })?;

        match &self.app_version {
            Some(version) if satisfies(version, &req) => Ok(()),
            _ => {
                warn!(
                    "plugin is not compatible with current app version: {} requires {constraint}",
                    descriptor.name()
                );
                Err(PluginError::BadAppVersion(format!(
                    "{} {}",
                    descriptor.name(),
                    descriptor.version_string()
                )))
            }
        }
    }
}
