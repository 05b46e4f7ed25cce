//! Resolution pipeline: discovery, stage filtering, and name
//! deduplication.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::HostConfig;
use crate::descriptor::CandidateDescriptor;
use crate::error::{PluginError, Result};
use crate::loader::PluginLoader;
use crate::module::{DlFacility, ModuleFacility, ModuleRegistry};
use crate::version::{parse_version, ReleaseStage};

/// The final activated plugin set: one descriptor per name.
///
/// For any name present, no other candidate with that name and a higher
/// version passed filtering.
#[derive(Debug, Default)]
pub struct ResolvedPluginSet {
    plugins: HashMap<String, CandidateDescriptor>,
}

impl ResolvedPluginSet {
    pub fn get(&self, name: &str) -> Option<&CandidateDescriptor> {
        self.plugins.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateDescriptor> {
        self.plugins.values()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl IntoIterator for ResolvedPluginSet {
    type Item = CandidateDescriptor;
    type IntoIter = std::collections::hash_map::IntoValues<String, CandidateDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.plugins.into_values()
    }
}

/// Discovers, validates, and resolves plugins for one host application.
///
/// Single-threaded and synchronous; callers wanting to drive it from
/// multiple threads must serialize access, since the underlying module
/// registry of the dynamic-loading facility is not guaranteed safe for
/// concurrent opens. Each `resolve_all` call re-opens matching files;
/// modules stay resident for the process lifetime either way.
pub struct PluginResolver {
    loader: PluginLoader,
    plugins_dir: PathBuf,
    pattern: glob::Pattern,
    stages: Vec<ReleaseStage>,
    registry: ModuleRegistry,
}

impl PluginResolver {
    /// Build a resolver using the real dynamic-loading facility.
    pub fn new(config: HostConfig) -> Result<Self> {
        Self::with_facility(config, Arc::new(DlFacility::new()))
    }

    /// Build a resolver over a caller-supplied facility.
    ///
    /// Fails with [`PluginError::BadHostVersion`] when the configured host
    /// version does not parse, and [`PluginError::Discovery`] when the
    /// filename pattern does not compile.
    pub fn with_facility(config: HostConfig, facility: Arc<dyn ModuleFacility>) -> Result<Self> {
        let app_name = config.app_name.trim().to_string();

        let app_version = match config.app_version.trim() {
            "" => None,
            raw => Some(parse_version(raw).map_err(|e| {
                PluginError::BadHostVersion(format!("{raw}: {e}"))
            })?),
        };

        let pattern = glob::Pattern::new(&config.pattern)
            .map_err(|e| PluginError::Discovery(format!("bad pattern {:?}: {e}", config.pattern)))?;

        Ok(Self {
            loader: PluginLoader::new(app_name, app_version, facility),
            plugins_dir: config.plugins_dir,
            pattern,
            stages: config.stages,
            registry: ModuleRegistry::new(),
        })
    }

    /// Registry of modules left resident by resolution runs.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Run the full pipeline: enumerate, load, filter, deduplicate.
    ///
    /// Per-file failures are logged and skipped; a broken plugin never
    /// aborts discovery of the others. Directory enumeration failure and
    /// an empty final set are fatal to the call.
    pub fn resolve_all(&mut self) -> Result<ResolvedPluginSet> {
        let matches = self.discover()?;

        let mut candidates = Vec::new();
        for path in matches {
            info!("load plugin: {}", path.display());
            match self.loader.load(&path) {
                Ok(descriptor) => {
                    self.registry.insert(Arc::clone(descriptor.module()));
                    candidates.push(descriptor);
                }
                Err(err) => warn!("cannot load plugin {}: {err}", path.display()),
            }
        }

        let candidates = self.filter_by_stage(candidates);
        let resolved = Self::dedup_by_name(candidates);

        if resolved.is_empty() {
            return Err(PluginError::NoPlugins);
        }
        Ok(resolved)
    }

    /// Enumerate files in the plugins directory whose names match the
    /// pattern. Single level, not recursive. Results are sorted so that
    /// duplicate-name ties resolve deterministically.
    fn discover(&self) -> Result<Vec<PathBuf>> {
        let dir = &self.plugins_dir;
        let entries = fs::read_dir(dir)
            .map_err(|e| PluginError::Discovery(format!("{}: {e}", dir.display())))?;

        let mut matches = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| PluginError::Discovery(format!("{}: {e}", dir.display())))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let matched = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| self.pattern.matches(name));
            if matched {
                matches.push(path);
            }
        }

        if matches.is_empty() {
            return Err(PluginError::NoPlugins);
        }
        matches.sort();
        Ok(matches)
    }

    /// Keep candidates belonging to at least one allowed stage. An empty
    /// allow-list disables filtering.
    fn filter_by_stage(&self, candidates: Vec<CandidateDescriptor>) -> Vec<CandidateDescriptor> {
        if self.stages.is_empty() {
            return candidates;
        }

        candidates
            .into_iter()
            .filter(|candidate| {
                let keep = self
                    .stages
                    .iter()
                    .any(|stage| stage.matches(candidate.version()));
                if !keep {
                    debug!(
                        "plugin is not in selected stages: {} {}",
                        candidate.name(),
                        candidate.version_string()
                    );
                }
                keep
            })
            .collect()
    }

    /// Group candidates by name, keeping the strictly greatest version
    /// within each group. The first candidate (in sorted path order) wins
    /// ties.
    fn dedup_by_name(candidates: Vec<CandidateDescriptor>) -> ResolvedPluginSet {
        let mut plugins: HashMap<String, CandidateDescriptor> = HashMap::new();

        for candidate in candidates {
            match plugins.get(candidate.name()) {
                Some(existing) if candidate.version() <= existing.version() => {
                    debug!(
                        "plugin superseded by higher version: {} {}",
                        candidate.name(),
                        candidate.version_string()
                    );
                }
                _ => {
                    plugins.insert(candidate.name().to_string(), candidate);
                }
            }
        }

        ResolvedPluginSet { plugins }
    }
}

impl std::fmt::Debug for PluginResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginResolver")
            .field("plugins_dir", &self.plugins_dir)
            .field("pattern", &self.pattern.as_str())
            .field("stages", &self.stages)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
