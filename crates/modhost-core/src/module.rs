//! Loaded-module seam: traits over the dynamic-loading facility, the
//! `libloading`-backed implementation, and the module residency registry.
//!
//! Opening a shared library leaves it resident in the process for its
//! lifetime; there is no unload path in this design. All `unsafe` in the
//! crate lives in the `libloading`-backed implementation here.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use modhost_sdk::{
    EntryPointFn, ExportedSymbol, ManifestFn, PluginManifest, ABI_SYMBOL, MANIFEST_SYMBOL,
    MODHOST_ABI_VERSION,
};
use tracing::debug;

use crate::error::{PluginError, Result};

/// A module opened by the dynamic-loading facility.
///
/// Keeps its library handle alive; symbol lookups are deferred until
/// requested, so the typed entry-point resolver never re-opens the file.
pub trait LoadedModule {
    /// Invoke the well-known manifest symbol.
    ///
    /// Fails with [`PluginError::CannotGetVersion`] when the symbol is
    /// missing or the module was built against a different ABI.
    fn manifest(&self) -> Result<PluginManifest>;

    /// Look up an exported entry point by name.
    ///
    /// Fails with [`PluginError::BadInitFunc`] when the symbol is missing.
    fn entry_point(&self, name: &str) -> Result<ExportedSymbol>;

    /// Path the module was opened from.
    fn path(&self) -> &Path;
}

impl std::fmt::Debug for dyn LoadedModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModule")
            .field("path", &self.path())
            .finish()
    }
}

/// The dynamic-loading facility: opens a file as a module.
pub trait ModuleFacility {
    /// Open `path` as a loadable module.
    ///
    /// Fails with [`PluginError::NotAPlugin`] when the file cannot be
    /// opened as one.
    fn open(&self, path: &Path) -> Result<Arc<dyn LoadedModule>>;
}

/// Production facility backed by `libloading`.
///
/// Owns every handle it opens: dropping a `Library` would unload the
/// module, and this design has no unload path, so handles stay here even
/// when validation later rejects the candidate.
#[derive(Default)]
pub struct DlFacility {
    opened: RefCell<Vec<Arc<dyn LoadedModule>>>,
}

impl DlFacility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of modules this facility has left resident.
    pub fn resident_count(&self) -> usize {
        self.opened.borrow().len()
    }
}

impl ModuleFacility for DlFacility {
    fn open(&self, path: &Path) -> Result<Arc<dyn LoadedModule>> {
        // SAFETY: loading a shared library runs its initializers; plugins
        // are trusted code supplied by the host operator.
        let library = unsafe { Library::new(path) }
            .map_err(|e| PluginError::NotAPlugin(format!("{}: {e}", path.display())))?;

        let module: Arc<dyn LoadedModule> = Arc::new(DlModule {
            library,
            path: path.to_path_buf(),
        });
        self.opened.borrow_mut().push(Arc::clone(&module));
        Ok(module)
    }
}

impl std::fmt::Debug for DlFacility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DlFacility")
            .field("resident", &self.resident_count())
            .finish()
    }
}

struct DlModule {
    library: Library,
    path: PathBuf,
}

impl DlModule {
    fn abi_version(&self) -> Result<u32> {
        // SAFETY: the symbol, when present, is a u32 static exported by
        // `declare_plugin!`.
        let abi = unsafe { self.library.get::<*const u32>(ABI_SYMBOL.as_bytes()) }
            .map_err(|e| {
                PluginError::CannotGetVersion(format!(
                    "{}: missing {ABI_SYMBOL} symbol: {e}",
                    self.path.display()
                ))
            })?;
        Ok(unsafe { **abi })
    }
}

impl LoadedModule for DlModule {
    fn manifest(&self) -> Result<PluginManifest> {
        let abi = self.abi_version()?;
        if abi != MODHOST_ABI_VERSION {
            return Err(PluginError::CannotGetVersion(format!(
                "{}: ABI version mismatch: expected {MODHOST_ABI_VERSION}, found {abi}",
                self.path.display()
            )));
        }

        // SAFETY: the ABI gate above establishes that the module exports
        // the manifest function with the signature this SDK defines.
        let manifest_fn = unsafe { self.library.get::<ManifestFn>(MANIFEST_SYMBOL.as_bytes()) }
            .map_err(|e| {
                PluginError::CannotGetVersion(format!(
                    "{}: missing {MANIFEST_SYMBOL} symbol: {e}",
                    self.path.display()
                ))
            })?;

        Ok(manifest_fn())
    }

    fn entry_point(&self, name: &str) -> Result<ExportedSymbol> {
        // SAFETY: entry points are exported by `export_entry_point!` as
        // getters returning an ExportedSymbol; the ABI was checked before
        // this module produced a manifest.
        let entry_fn = unsafe { self.library.get::<EntryPointFn>(name.as_bytes()) }
            .map_err(|e| {
                PluginError::BadInitFunc(format!("{}: {name}: {e}", self.path.display()))
            })?;

        Ok(entry_fn())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Owning registry of resident modules, keyed by the path they were
/// opened from.
///
/// Modules are never closed; the registry makes the process-lifetime
/// residency explicit and gives future unload support a seam. Repeated
/// resolution runs over the same directory re-open their files and
/// replace the entries here.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: HashMap<PathBuf, Arc<dyn LoadedModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resident module, replacing any previous entry for the
    /// same path.
    pub fn insert(&mut self, module: Arc<dyn LoadedModule>) {
        let path = module.path().to_path_buf();
        if self.modules.insert(path.clone(), module).is_some() {
            debug!("module re-opened: {}", path.display());
        }
    }

    pub fn get(&self, path: &Path) -> Option<&Arc<dyn LoadedModule>> {
        self.modules.get(path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Paths of all resident modules.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.modules.keys().map(PathBuf::as_path)
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("resident", &self.modules.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubModule {
        path: PathBuf,
    }

    impl LoadedModule for StubModule {
        fn manifest(&self) -> Result<PluginManifest> {
            Ok(PluginManifest::new("stub", "1.0.0"))
        }

        fn entry_point(&self, name: &str) -> Result<ExportedSymbol> {
            Err(PluginError::BadInitFunc(name.to_string()))
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    #[test]
    fn registry_tracks_by_path_and_replaces() {
        let mut registry = ModuleRegistry::new();
        assert!(registry.is_empty());

        let path = PathBuf::from("/plugins/a.so");
        registry.insert(Arc::new(StubModule { path: path.clone() }));
        registry.insert(Arc::new(StubModule {
            path: PathBuf::from("/plugins/b.so"),
        }));
        assert_eq!(registry.len(), 2);

        // Same path replaces, not duplicates.
        registry.insert(Arc::new(StubModule { path: path.clone() }));
        assert_eq!(registry.len(), 2);
        assert!(registry.get(&path).is_some());
        assert!(registry.get(Path::new("/plugins/c.so")).is_none());
    }

    #[test]
    fn dl_facility_rejects_non_modules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a_lib.so");
        std::fs::write(&path, b"definitely not an ELF").unwrap();

        let facility = DlFacility::new();
        let err = facility.open(&path).unwrap_err();
        assert!(matches!(err, PluginError::NotAPlugin(_)));
        assert_eq!(facility.resident_count(), 0);
    }

    #[test]
    fn dl_facility_rejects_missing_files() {
        let err = DlFacility::new()
            .open(Path::new("/nonexistent/plugin.so"))
            .unwrap_err();
        assert!(matches!(err, PluginError::NotAPlugin(_)));
    }
}
