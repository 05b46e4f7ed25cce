//! Plugin discovery and resolution for modhost applications.
//!
//! A host points the resolver at a directory of shared-library plugins;
//! the resolver validates each candidate against the host's identity,
//! version, and allowed release stages, then deduplicates by name keeping
//! the highest version. Activated plugins expose a typed initialization
//! entry point the host resolves on demand.
//!
//! ```rust,no_run
//! use modhost_core::{resolve_entry_point, HostConfig, PluginResolver, ReleaseStage};
//!
//! # fn main() -> modhost_core::Result<()> {
//! let config = HostConfig::new("myhost", "1.5.0")
//!     .with_plugins_dir("./plugins")
//!     .with_stages(vec![ReleaseStage::Beta, ReleaseStage::Stable]);
//!
//! let mut resolver = PluginResolver::new(config)?;
//! let plugins = resolver.resolve_all()?;
//!
//! type InitFn = fn() -> bool;
//! for plugin in plugins.iter() {
//!     let init = resolve_entry_point::<InitFn>(plugin)?;
//!     init();
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Loading is a one-time, process-lifetime operation: modules are never
//! unloaded, and the pipeline is synchronous and single-threaded.

pub mod config;
pub mod descriptor;
pub mod entry;
pub mod error;
pub mod loader;
pub mod module;
pub mod resolver;
pub mod version;

pub use config::{HostConfig, DEFAULT_PATTERN, DEFAULT_PLUGINS_DIR};
pub use descriptor::CandidateDescriptor;
pub use entry::resolve_entry_point;
pub use error::{PluginError, Result};
pub use loader::PluginLoader;
pub use module::{DlFacility, LoadedModule, ModuleFacility, ModuleRegistry};
pub use resolver::{PluginResolver, ResolvedPluginSet};
pub use version::{compare, parse_constraint, parse_version, satisfies, ReleaseStage};

// Shared plugin contract types, re-exported so hosts need only one crate.
pub use modhost_sdk::{ExportedSymbol, PluginManifest, MODHOST_ABI_VERSION};
