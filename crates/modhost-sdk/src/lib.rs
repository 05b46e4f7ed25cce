//! modhost plugin SDK.
//!
//! Plugins are shared libraries (`.so` on Linux, `.dylib` on macOS, `.dll`
//! on Windows) that export two well-known symbols:
//!
//! - [`ABI_SYMBOL`]: a `u32` static holding [`MODHOST_ABI_VERSION`], read by
//!   the host before anything else is trusted;
//! - [`MANIFEST_SYMBOL`]: a zero-argument function returning a
//!   [`PluginManifest`] describing the plugin.
//!
//! The manifest names an entry-point symbol, which must resolve inside the
//! same library to a function returning an [`ExportedSymbol`]. Both symbols
//! are generated by the [`declare_plugin!`] and [`export_entry_point!`]
//! macros:
//!
//! ```rust,ignore
//! use modhost_sdk::prelude::*;
//!
//! declare_plugin!(
//!     PluginManifest::new("greeter", "1.2.0")
//!         .with_app("myhost", ">=1.0.0, <2.0.0")
//!         .with_entry_point("greeter_init")
//! );
//!
//! fn init(host: &mut HostContext) -> Result<(), InitError> { /* ... */ }
//!
//! export_entry_point!(greeter_init, fn(&mut HostContext) -> Result<(), InitError>, init);
//! ```
//!
//! Host and plugins must be built with the same toolchain and SDK version;
//! the ABI symbol exists so the host can refuse a mismatched build before
//! any Rust value crosses the boundary.

pub mod manifest;
#[macro_use]
pub mod macros;
pub mod symbol;

pub use manifest::PluginManifest;
pub use symbol::ExportedSymbol;

/// Current plugin ABI version. Bumped whenever the manifest or symbol
/// layout changes.
pub const MODHOST_ABI_VERSION: u32 = 1;

/// Name of the manifest function every plugin must export.
pub const MANIFEST_SYMBOL: &str = "modhost_plugin_manifest";

/// Name of the ABI version static every plugin must export.
pub const ABI_SYMBOL: &str = "modhost_abi_version";

/// Signature of the exported manifest function.
pub type ManifestFn = extern "Rust" fn() -> PluginManifest;

/// Signature of an exported entry-point getter.
pub type EntryPointFn = extern "Rust" fn() -> ExportedSymbol;

/// Common imports for plugin authors.
pub mod prelude {
    pub use crate::manifest::PluginManifest;
    pub use crate::symbol::ExportedSymbol;
    pub use crate::{ABI_SYMBOL, MANIFEST_SYMBOL, MODHOST_ABI_VERSION};
    pub use crate::{declare_plugin, export_entry_point};
}
