//! Typed entry-point resolution for activated plugins.

use std::any::type_name;

use tracing::warn;

use crate::descriptor::CandidateDescriptor;
use crate::error::{PluginError, Result};

/// Resolve a plugin's declared initialization entry point as `F`.
///
/// Looks the symbol up lazily in the plugin's resident module and checks
/// the exported type tag against `F` before handing the function out;
/// a mismatch fails closed with [`PluginError::BadInitType`]. The caller,
/// not this function, invokes the result.
///
/// ```rust,ignore
/// type InitFn = fn(&mut HostContext) -> Result<(), InitError>;
/// let init = resolve_entry_point::<InitFn>(&descriptor)?;
/// init(&mut context)?;
/// ```
pub fn resolve_entry_point<F>(descriptor: &CandidateDescriptor) -> Result<F>
where
    F: Copy + 'static,
{
    let symbol = descriptor
        .module()
        .entry_point(descriptor.entry_point())
        .map_err(|err| {
            warn!(
                "cannot find init func for plugin: {} {}",
                descriptor.name(),
                descriptor.version_string()
            );
            err
        })?;

    symbol.cast::<F>().ok_or_else(|| {
        warn!(
            "wrong plugin init func declaration for plugin: {} {}",
            descriptor.name(),
            descriptor.version_string()
        );
        PluginError::BadInitType(format!(
            "{} {}: expected {}, exported {}",
            descriptor.name(),
            descriptor.version_string(),
            type_name::<F>(),
            symbol.type_name()
        ))
    })
}
