//! Export macros for plugin crates.

/// Export the ABI version static and the manifest function.
///
/// Use once per plugin crate:
///
/// ```rust,ignore
/// declare_plugin!(
///     PluginManifest::new("greeter", "1.2.0")
///         .with_app("myhost", ">=1.0.0")
///         .with_entry_point("greeter_init")
/// );
/// ```
#[macro_export]
macro_rules! declare_plugin {
    ($manifest:expr) => {
        #[allow(non_upper_case_globals)]
        #[no_mangle]
        pub static modhost_abi_version: u32 = $crate::MODHOST_ABI_VERSION;

        #[no_mangle]
        pub extern "Rust" fn modhost_plugin_manifest() -> $crate::PluginManifest {
            $manifest
        }
    };
}

/// Export an entry point under a type tag.
///
/// `$symbol` must match the `entry_point` declared in the manifest, `$ty`
/// is the function-pointer type the host will request, and `$func` is the
/// implementation. The tag is derived from `$ty` inside the plugin, so a
/// host asking for a different type fails the lookup instead of calling
/// through a miscast pointer.
///
/// ```rust,ignore
/// export_entry_point!(greeter_init, fn(&mut HostContext) -> InitResult, init);
/// ```
#[macro_export]
macro_rules! export_entry_point {
    ($symbol:ident, $ty:ty, $func:expr) => {
        #[no_mangle]
        pub extern "Rust" fn $symbol() -> $crate::ExportedSymbol {
            let f: $ty = $func;
            $crate::ExportedSymbol::from_raw(::std::any::type_name::<$ty>(), f as *const ())
        }
    };
}
