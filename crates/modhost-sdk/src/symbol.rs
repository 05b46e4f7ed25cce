//! Type-tagged entry-point symbols.
//!
//! A raw function address resolved by name from a shared library carries no
//! type information. Entry points are therefore exported through
//! [`ExportedSymbol`], which pairs the address with the
//! `std::any::type_name` of its function type, captured inside the plugin
//! by [`export_entry_point!`](crate::export_entry_point). The host compares
//! that tag against the type it expects before the address is ever cast,
//! and refuses the symbol on any mismatch.

use std::any::type_name;
use std::fmt::{self, Debug, Formatter};
use std::mem;

/// An entry-point function address tagged with its function type.
#[derive(Clone, Copy)]
pub struct ExportedSymbol {
    type_name: &'static str,
    addr: *const (),
}

impl ExportedSymbol {
    /// Wrap a raw address under a type tag. Prefer
    /// [`export_entry_point!`](crate::export_entry_point), which derives
    /// both from the actual function.
    pub fn from_raw(type_name: &'static str, addr: *const ()) -> Self {
        Self { type_name, addr }
    }

    /// The tagged function type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recover the function behind this symbol as `F`.
    ///
    /// Returns `None` unless the tag matches `F` exactly and `F` has
    /// pointer layout; never casts on a mismatch. Sound only when host and
    /// plugin were built with the same toolchain, which the loader
    /// enforces through the ABI version symbol before any lookup.
    pub fn cast<F: Copy + 'static>(&self) -> Option<F> {
        if self.type_name != type_name::<F>() {
            return None;
        }
        if mem::size_of::<F>() != mem::size_of::<*const ()>() {
            return None;
        }
        Some(unsafe { mem::transmute_copy(&self.addr) })
    }
}

impl Debug for ExportedSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedSymbol")
            .field("type_name", &self.type_name)
            .field("addr", &self.addr)
            .finish()
    }
}
