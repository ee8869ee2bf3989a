//! LLTap: a function-interposition framework with two cooperating halves.
//!
//! [`lltap_macro::compilation_unit`] (re-exported here as
//! [`compilation_unit`]) is the compile-time instrumentation pass: applied
//! to a `mod { ... }` item, it rewrites every direct call to, and every
//! store of the address of, an eligible callee so that it is dispatched
//! through a synthesized trampoline. The rest of this crate is the Hook
//! Manager those trampolines consult at each invocation.

pub mod error;
pub mod ffi;
pub mod hook;
pub mod logging;
pub mod manager;

pub use ctor;
pub use once_cell;

pub use error::LltapError;
pub use hook::{HookInfo, HookPointer, HookRegistry, HookType};
pub use manager::{manager, HookManager};

pub use lltap_macro::compilation_unit;

/// Bulk-registers a `&[HookInfo]` from a `#[ctor::ctor]`-run constructor,
/// the Rust equivalent of `liblltap.h`'s `LLTAP_REGISTER_HOOKS` macro.
/// Unlike the C macro, which relies on a null-terminated sentinel, this
/// takes an ordinary Rust slice.
#[macro_export]
macro_rules! lltap_hooks {
    ($hooks:expr) => {
        #[$crate::ctor::ctor]
        fn __lltap_bulk_register() {
            for info in ($hooks).iter() {
                let _ = $crate::ffi::register_hook_info(info);
            }
        }
    };
}
