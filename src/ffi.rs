//! The runtime ABI: the symbols the instrumentation pass
//! declares and calls from every trampoline, plus the user-facing
//! registration/deregistration entry points. Everything here is
//! `extern "C"` so it matches the declarations the pass injects into an
//! instrumented compilation unit (`__lltap_inst_add_hook_target`,
//! `__lltap_inst_get_hook`, `__lltap_inst_has_hooks`).

use std::os::raw::c_int;

use crate::hook::{HookInfo, HookPointer, HookType};
use crate::manager::{self, decode_hook_type};

/// `HookInfo` as the C ABI sees it: one `(name, hook, type)` triple.
#[repr(C)]
pub struct CHookInfo {
    pub target_name: *const std::os::raw::c_char,
    pub hook: *const (),
    pub ty: c_int,
}

/// # Safety
/// `name` must be a valid, nul-terminated C string for the duration of the
/// call. `hook` is stored opaquely and is the caller's responsibility to
/// keep valid until deregistered.
#[no_mangle]
pub unsafe extern "C" fn lltap_register_hook(
    name: *const std::os::raw::c_char,
    hook: *const (),
    ty: c_int,
) -> c_int {
    let level = manager::manager().log_level();
    let Ok(name) = std::ffi::CStr::from_ptr(name).to_str() else {
        return 0;
    };
    let Ok(ty) = decode_hook_type(ty, level) else {
        return 0;
    };
    let hook = HookPointer::new(hook);
    match manager::manager().register_hook(name, hook, ty) {
        Ok(()) => 1,
        Err(_) => 0,
    }
}

/// # Safety
/// `info` must point to a single valid `CHookInfo` record; `target_name`
/// must be a valid, nul-terminated C string for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn lltap_register_hook_i(info: *const CHookInfo) -> c_int {
    if info.is_null() {
        return 0;
    }
    let level = manager::manager().log_level();
    let entry = &*info;
    let Ok(name) = std::ffi::CStr::from_ptr(entry.target_name).to_str() else {
        return 0;
    };
    let Ok(ty) = decode_hook_type(entry.ty, level) else {
        return 0;
    };
    let hook = HookPointer::new(entry.hook);
    match manager::manager().register_hook(name, hook, ty) {
        Ok(()) => 1,
        Err(_) => 0,
    }
}

/// # Safety
/// `name` must be a valid, nul-terminated C string for the duration of the
/// call.
#[no_mangle]
pub unsafe extern "C" fn lltap_deregister_hook(name: *const std::os::raw::c_char, ty: c_int) {
    let level = manager::manager().log_level();
    let Ok(name) = std::ffi::CStr::from_ptr(name).to_str() else {
        return;
    };
    if let Ok(ty) = decode_hook_type(ty, level) {
        manager::manager().deregister_hook(name, ty);
    }
}

/// Emitted by the pass into a per-module constructor; records `name ->
/// addr` before any user thread can observe a hook for that callee.
///
/// # Safety
/// `name` must be a valid, nul-terminated C string; `addr` is stored as an
/// opaque address and never dereferenced here.
#[no_mangle]
pub unsafe extern "C" fn __lltap_inst_add_hook_target(
    addr: *const (),
    name: *const std::os::raw::c_char,
) {
    if let Ok(name) = std::ffi::CStr::from_ptr(name).to_str() {
        manager::manager().add_target(name, addr);
    }
}

/// Called from every trampoline after `__lltap_inst_has_hooks` reports a
/// non-zero bitmap, to fetch the specific hook to cast and call.
#[no_mangle]
pub extern "C" fn __lltap_inst_get_hook(addr: *const (), ty: c_int) -> *const () {
    let level = manager::manager().log_level();
    match decode_hook_type(ty, level) {
        Ok(ty) => manager::manager()
            .get_hook(addr, ty)
            .map(HookPointer::as_ptr)
            .unwrap_or(std::ptr::null()),
        Err(_) => std::ptr::null(),
    }
}

/// Called from every trampoline's `init` block to decide
/// whether to take the `call_orig`-only fast path.
#[no_mangle]
pub extern "C" fn __lltap_inst_has_hooks(addr: *const ()) -> c_int {
    manager::manager().get_hook_bitmap(addr)
}

/// Typed, non-FFI convenience wrapper over the Hook Manager's own
/// `register_hook_info`, for Rust callers (e.g. [`crate::lltap_hooks!`])
/// building a [`HookInfo`] directly rather than a C struct.
pub fn register_hook_info(info: &HookInfo) -> Result<(), crate::error::LltapError> {
    manager::manager().register_hook_info(info)
}

pub fn register_hook(
    name: &str,
    hook: HookPointer,
    ty: HookType,
) -> Result<(), crate::error::LltapError> {
    manager::manager().register_hook(name, hook, ty)
}

pub fn deregister_hook(name: &str, ty: HookType) {
    manager::manager().deregister_hook(name, ty)
}
