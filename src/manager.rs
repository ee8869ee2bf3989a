//! The process-wide Hook Manager: a name→address map populated by
//! pass-emitted constructors, an address→registry map mutated by
//! `register`/`deregister`, and the single mutex guarding both.

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::error::LltapError;
use crate::hook::{HookInfo, HookPointer, HookRegistry, HookType};
use crate::logging::{lltap_debug, lltap_error, lltap_warn, LogLevel};

/// Both maps behind one coarse lock: registration is rare relative to
/// lookup, so there is no call to split this into a reader-writer lock.
struct ManagerState {
    functions: HashMap<String, usize>,
    hooks: HashMap<usize, HookRegistry>,
}

pub struct HookManager {
    state: Mutex<ManagerState>,
    level: LogLevel,
}

static MANAGER: Lazy<HookManager> = Lazy::new(HookManager::new);

/// Returns the process-wide Hook Manager, constructing it (and reading
/// `LLTAP_LOGLEVEL`) on first access. Module constructors emitted by the
/// instrumentation pass run before `main` and are guaranteed to observe
/// this instance already initialized.
pub fn manager() -> &'static HookManager {
    &MANAGER
}

impl HookManager {
    fn new() -> Self {
        let level = LogLevel::from_env();
        HookManager {
            state: Mutex::new(ManagerState {
                functions: HashMap::new(),
                hooks: HashMap::new(),
            }),
            level,
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.level
    }

    /// `__lltap_inst_add_hook_target`: records `name -> addr`. Called only
    /// from pass-emitted constructors, append-only after process init.
    pub fn add_target(&self, name: &str, addr: *const ()) {
        let mut state = self.state.lock().unwrap();
        lltap_debug!(self.level, "registering target {} for addr {:p}", name, addr);
        state.functions.insert(name.to_owned(), addr as usize);
    }

    /// `register_hook`/`lltap_register_hook`. Returns `Ok(())` if the hook
    /// was installed, `Err` for an unknown name or invalid type — both
    /// non-fatal, logged and handed back to the caller.
    pub fn register_hook(
        &self,
        name: &str,
        hook: HookPointer,
        ty: HookType,
    ) -> Result<(), LltapError> {
        let mut state = self.state.lock().unwrap();
        lltap_debug!(
            self.level,
            "adding hook for target {} ({:p}) type {:?}",
            name,
            hook.as_ptr(),
            ty
        );

        let Some(&addr) = state.functions.get(name) else {
            lltap_warn!(self.level, "no hook target registered for {}", name);
            // Deliberately does not insert a placeholder entry for an
            // unknown name before returning.
            return Err(LltapError::UnknownTarget(name.to_owned()));
        };

        let registry = state.hooks.entry(addr).or_default();
        *registry.slot_mut(ty) = Some(hook);
        Ok(())
    }

    pub fn register_hook_info(&self, info: &HookInfo) -> Result<(), LltapError> {
        self.register_hook(&info.target, info.hook, info.ty)
    }

    /// `deregister_hook`: clears the `ty` slot for `name`'s callee. No-op
    /// if the name or callee is unknown.
    pub fn deregister_hook(&self, name: &str, ty: HookType) {
        let mut state = self.state.lock().unwrap();
        let Some(&addr) = state.functions.get(name) else {
            return;
        };
        if let Some(registry) = state.hooks.get_mut(&addr) {
            *registry.slot_mut(ty) = None;
        }
    }

    /// `__lltap_inst_get_hook`: the hook installed at `(addr, ty)`, or
    /// `None`. Called from trampolines on the fast path, so this never
    /// blocks beyond mutex contention.
    pub fn get_hook(&self, addr: *const (), ty: HookType) -> Option<HookPointer> {
        let state = self.state.lock().unwrap();
        state
            .hooks
            .get(&(addr as usize))
            .and_then(|registry| registry.slot(ty))
    }

    /// `__lltap_inst_has_hooks`: the 3-bit bitmap of installed kinds for
    /// `addr`, or `0` if `addr` has no registry or an empty one.
    pub fn get_hook_bitmap(&self, addr: *const ()) -> i32 {
        let state = self.state.lock().unwrap();
        state
            .hooks
            .get(&(addr as usize))
            .map(HookRegistry::bitmap)
            .unwrap_or(0)
    }
}

/// Raised only when `HookType::from_raw` fails; the runtime never aborts
/// on this, it only logs and returns failure.
pub fn decode_hook_type(raw: i32, level: LogLevel) -> Result<HookType, LltapError> {
    match HookType::from_raw(raw) {
        Some(ty) => Ok(ty),
        None => {
            lltap_error!(level, "invalid hook type ({})", raw);
            Err(LltapError::InvalidHookType(raw))
        }
    }
}
