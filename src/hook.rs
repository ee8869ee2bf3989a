//! Data model shared by the Hook Manager and the trampolines the
//! instrumentation pass synthesizes: hook kinds, the untyped callable
//! pointer a hook is stored as, and the per-callee triple of installed
//! hooks.

/// The three kinds of hook a trampoline may dispatch to, encoded as the
/// bits of a 3-bit bitmap so a set of installed kinds can be packed into a
/// single `i32` and handed to a trampoline in one runtime call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum HookType {
    /// Runs before the callee, with pointers to every argument.
    Pre = 1,
    /// Runs instead of the callee; the callee is not invoked at all.
    Replace = 2,
    /// Runs after the callee, with a pointer to the return slot.
    Post = 4,
}

impl HookType {
    /// All variants, in bit order. Used by the Hook Manager to build a
    /// bitmap from a registry without hardcoding the enum three times.
    pub const ALL: [HookType; 3] = [HookType::Pre, HookType::Replace, HookType::Post];

    /// Converts the raw `i32` the ABI passes across the FFI boundary into a
    /// `HookType`, or `None` for any value that isn't one of 1, 2, 4.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(HookType::Pre),
            2 => Some(HookType::Replace),
            4 => Some(HookType::Post),
            _ => None,
        }
    }

    pub fn bit(self) -> i32 {
        self as i32
    }
}

/// An untyped callable address. The actual calling convention is recovered
/// by the trampoline that installed it, which casts it back to the shape
/// appropriate for the hook's kind and the callee's signature.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HookPointer(pub *const ());

// SAFETY: a `HookPointer` is just a code address. It carries no borrowed
// data; the caller is responsible for keeping the pointee valid between
// `register` and `deregister`.
unsafe impl Send for HookPointer {}
unsafe impl Sync for HookPointer {}

impl HookPointer {
    /// # Safety
    /// `ptr` must be a valid function pointer for as long as it remains
    /// registered.
    pub unsafe fn new(ptr: *const ()) -> Self {
        HookPointer(ptr)
    }

    pub fn as_ptr(self) -> *const () {
        self.0
    }
}

/// The record the Hook Manager keeps per callee address: at most one hook
/// of each kind, `None` meaning "not installed".
#[derive(Default, Clone, Copy)]
pub struct HookRegistry {
    pub pre: Option<HookPointer>,
    pub replace: Option<HookPointer>,
    pub post: Option<HookPointer>,
}

impl HookRegistry {
    pub fn slot(&self, ty: HookType) -> Option<HookPointer> {
        match ty {
            HookType::Pre => self.pre,
            HookType::Replace => self.replace,
            HookType::Post => self.post,
        }
    }

    pub fn slot_mut(&mut self, ty: HookType) -> &mut Option<HookPointer> {
        match ty {
            HookType::Pre => &mut self.pre,
            HookType::Replace => &mut self.replace,
            HookType::Post => &mut self.post,
        }
    }

    /// ORs together the kinds that have a non-`None` slot.
    pub fn bitmap(&self) -> i32 {
        let mut bm = 0;
        if self.pre.is_some() {
            bm |= HookType::Pre.bit();
        }
        if self.replace.is_some() {
            bm |= HookType::Replace.bit();
        }
        if self.post.is_some() {
            bm |= HookType::Post.bit();
        }
        bm
    }

    pub fn is_empty(&self) -> bool {
        self.pre.is_none() && self.replace.is_none() && self.post.is_none()
    }
}

/// One entry of a bulk registration array, as built by the
/// [`crate::lltap_hooks!`] macro and consumed by
/// [`crate::ffi::register_hook_info`].
pub struct HookInfo {
    pub target: String,
    pub hook: HookPointer,
    pub ty: HookType,
}
