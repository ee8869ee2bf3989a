//! Error taxonomy for the runtime half of LLTap. Configuration
//! errors from the instrumentation pass are reported as `syn`/`compile_error!`
//! diagnostics at macro-expansion time and have no runtime representation;
//! this enum covers only the conditions the Hook Manager itself can raise.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LltapError {
    /// `register_hook`/`deregister_hook` named a callee with no registered
    /// address. The C ABI treats this as a silent failure code; the typed
    /// API surfaces it so callers who want to know can ask.
    #[error("no callee is registered under the name {0:?}")]
    UnknownTarget(String),

    /// The raw `i32` handed across the FFI boundary didn't decode to one
    /// of `HookType::{Pre,Replace,Post}`.
    #[error("invalid hook type value {0}")]
    InvalidHookType(i32),
}
