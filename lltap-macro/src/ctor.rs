//! Registration-constructor codegen, standing in for the original pass's
//! emitted `llvm.global_ctors` entry: process-wide init before `main`.
//! One constructor per touched, eligible callee, registering its address
//! under its (possibly namespaced) name so the Hook Manager can resolve
//! `register_hook` calls against it at runtime.
//!
//! The original pass guards each registration with a named global so a
//! module visited more than once by the pass doesn't register twice. A
//! `#[lltap::compilation_unit(..)]` invocation here processes its module
//! exactly once, so that guard has no counterpart to port — the
//! deduplication already happens once, in [`crate::pass::run`], by keying
//! trampolines and touched callees in a `HashSet`/`HashMap`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

pub fn emit_registration_ctor(
    lltap: &syn::Path,
    callee_name: &str,
    hook_namespace: &Option<String>,
) -> TokenStream {
    let registered_name = match hook_namespace {
        Some(ns) => format!("{}_{}", ns, callee_name),
        None => callee_name.to_owned(),
    };
    // `__lltap_inst_add_hook_target` takes a nul-terminated C string, not a
    // Rust `&str`; append the terminator here rather than at the call site.
    let registered_name_cstr = syn::LitStr::new(
        &format!("{}\0", registered_name),
        proc_macro2::Span::call_site(),
    );

    let ctor_ident = format_ident!("__lltap_register_{}", callee_name);
    // Every trampoline for this callee queries the Hook Manager keyed by
    // the *original* callee's address, not its own — register that one.
    let callee_ident = format_ident!("{}", callee_name);

    quote! {
        #[#lltap::ctor::ctor]
        #[allow(non_snake_case)]
        fn #ctor_ident() {
            let __addr = #callee_ident as *const ();
            unsafe {
                #lltap::ffi::__lltap_inst_add_hook_target(
                    __addr,
                    #registered_name_cstr.as_ptr() as *const ::std::os::raw::c_char,
                );
            }
        }
    }
}
