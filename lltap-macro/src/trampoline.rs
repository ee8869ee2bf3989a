//! Trampoline synthesis: for an eligible callee with a
//! concrete fixed-arity signature, generate a function with the identical
//! signature implementing the 9-block pre/replace/post dispatch skeleton.
//!
//! Rust gives every parameter its own mutable stack slot for free (a `mut`
//! parameter binding), so `entry`'s "allocate slots, store incoming args"
//! step needs no extra code — the trampoline's own parameters *are* those
//! slots, and a pre-hook mutates them in place through `&mut`. Likewise,
//! because each trampoline here is generated for one concrete argument
//! list (the callee's own signature, or one call site's observed argument
//! types for a variadic callee), none of the hook types need to *be*
//! variadic function types — only the call that reaches a true C variadic
//! callee is ever variadic, and it is always invoked with a concrete
//! argument list.

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};

use crate::callee::Callee;

/// Identifies one synthesized trampoline: a callee name plus, for a
/// variadic callee, the mangled shape of one observed call site. `None`
/// means "the callee's own declared signature" — used for ordinary
/// fixed-arity calls and for function-pointer stores.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TrampolineKey {
    pub callee: String,
    pub shape: Option<String>,
}

pub struct TrampolineSpec {
    pub key: TrampolineKey,
    pub ident: syn::Ident,
    pub callee_ident: syn::Ident,
    pub inputs: Vec<syn::Type>,
    pub output: syn::ReturnType,
}

impl TrampolineSpec {
    pub fn name(&self) -> String {
        self.ident.to_string()
    }

    /// Fixed-arity, non-variadic trampoline synthesized for a callee's own
    /// declared signature (`createHookFunction(name, origFunc, M)`).
    pub fn for_callee(callee: &Callee) -> Self {
        let ident = format_ident!("__lltap_hook_{}", callee.ident);
        TrampolineSpec {
            key: TrampolineKey {
                callee: callee.name(),
                shape: None,
            },
            ident,
            callee_ident: callee.ident.clone(),
            inputs: callee.inputs.clone(),
            output: callee.output.clone(),
        }
    }

    /// Trampoline synthesized for one call site to a variadic callee
    /// (`createHookFunction(name, CS, origFunc, M)`), named after the
    /// mangled shape of `call_site_inputs`.
    pub fn for_call_site(
        callee: &Callee,
        call_site_inputs: Vec<syn::Type>,
    ) -> Self {
        let mangled = crate::mangle::mangle_types(&call_site_inputs);
        let ident = format_ident!("__lltap_hook_{}_{}", callee.ident, mangled);
        TrampolineSpec {
            key: TrampolineKey {
                callee: callee.name(),
                shape: Some(mangled),
            },
            ident,
            callee_ident: callee.ident.clone(),
            inputs: call_site_inputs,
            output: callee.output.clone(),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self.output, syn::ReturnType::Default)
    }

    fn ret_type(&self) -> syn::Type {
        match &self.output {
            syn::ReturnType::Default => syn::parse_quote!(()),
            syn::ReturnType::Type(_, ty) => (**ty).clone(),
        }
    }

    /// Emits the trampoline function item: entry, an init check of the
    /// hook bitmap, pre-hook, replace-hook-or-original-call, post-hook,
    /// and return, collapsed onto Rust control flow rather than literal
    /// basic blocks.
    pub fn emit(&self, lltap: &syn::Path) -> TokenStream {
        let trampoline_ident = &self.ident;
        let callee_ident = &self.callee_ident;
        let ret = &self.output;
        let ret_ty = self.ret_type();
        let is_void = self.is_void();

        let param_idents: Vec<syn::Ident> = (0..self.inputs.len())
            .map(|i| format_ident!("__a{}", i))
            .collect();
        let param_tys = &self.inputs;

        let params = param_idents.iter().zip(param_tys.iter()).map(|(id, ty)| {
            quote! { mut #id: #ty }
        });

        let pre_ty = quote! { unsafe extern "C" fn(#(*mut #param_tys),*) };
        let replace_ty = quote! { unsafe extern "C" fn(#(#param_tys),*) #ret };
        let post_ty = if is_void {
            quote! { unsafe extern "C" fn(#(#param_tys),*) }
        } else {
            quote! { unsafe extern "C" fn(*mut #ret_ty, #(#param_tys),*) }
        };

        let call_orig = quote! { #callee_ident(#(#param_idents),*) };
        let call_pre_args = quote! { #(&mut #param_idents as *mut #param_tys),* };
        let call_replace_args = quote! { #(#param_idents),* };

        let fast_path_call = if is_void {
            quote! { #call_orig; return; }
        } else {
            quote! { return #call_orig; }
        };

        let post_call = if is_void {
            quote! { __h(#(#param_idents),*); }
        } else {
            quote! { __h(&mut __ret as *mut #ret_ty, #(#param_idents),*); }
        };

        let dispatch_and_return = if is_void {
            quote! {
                if __bm & (#lltap::HookType::Replace as i32) != 0 {
                    let __h = #lltap::ffi::__lltap_inst_get_hook(__addr, #lltap::HookType::Replace as i32);
                    let __h: #replace_ty = ::std::mem::transmute(__h);
                    __h(#call_replace_args);
                } else {
                    #call_orig;
                }

                if __bm & (#lltap::HookType::Post as i32) != 0 {
                    let __h = #lltap::ffi::__lltap_inst_get_hook(__addr, #lltap::HookType::Post as i32);
                    let __h: #post_ty = ::std::mem::transmute(__h);
                    #post_call
                }
            }
        } else {
            quote! {
                let mut __ret: #ret_ty = if __bm & (#lltap::HookType::Replace as i32) != 0 {
                    let __h = #lltap::ffi::__lltap_inst_get_hook(__addr, #lltap::HookType::Replace as i32);
                    let __h: #replace_ty = ::std::mem::transmute(__h);
                    __h(#call_replace_args)
                } else {
                    #call_orig
                };

                if __bm & (#lltap::HookType::Post as i32) != 0 {
                    let __h = #lltap::ffi::__lltap_inst_get_hook(__addr, #lltap::HookType::Post as i32);
                    let __h: #post_ty = ::std::mem::transmute(__h);
                    #post_call
                }

                __ret
            }
        };

        quote! {
            #[no_mangle]
            #[allow(non_snake_case, clippy::missing_safety_doc, clippy::not_unsafe_ptr_arg_deref)]
            pub unsafe extern "C" fn #trampoline_ident(#(#params),*) #ret {
                // entry: parameters are already per-call stack slots; init:
                // query the runtime bitmap for this callee.
                let __addr = #callee_ident as *const ();
                let __bm = #lltap::ffi::__lltap_inst_has_hooks(__addr);

                if __bm == 0 {
                    // call_orig (fast path) -> return
                    #fast_path_call
                }

                // check_pre / call_pre
                if __bm & (#lltap::HookType::Pre as i32) != 0 {
                    let __h = #lltap::ffi::__lltap_inst_get_hook(__addr, #lltap::HookType::Pre as i32);
                    let __h: #pre_ty = ::std::mem::transmute(__h);
                    __h(#call_pre_args);
                }

                // check_rh / call_rh / call_orig, then check_post / call_post / return
                #dispatch_and_return
            }
        }
    }
}

/// Only used to silence an unused-import lint when this module is compiled
/// standalone by rustdoc; harmless in the macro crate itself.
#[allow(dead_code)]
fn _span() -> Span {
    Span::call_site()
}
