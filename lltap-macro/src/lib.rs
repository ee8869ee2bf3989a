#![feature(proc_macro_diagnostic)]
#![feature(let_else)]
//! The instrumentation pass, expressed as a Rust attribute macro. Applying
//! `#[lltap::compilation_unit(..)]` to a `mod { .. }` block treats that
//! module as one compilation unit: every eligible call and
//! function-pointer store inside it is rewritten to route through a
//! synthesized trampoline, and a registration constructor is emitted for
//! every callee actually touched.

use proc_macro::TokenStream;
use proc_macro2::Span;
use proc_macro_crate::FoundCrate;

mod callee;
mod config;
mod ctor;
mod mangle;
mod pass;
mod selection;
mod trampoline;

use config::Config;

fn get_lltap_crate_name() -> syn::Result<syn::Path> {
    match proc_macro_crate::crate_name("lltap") {
        Ok(FoundCrate::Itself) => Ok(syn::parse_quote!(crate)),
        Ok(FoundCrate::Name(named)) => {
            let ident = syn::Ident::new(&named, Span::call_site());
            Ok(syn::parse_quote!(::#ident))
        }
        Err(e) => Err(syn::Error::new(Span::call_site(), e.to_string())),
    }
}

#[proc_macro_attribute]
pub fn compilation_unit(attr: TokenStream, item: TokenStream) -> TokenStream {
    let config = syn::parse_macro_input!(attr as Config);
    let module = syn::parse_macro_input!(item as syn::ItemMod);

    let lltap = match get_lltap_crate_name() {
        Ok(path) => path,
        Err(e) => return e.to_compile_error().into(),
    };

    let output = match pass::run(lltap, config, module) {
        Ok(output) => output,
        Err(e) => return e.to_compile_error().into(),
    };

    for (span, message) in &output.warnings {
        span.unwrap().warning(message.clone()).emit();
    }

    let pass::PassOutput {
        mut module,
        trampolines,
        ctors,
        ..
    } = output;

    if let Some((_, items)) = &mut module.content {
        for tokens in trampolines.into_iter().chain(ctors) {
            items.push(syn::Item::Verbatim(tokens));
        }
    }

    quote::quote!(#module).into()
}
