//! Parses the `#[lltap::compilation_unit(...)]` attribute's argument list
//! into a [`Config`]. This is the Rust-attribute equivalent of the
//! `cl::opt` command-line flags in `LLTap.cpp`: `inst-func`,
//! `inst-funcs-re`, `no-inst-func`, `no-inst-funcs-re`, `inst-mode`,
//! `no-inst-fptrs`, `hook-namespace`. Unknown keys, or a regex that fails
//! to compile, are fatal configuration errors reported as `syn::Error`,
//! which aborts compilation with a normal Rust diagnostic.

use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;

use crate::selection::{InstMode, SelectionPolicy};

pub mod kw {
    syn::custom_keyword!(inst_func);
    syn::custom_keyword!(inst_funcs_re);
    syn::custom_keyword!(no_inst_func);
    syn::custom_keyword!(no_inst_funcs_re);
    syn::custom_keyword!(inst_mode);
    syn::custom_keyword!(no_inst_fptrs);
    syn::custom_keyword!(hook_namespace);
}

pub struct Config {
    pub policy: SelectionPolicy,
    pub no_inst_fptrs: bool,
    pub hook_namespace: Option<String>,
}

enum Entry {
    InstFunc(syn::LitStr),
    InstFuncsRe(syn::LitStr),
    NoInstFunc(syn::LitStr),
    NoInstFuncsRe(syn::LitStr),
    InstMode(syn::LitStr),
    NoInstFptrs,
    HookNamespace(syn::LitStr),
}

fn parse_value(input: ParseStream) -> syn::Result<syn::LitStr> {
    input.parse::<syn::Token![=]>()?;
    input.parse()
}

impl Parse for Entry {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(kw::inst_funcs_re) {
            input.parse::<kw::inst_funcs_re>()?;
            Ok(Entry::InstFuncsRe(parse_value(input)?))
        } else if input.peek(kw::inst_func) {
            input.parse::<kw::inst_func>()?;
            Ok(Entry::InstFunc(parse_value(input)?))
        } else if input.peek(kw::no_inst_funcs_re) {
            input.parse::<kw::no_inst_funcs_re>()?;
            Ok(Entry::NoInstFuncsRe(parse_value(input)?))
        } else if input.peek(kw::no_inst_func) {
            input.parse::<kw::no_inst_func>()?;
            Ok(Entry::NoInstFunc(parse_value(input)?))
        } else if input.peek(kw::inst_mode) {
            input.parse::<kw::inst_mode>()?;
            Ok(Entry::InstMode(parse_value(input)?))
        } else if input.peek(kw::no_inst_fptrs) {
            input.parse::<kw::no_inst_fptrs>()?;
            Ok(Entry::NoInstFptrs)
        } else if input.peek(kw::hook_namespace) {
            input.parse::<kw::hook_namespace>()?;
            Ok(Entry::HookNamespace(parse_value(input)?))
        } else {
            Err(input.error("unknown lltap compilation_unit option"))
        }
    }
}

impl Parse for Config {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let entries =
            syn::punctuated::Punctuated::<Entry, syn::Token![,]>::parse_terminated(input)?;

        let mut policy = SelectionPolicy::default();
        let mut no_inst_fptrs = false;
        let mut hook_namespace = None;

        for entry in entries {
            match entry {
                Entry::InstFunc(lit) => {
                    policy.whitelist_names.insert(lit.value());
                }
                Entry::InstFuncsRe(lit) => {
                    let re = regex::Regex::new(&lit.value())
                        .map_err(|e| syn::Error::new(lit.span(), format!("invalid inst-funcs-re: {}", e)))?;
                    policy.whitelist_re = Some(re);
                }
                Entry::NoInstFunc(lit) => {
                    policy.blacklist_names.insert(lit.value());
                }
                Entry::NoInstFuncsRe(lit) => {
                    let re = regex::Regex::new(&lit.value()).map_err(|e| {
                        syn::Error::new(lit.span(), format!("invalid no-inst-funcs-re: {}", e))
                    })?;
                    policy.blacklist_re = Some(re);
                }
                Entry::InstMode(lit) => {
                    let mode = InstMode::parse(&lit.value()).ok_or_else(|| {
                        syn::Error::new(
                            lit.span(),
                            "inst-mode must be one of \"internal\", \"external\", \"both\"",
                        )
                    })?;
                    policy.mode = Some(mode);
                }
                Entry::NoInstFptrs => no_inst_fptrs = true,
                Entry::HookNamespace(lit) => hook_namespace = Some(lit.value()),
            }
        }

        Ok(Config {
            policy,
            no_inst_fptrs,
            hook_namespace,
        })
    }
}
