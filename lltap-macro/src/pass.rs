//! The instrumentation pass itself: walk every
//! function body in the annotated module, find direct calls and
//! function-pointer stores that target an eligible callee, rewrite them to
//! go through a synthesized trampoline, and collect the set of touched
//! callees so a registration constructor can be emitted for each one.
//!
//! The original pass operates on `llvm::Module`/`llvm::Function` at the IR
//! level, where every value already carries a concrete `llvm::Type`. A
//! `syn::visit_mut::VisitMut` walk over already-typed-in-source Rust ASTs
//! gives the same guarantee for everything except one case the IR doesn't
//! have to worry about: a call to a C-variadic callee, where the trailing
//! arguments' types only exist at the call site. We require those
//! arguments to be written as `expr as Type` so their type is still
//! syntactically available to the macro; an un-annotated variadic call is
//! left untouched, with a diagnostic warning explaining why.

use std::collections::{HashMap, HashSet};

use proc_macro2::Span;
use syn::visit_mut::{self, VisitMut};

use crate::callee::{collect_callees, Callee};
use crate::config::Config;
use crate::trampoline::{TrampolineKey, TrampolineSpec};

pub struct PassOutput {
    pub module: syn::ItemMod,
    pub trampolines: Vec<proc_macro2::TokenStream>,
    pub ctors: Vec<proc_macro2::TokenStream>,
    pub warnings: Vec<(Span, String)>,
}

pub fn run(lltap: syn::Path, config: Config, mut module: syn::ItemMod) -> syn::Result<PassOutput> {
    let items = match &module.content {
        Some((_, items)) => items.clone(),
        None => Vec::new(),
    };

    let callees = collect_callees(&items)?;
    let mut by_name: HashMap<String, Callee> = HashMap::new();
    let mut eligible: HashSet<String> = HashSet::new();
    for c in &callees {
        if config.policy.should_instrument(c) {
            eligible.insert(c.name());
        }
        by_name.insert(c.name(), c.clone());
    }

    let mut rewriter = Rewriter {
        lltap: lltap.clone(),
        by_name,
        eligible,
        no_inst_fptrs: config.no_inst_fptrs,
        trampolines: HashMap::new(),
        touched: HashSet::new(),
        warnings: Vec::new(),
    };

    if let Some((_, items)) = &mut module.content {
        for item in items.iter_mut() {
            rewriter.visit_item_mut(item);
        }
    }

    let trampolines = rewriter
        .trampolines
        .values()
        .map(|t| t.emit(&rewriter.lltap))
        .collect();

    let mut touched: Vec<&String> = rewriter.touched.iter().collect();
    touched.sort();
    let ctors = touched
        .into_iter()
        .map(|name| crate::ctor::emit_registration_ctor(&rewriter.lltap, name, &config.hook_namespace))
        .collect();

    Ok(PassOutput {
        module,
        trampolines,
        ctors,
        warnings: rewriter.warnings,
    })
}

struct Rewriter {
    lltap: syn::Path,
    by_name: HashMap<String, Callee>,
    eligible: HashSet<String>,
    no_inst_fptrs: bool,
    trampolines: HashMap<TrampolineKey, TrampolineSpec>,
    touched: HashSet<String>,
    warnings: Vec<(Span, String)>,
}

impl Rewriter {
    fn eligible_callee(&self, path: &syn::Path) -> Option<Callee> {
        let name = path.get_ident()?.to_string();
        if !self.eligible.contains(&name) {
            return None;
        }
        self.by_name.get(&name).cloned()
    }

    /// `expr as Type` -> `Type`; used to recover a variadic call site's
    /// trailing-argument types the way the IR pass reads them straight off
    /// typed `llvm::Value`s.
    fn cast_type(expr: &syn::Expr) -> Option<syn::Type> {
        match expr {
            syn::Expr::Cast(cast) => Some((*cast.ty).clone()),
            _ => None,
        }
    }

    fn trampoline_for_call(
        &mut self,
        callee: &Callee,
        args: &syn::punctuated::Punctuated<syn::Expr, syn::token::Comma>,
        span: Span,
    ) -> Option<syn::Ident> {
        if !callee.variadic {
            let key = TrampolineKey {
                callee: callee.name(),
                shape: None,
            };
            let spec = self
                .trampolines
                .entry(key)
                .or_insert_with(|| TrampolineSpec::for_callee(callee))
                .ident
                .clone();
            self.touched.insert(callee.name());
            return Some(spec);
        }

        let mut call_site_inputs = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            if i < callee.inputs.len() {
                call_site_inputs.push(callee.inputs[i].clone());
                continue;
            }
            match Self::cast_type(arg) {
                Some(ty) => call_site_inputs.push(ty),
                None => {
                    self.warnings.push((
                        span,
                        format!(
                            "call to variadic function `{}` left uninstrumented: \
                             trailing argument {} has no `as Type` annotation",
                            callee.name(),
                            i
                        ),
                    ));
                    return None;
                }
            }
        }

        let key = TrampolineKey {
            callee: callee.name(),
            shape: Some(crate::mangle::mangle_types(&call_site_inputs)),
        };
        let ident = self
            .trampolines
            .entry(key)
            .or_insert_with(|| TrampolineSpec::for_call_site(callee, call_site_inputs))
            .ident
            .clone();
        self.touched.insert(callee.name());
        Some(ident)
    }
}

impl VisitMut for Rewriter {
    fn visit_expr_mut(&mut self, expr: &mut syn::Expr) {
        match expr {
            syn::Expr::Call(call) => {
                if let syn::Expr::Path(p) = &*call.func {
                    if let Some(callee) = self.eligible_callee(&p.path) {
                        let span = syn::spanned::Spanned::span(&*call.func);
                        if let Some(ident) =
                            self.trampoline_for_call(&callee, &call.args, span)
                        {
                            *call.func = syn::Expr::Path(syn::ExprPath {
                                attrs: vec![],
                                qself: None,
                                path: syn::Path::from(ident),
                            });
                        }
                    }
                }
                for arg in call.args.iter_mut() {
                    self.visit_expr_mut(arg);
                }
                return;
            }
            syn::Expr::Path(p) => {
                if !self.no_inst_fptrs {
                    if let Some(callee) = self.eligible_callee(&p.path) {
                        if callee.variadic {
                            self.warnings.push((
                                syn::spanned::Spanned::span(&*p),
                                format!(
                                    "function pointer store of variadic function `{}` left \
                                     unchanged: no single trampoline shape applies",
                                    callee.name()
                                ),
                            ));
                        } else {
                            let key = TrampolineKey {
                                callee: callee.name(),
                                shape: None,
                            };
                            let ident = self
                                .trampolines
                                .entry(key)
                                .or_insert_with(|| TrampolineSpec::for_callee(&callee))
                                .ident
                                .clone();
                            self.touched.insert(callee.name());
                            p.path = syn::Path::from(ident);
                        }
                    }
                }
                return;
            }
            _ => {}
        }
        visit_mut::visit_expr_mut(self, expr);
    }
}
