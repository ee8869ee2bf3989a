//! A callee, as the pass sees it: a name, a concrete fixed-arity
//! signature, whether it is variadic, and whether it is merely declared
//! (`external`) or defined with a body (`internal`) in this compilation
//! unit. Mirrors the information the original LLVM pass reads off
//! `llvm::Function` (`isDeclaration()`, `isVarArg()`, `getFunctionType()`).

#[derive(Clone)]
pub struct Callee {
    pub ident: syn::Ident,
    pub inputs: Vec<syn::Type>,
    pub output: syn::ReturnType,
    pub variadic: bool,
    pub is_external: bool,
    pub is_intrinsic: bool,
}

impl Callee {
    pub fn name(&self) -> String {
        self.ident.to_string()
    }
}

/// Collects every function defined (`fn ... { .. }`) or declared
/// (`extern "C" { fn ...; }`) directly inside `items`, the way
/// `runOnModule` iterates `M.getFunctionList()`.
pub fn collect_callees(items: &[syn::Item]) -> syn::Result<Vec<Callee>> {
    let mut callees = Vec::new();

    for item in items {
        match item {
            syn::Item::Fn(item_fn) => {
                let is_intrinsic = item_fn
                    .attrs
                    .iter()
                    .any(|a| a.path.is_ident("lltap_intrinsic"));
                callees.push(Callee {
                    ident: item_fn.sig.ident.clone(),
                    inputs: inputs_of(&item_fn.sig.inputs)?,
                    output: item_fn.sig.output.clone(),
                    variadic: item_fn.sig.variadic.is_some(),
                    is_external: false,
                    is_intrinsic,
                });
            }
            syn::Item::ForeignMod(foreign) => {
                for fi in &foreign.items {
                    if let syn::ForeignItem::Fn(fi_fn) = fi {
                        let is_intrinsic = fi_fn
                            .attrs
                            .iter()
                            .any(|a| a.path.is_ident("lltap_intrinsic"));
                        callees.push(Callee {
                            ident: fi_fn.sig.ident.clone(),
                            inputs: inputs_of(&fi_fn.sig.inputs)?,
                            output: fi_fn.sig.output.clone(),
                            variadic: fi_fn.sig.variadic.is_some(),
                            is_external: true,
                            is_intrinsic,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    Ok(callees)
}

fn inputs_of(
    inputs: &syn::punctuated::Punctuated<syn::FnArg, syn::token::Comma>,
) -> syn::Result<Vec<syn::Type>> {
    inputs
        .iter()
        .map(|arg| match arg {
            syn::FnArg::Typed(pat_ty) => Ok((*pat_ty.ty).clone()),
            syn::FnArg::Receiver(r) => Err(syn::Error::new_spanned(
                r,
                "lltap cannot instrument methods with a `self` receiver",
            )),
        })
        .collect()
}
