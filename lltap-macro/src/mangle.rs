//! Deterministic type-tuple mangling for variadic call-site trampoline
//! names, ported from `LLTap.cpp::mangleFunctionArgs`: render each
//! argument's printed type, then substitute `*` -> `p`, whitespace -> `_`,
//! and drop any other non-`[A-Za-z0-9_]` character, concatenating the
//! results in argument order.

/// Renders a single `syn::Type` the way the original renders an LLVM
/// `Type::print()` result, then applies the three substitutions.
pub fn mangle_type(ty: &syn::Type) -> String {
    let printed = quote::quote!(#ty).to_string();
    mangle_str(&printed)
}

fn mangle_str(printed: &str) -> String {
    let mut out = String::with_capacity(printed.len());
    for c in printed.chars() {
        if c == '*' {
            out.push('p');
        } else if c.is_whitespace() {
            out.push('_');
        } else if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        }
        // anything else (e.g. `<`, `>`, `::`, `&`) is deleted
    }
    out
}

/// Mangles an entire argument-type tuple, in order, the way
/// `createHookFunction`'s call-site overload builds its parameter list
/// before naming the trampoline after it.
pub fn mangle_types<'a>(tys: impl IntoIterator<Item = &'a syn::Type>) -> String {
    tys.into_iter().map(mangle_type).collect()
}
