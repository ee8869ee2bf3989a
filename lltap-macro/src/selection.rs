//! The callee selection policy: whitelist/blacklist by exact name or
//! regex, an `inst-mode` restriction to internal/external/both, and the
//! two unconditional exclusions (`lltap`-named functions, compiler-
//! intrinsic pseudo-functions).

use std::collections::HashSet;

use regex::Regex;

use crate::callee::Callee;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InstMode {
    Internal,
    External,
    Both,
}

impl InstMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "internal" => Some(InstMode::Internal),
            "external" => Some(InstMode::External),
            "both" => Some(InstMode::Both),
            _ => None,
        }
    }

    fn fits(self, is_external: bool) -> bool {
        match self {
            InstMode::Internal => !is_external,
            InstMode::External => is_external,
            InstMode::Both => true,
        }
    }
}

#[derive(Default)]
pub struct SelectionPolicy {
    pub whitelist_names: HashSet<String>,
    pub whitelist_re: Option<Regex>,
    pub blacklist_names: HashSet<String>,
    pub blacklist_re: Option<Regex>,
    pub mode: Option<InstMode>,
}

impl SelectionPolicy {
    /// Mirrors `LLTap::InstrumentationPass::shouldBeInstrumented` exactly:
    /// unconditional exclusions first, then whitelist (if configured),
    /// then blacklist override, then the `inst-mode` restriction.
    pub fn should_instrument(&self, callee: &Callee) -> bool {
        let name = callee.name();

        if name.contains("lltap") {
            return false;
        }
        if callee.is_intrinsic {
            return false;
        }

        let mode = self.mode.unwrap_or(InstMode::Both);
        let mode_fits = mode.fits(callee.is_external);

        let has_whitelist = !self.whitelist_names.is_empty() || self.whitelist_re.is_some();
        let mut should = if has_whitelist {
            self.whitelist_names.contains(&name)
                || self
                    .whitelist_re
                    .as_ref()
                    .map_or(false, |re| re.is_match(&name))
        } else {
            true
        };

        if !self.blacklist_names.is_empty() && self.blacklist_names.contains(&name) {
            should = false;
        }
        if let Some(re) = &self.blacklist_re {
            if re.is_match(&name) {
                should = false;
            }
        }

        should && mode_fits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callee(name: &str, is_external: bool) -> Callee {
        Callee {
            ident: syn::Ident::new(name, proc_macro2::Span::call_site()),
            inputs: vec![],
            output: syn::ReturnType::Default,
            variadic: false,
            is_external,
            is_intrinsic: false,
        }
    }

    #[test]
    fn lltap_named_functions_are_always_excluded() {
        let policy = SelectionPolicy::default();
        assert!(!policy.should_instrument(&callee("__lltap_hook_foo", false)));
    }

    #[test]
    fn intrinsics_are_always_excluded() {
        let policy = SelectionPolicy::default();
        let mut c = callee("foo", false);
        c.is_intrinsic = true;
        assert!(!policy.should_instrument(&c));
    }

    #[test]
    fn no_lists_configured_instruments_everything() {
        let policy = SelectionPolicy::default();
        assert!(policy.should_instrument(&callee("anything", false)));
    }

    #[test]
    fn whitelist_restricts_to_named_functions() {
        let mut policy = SelectionPolicy::default();
        policy.whitelist_names.insert("keep_me".to_owned());
        assert!(policy.should_instrument(&callee("keep_me", false)));
        assert!(!policy.should_instrument(&callee("drop_me", false)));
    }

    #[test]
    fn blacklist_overrides_whitelist() {
        let mut policy = SelectionPolicy::default();
        policy.whitelist_names.insert("foo".to_owned());
        policy.blacklist_names.insert("foo".to_owned());
        assert!(!policy.should_instrument(&callee("foo", false)));
    }

    #[test]
    fn inst_mode_internal_excludes_declarations() {
        let mut policy = SelectionPolicy::default();
        policy.mode = Some(InstMode::Internal);
        assert!(policy.should_instrument(&callee("defined_here", false)));
        assert!(!policy.should_instrument(&callee("declared_only", true)));
    }

    #[test]
    fn inst_mode_external_excludes_definitions() {
        let mut policy = SelectionPolicy::default();
        policy.mode = Some(InstMode::External);
        assert!(!policy.should_instrument(&callee("defined_here", false)));
        assert!(policy.should_instrument(&callee("declared_only", true)));
    }

    #[test]
    fn regex_whitelist_matches_by_pattern() {
        let mut policy = SelectionPolicy::default();
        policy.whitelist_re = Some(Regex::new("^lib_.*").unwrap());
        assert!(policy.should_instrument(&callee("lib_init", false)));
        assert!(!policy.should_instrument(&callee("other", false)));
    }
}
