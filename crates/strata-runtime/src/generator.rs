//! Class generation from the algorithm catalog

use std::collections::BTreeSet;

use strata_core::{ProxyType, SignatureMap, NAMESPACE_SEPARATOR};

use crate::client::Context;

/// Names never generated, even when the catalog would infer them
pub const RESERVED_CLASS_NAMES: &[&str] = &["List"];

/// Synthesizes proxy types for catalog types with no hand-written class
pub struct ClassGenerator;

impl ClassGenerator {
    /// Type names the catalog implies.
    ///
    /// A name qualifies when it is both the namespace of some algorithm
    /// and the (bare) return type of some algorithm, is not reserved, and
    /// is not already registered.
    pub fn inferable_names<F>(signatures: &SignatureMap, is_registered: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        let mut namespaces = BTreeSet::new();
        let mut return_types = BTreeSet::new();
        for (name, sig) in signatures {
            if let Some((prefix, _)) = name.split_once(NAMESPACE_SEPARATOR) {
                namespaces.insert(prefix);
            }
            return_types.insert(sig.bare_return_type());
        }
        for reserved in RESERVED_CLASS_NAMES {
            namespaces.remove(reserved);
        }

        namespaces
            .intersection(&return_types)
            .filter(|name| !is_registered(name))
            .map(|name| name.to_string())
            .collect()
    }

    /// Generate and register every inferable class; returns the new names
    pub(crate) fn run(ctx: &Context) -> Vec<String> {
        let signatures = ctx.functions.all_signatures();
        let names = {
            let types = ctx.types.read();
            Self::inferable_names(&signatures, |name| types.contains(name))
        };

        let mut generated = Vec::with_capacity(names.len());
        for name in names {
            let mut descriptor = ProxyType::generated(name.clone());
            ctx.functions.import_api(&mut descriptor, &name);
            if ctx.types.write().insert_generated(descriptor) {
                generated.push(name);
            }
        }

        ctx.refresh_classifier();
        generated
    }

    /// Remove every generated class; returns the removed names
    pub(crate) fn undo(ctx: &Context) -> Vec<String> {
        let names = ctx.types.write().take_generated_names();
        for name in &names {
            let removed = ctx.types.write().remove_generated(name);
            if let Some(mut descriptor) = removed {
                ctx.functions.clear_api(&mut descriptor);
            }
        }

        ctx.refresh_classifier();
        names
    }
}
