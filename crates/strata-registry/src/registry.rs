//! Function registry contract

use std::collections::BTreeMap;

use strata_core::{Expression, ProxyType, Signature, SignatureMap, StrataResult, Value};

/// Completion of an asynchronous signature load
pub type LoadCallback = Box<dyn FnOnce(StrataResult<()>) + Send + 'static>;

/// Catalog of server-side algorithms
///
/// Supplies signatures, builds call expressions, and binds algorithms
/// onto proxy types.
pub trait FunctionRegistry: Send + Sync {
    /// Load (or reload) the catalog inline
    fn load_signatures(&self) -> StrataResult<()>;

    /// Load (or reload) the catalog; `done` runs once the load resolves
    fn load_signatures_async(&self, done: LoadCallback);

    /// Drop the catalog and all bindings
    fn reset(&self);

    /// Every known signature
    fn all_signatures(&self) -> SignatureMap;

    /// Signatures not bound onto any proxy type
    fn unbound_signatures(&self) -> SignatureMap;

    /// Look up one signature
    fn signature(&self, name: &str) -> Option<Signature>;

    /// Build a call expression from positional arguments
    fn build_call(&self, name: &str, args: Vec<Value>) -> StrataResult<Expression>;

    /// Build a call expression from named arguments
    fn build_call_named(&self, name: &str, args: BTreeMap<String, Value>)
        -> StrataResult<Expression>;

    /// Bind every `prefix.member` algorithm onto `target`
    fn import_api(&self, target: &mut ProxyType, prefix: &str);

    /// Remove every binding from `target`
    fn clear_api(&self, target: &mut ProxyType);
}
