//! In-memory catalog backed by a signature source

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;

use strata_core::{
    is_subtype, BoundMember, Expression, MemberKind, ProxyType, Signature, SignatureMap,
    StrataError, StrataResult, Value, NAMESPACE_SEPARATOR,
};

use crate::{FunctionRegistry, LoadCallback, SignatureSource};

/// Load counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub sync_loads: u64,
    pub async_loads: u64,
    pub failed_loads: u64,
}

#[derive(Debug, Default)]
struct CatalogState {
    /// Signatures indexed by algorithm name
    signatures: SignatureMap,
    /// Names bound onto some proxy type
    bound: BTreeSet<String>,
    loaded: bool,
    stats: CatalogStats,
}

impl CatalogState {
    fn install(&mut self, signatures: SignatureMap) {
        tracing::debug!(algorithms = signatures.len(), "catalog installed");
        // Bindings made under an earlier load stay recorded; reset clears them.
        self.signatures = signatures;
        self.loaded = true;
    }
}

/// Function registry over a signature source
pub struct Catalog {
    source: Arc<dyn SignatureSource>,
    state: Arc<RwLock<CatalogState>>,
}

impl Catalog {
    pub fn new(source: impl SignatureSource + 'static) -> Self {
        Self::from_source(Arc::new(source))
    }

    pub fn from_source(source: Arc<dyn SignatureSource>) -> Self {
        Catalog {
            source,
            state: Arc::new(RwLock::new(CatalogState::default())),
        }
    }

    /// Has a load succeeded since creation or the last reset?
    pub fn is_loaded(&self) -> bool {
        self.state.read().loaded
    }

    /// Number of known signatures
    pub fn len(&self) -> usize {
        self.state.read().signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().signatures.is_empty()
    }

    /// Is the algorithm bound onto a proxy type?
    pub fn is_bound(&self, name: &str) -> bool {
        self.state.read().bound.contains(name)
    }

    pub fn stats(&self) -> CatalogStats {
        self.state.read().stats.clone()
    }

    fn lookup(&self, name: &str) -> StrataResult<Signature> {
        self.signature(name)
            .ok_or_else(|| StrataError::UnknownFunction(name.to_string()))
    }
}

/// Every required argument must be present
fn check_required(sig: &Signature, named: &BTreeMap<String, Value>) -> StrataResult<()> {
    match sig
        .args
        .iter()
        .find(|decl| !decl.optional && !named.contains_key(&decl.name))
    {
        Some(missing) => Err(StrataError::InvalidArgument(format!(
            "Required argument ({}) missing to function: {}",
            missing.name, sig.name
        ))),
        None => Ok(()),
    }
}

impl FunctionRegistry for Catalog {
    fn load_signatures(&self) -> StrataResult<()> {
        self.state.write().stats.sync_loads += 1;
        match self.source.fetch() {
            Ok(signatures) => {
                self.state.write().install(signatures);
                Ok(())
            }
            Err(e) => {
                self.state.write().stats.failed_loads += 1;
                Err(e)
            }
        }
    }

    fn load_signatures_async(&self, done: LoadCallback) {
        self.state.write().stats.async_loads += 1;

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("async signature load requested outside a tokio runtime");
                self.state.write().stats.failed_loads += 1;
                done(Err(StrataError::LoadFailure(
                    "no async runtime available".into(),
                )));
                return;
            }
        };

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        handle.spawn(async move {
            let fetched = match tokio::task::spawn_blocking(move || source.fetch()).await {
                Ok(result) => result,
                Err(e) => Err(StrataError::LoadFailure(e.to_string())),
            };
            let outcome = match fetched {
                Ok(signatures) => {
                    state.write().install(signatures);
                    Ok(())
                }
                Err(e) => {
                    state.write().stats.failed_loads += 1;
                    Err(e)
                }
            };
            done(outcome);
        });
    }

    fn reset(&self) {
        let mut state = self.state.write();
        state.signatures.clear();
        state.bound.clear();
        state.loaded = false;
    }

    fn all_signatures(&self) -> SignatureMap {
        self.state.read().signatures.clone()
    }

    fn unbound_signatures(&self) -> SignatureMap {
        let state = self.state.read();
        state
            .signatures
            .iter()
            .filter(|(name, _)| !state.bound.contains(*name))
            .map(|(name, sig)| (name.clone(), sig.clone()))
            .collect()
    }

    fn signature(&self, name: &str) -> Option<Signature> {
        self.state.read().signatures.get(name).cloned()
    }

    fn build_call(&self, name: &str, args: Vec<Value>) -> StrataResult<Expression> {
        let sig = self.lookup(name)?;
        if args.len() > sig.args.len() {
            return Err(StrataError::InvalidArgument(format!(
                "Too many ({}) arguments to function: {}",
                args.len(),
                name
            )));
        }

        let named: BTreeMap<String, Value> = sig
            .args
            .iter()
            .zip(args)
            .filter(|(_, value)| !value.is_undefined())
            .map(|(decl, value)| (decl.name.clone(), value))
            .collect();

        check_required(&sig, &named)?;
        Ok(Expression::call(name, named))
    }

    fn build_call_named(
        &self,
        name: &str,
        args: BTreeMap<String, Value>,
    ) -> StrataResult<Expression> {
        let sig = self.lookup(name)?;

        let unknown: Vec<&str> = args
            .keys()
            .filter(|key| !sig.args.iter().any(|decl| &decl.name == *key))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(StrataError::InvalidArgument(format!(
                "Unrecognized arguments ({}) to function: {}",
                unknown.join(", "),
                name
            )));
        }

        let named: BTreeMap<String, Value> = args
            .into_iter()
            .filter(|(_, value)| !value.is_undefined())
            .collect();

        check_required(&sig, &named)?;
        Ok(Expression::call(name, named))
    }

    fn import_api(&self, target: &mut ProxyType, prefix: &str) {
        let mut state = self.state.write();
        let CatalogState {
            signatures, bound, ..
        } = &mut *state;

        let mut imported = 0usize;
        for (name, sig) in signatures.iter() {
            let Some((namespace, member)) = name.split_once(NAMESPACE_SEPARATOR) else {
                continue;
            };
            if namespace != prefix || member.contains(NAMESPACE_SEPARATOR) {
                continue;
            }

            let receiver = match sig.args.first() {
                Some(first) if is_subtype(&first.type_name, target.name()) => MemberKind::Instance,
                _ => MemberKind::Static,
            };

            bound.insert(name.clone());
            let fresh = target.bind(
                member,
                BoundMember {
                    algorithm: name.clone(),
                    signature: sig.clone(),
                    receiver,
                },
            );
            if fresh {
                imported += 1;
            }
        }

        tracing::debug!(target = target.name(), prefix, imported, "api imported");
    }

    fn clear_api(&self, target: &mut ProxyType) {
        let released = target.unbind_all();
        let mut state = self.state.write();
        for name in released {
            state.bound.remove(&name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticSource;
    use strata_core::{ArgumentDecl, ProxyKind};

    fn catalog() -> Catalog {
        let mut signatures = SignatureMap::new();
        for sig in [
            Signature::new("Image.add", "Image")
                .with_arg(ArgumentDecl::new("image1", "Image"))
                .with_arg(ArgumentDecl::new("image2", "Image")),
            Signature::new("Image.load", "Image")
                .with_arg(ArgumentDecl::new("id", "String"))
                .with_arg(ArgumentDecl::new("version", "Long").optional()),
            Signature::new("Element.set", "Element")
                .with_arg(ArgumentDecl::new("object", "Element"))
                .with_arg(ArgumentDecl::new("key", "String")),
            Signature::new("Image.Pixel.area", "Image"),
            Signature::new("Landsat.simpleComposite", "Image")
                .with_arg(ArgumentDecl::new("collection", "ImageCollection")),
        ] {
            signatures.insert(sig.name.clone(), sig);
        }
        Catalog::new(StaticSource::new(signatures))
    }

    #[test]
    fn test_sync_load() {
        let catalog = catalog();
        assert!(!catalog.is_loaded());

        catalog.load_signatures().unwrap();
        assert!(catalog.is_loaded());
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.stats().sync_loads, 1);

        catalog.reset();
        assert!(catalog.is_empty());
        assert!(!catalog.is_loaded());
    }

    #[test]
    fn test_build_call_maps_positional_args() {
        let catalog = catalog();
        catalog.load_signatures().unwrap();

        let expr = catalog
            .build_call("Image.load", vec![Value::from("srtm"), Value::Undefined])
            .unwrap();
        assert!(expr.is_call_to("Image.load"));
        let args = expr.args().unwrap();
        assert_eq!(args.get("id"), Some(&Value::from("srtm")));
        assert!(!args.contains_key("version"));
    }

    #[test]
    fn test_build_call_errors() {
        let catalog = catalog();
        catalog.load_signatures().unwrap();

        assert!(matches!(
            catalog.build_call("Image.nope", vec![]),
            Err(StrataError::UnknownFunction(_))
        ));
        assert!(matches!(
            catalog.build_call("Image.load", vec![Value::from("a"), 1.0.into(), 2.0.into()]),
            Err(StrataError::InvalidArgument(msg)) if msg.contains("Too many (3)")
        ));
        assert!(matches!(
            catalog.build_call("Image.add", vec![Value::Null]),
            Err(StrataError::InvalidArgument(msg)) if msg.contains("(image2)")
        ));

        let mut named = BTreeMap::new();
        named.insert("id".to_string(), Value::from("srtm"));
        named.insert("bogus".to_string(), Value::Null);
        assert!(matches!(
            catalog.build_call_named("Image.load", named),
            Err(StrataError::InvalidArgument(msg)) if msg.contains("bogus")
        ));
    }

    #[test]
    fn test_import_api_classifies_receivers() {
        let catalog = catalog();
        catalog.load_signatures().unwrap();

        let mut image = ProxyType::hand_written(ProxyKind::Image);
        catalog.import_api(&mut image, "Image");

        assert_eq!(image.member("add").unwrap().receiver, MemberKind::Instance);
        assert_eq!(image.member("load").unwrap().receiver, MemberKind::Static);
        // Three-segment names are not bound onto the type.
        assert!(image.member("Pixel").is_none());
        assert!(catalog.is_bound("Image.add"));

        let mut element = ProxyType::hand_written(ProxyKind::Element);
        catalog.import_api(&mut element, "Element");
        assert_eq!(element.member("set").unwrap().receiver, MemberKind::Instance);

        let unbound = catalog.unbound_signatures();
        assert!(unbound.contains_key("Landsat.simpleComposite"));
        assert!(unbound.contains_key("Image.Pixel.area"));
        assert!(!unbound.contains_key("Image.load"));

        catalog.clear_api(&mut image);
        assert_eq!(image.member_count(), 0);
        assert!(!catalog.is_bound("Image.add"));
        assert!(catalog.unbound_signatures().contains_key("Image.add"));
    }

    #[test]
    fn test_async_load_without_runtime_fails() {
        let catalog = catalog();
        let (tx, rx) = std::sync::mpsc::channel();
        catalog.load_signatures_async(Box::new(move |result| {
            let _ = tx.send(result);
        }));

        let result = rx.recv().unwrap();
        assert!(matches!(result, Err(StrataError::LoadFailure(_))));
        assert_eq!(catalog.stats().failed_loads, 1);
    }

    #[tokio::test]
    async fn test_async_load_on_runtime() {
        let catalog = catalog();
        let (tx, rx) = tokio::sync::oneshot::channel();
        catalog.load_signatures_async(Box::new(move |result| {
            let _ = tx.send(result);
        }));

        // Nothing resolves before the spawned task runs.
        assert!(!catalog.is_loaded());
        rx.await.unwrap().unwrap();
        assert!(catalog.is_loaded());
        assert_eq!(catalog.stats().async_loads, 1);
    }
}
