//! Namespace of algorithms no proxy type claims

use std::collections::BTreeMap;

use parking_lot::RwLock;

use strata_core::{Signature, StrataResult, Value, NAMESPACE_SEPARATOR};
use strata_registry::FunctionRegistry;

use crate::Client;

/// An algorithm attached to the namespace
#[derive(Clone, Debug, PartialEq)]
pub struct BoundAlgorithm {
    pub name: String,
    pub signature: Signature,
    /// Human-readable description
    pub description: String,
}

impl BoundAlgorithm {
    /// Invoke with positional arguments
    pub fn invoke(&self, client: &Client, args: Vec<Value>) -> StrataResult<Value> {
        client.call(&self.name, args)
    }

    /// Invoke with named arguments
    pub fn apply(&self, client: &Client, args: BTreeMap<String, Value>) -> StrataResult<Value> {
        client.apply(&self.name, args)
    }
}

/// A node of the namespace tree
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NamespaceNode {
    algorithm: Option<BoundAlgorithm>,
    children: BTreeMap<String, NamespaceNode>,
}

impl NamespaceNode {
    /// Plain namespace marker with no algorithm of its own
    pub fn is_namespace(&self) -> bool {
        self.algorithm.is_none()
    }

    pub fn algorithm(&self) -> Option<&BoundAlgorithm> {
        self.algorithm.as_ref()
    }

    pub fn child(&self, segment: &str) -> Option<&NamespaceNode> {
        self.children.get(segment)
    }

    pub fn children(&self) -> impl Iterator<Item = (&String, &NamespaceNode)> {
        self.children.iter()
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for (segment, node) in &self.children {
            let path = if prefix.is_empty() {
                segment.clone()
            } else {
                format!("{}{}{}", prefix, NAMESPACE_SEPARATOR, segment)
            };
            if node.algorithm.is_some() {
                out.push(path.clone());
            }
            node.collect_paths(&path, out);
        }
    }
}

/// Shared tree of unbound algorithms
///
/// One instance lives for the life of a client; reset clears it in place
/// so every holder of the `Arc` sees the teardown.
#[derive(Debug, Default)]
pub struct AlgorithmsNamespace {
    root: RwLock<NamespaceNode>,
}

impl AlgorithmsNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an algorithm at its dotted path, creating namespace nodes
    pub fn insert(&self, algorithm: BoundAlgorithm) {
        let mut root = self.root.write();
        let mut node = &mut *root;
        for segment in algorithm.name.split(NAMESPACE_SEPARATOR) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.algorithm = Some(algorithm);
    }

    /// Node at a dotted path
    pub fn get(&self, path: &str) -> Option<NamespaceNode> {
        let root = self.root.read();
        let mut node = &*root;
        for segment in path.split(NAMESPACE_SEPARATOR) {
            node = node.children.get(segment)?;
        }
        Some(node.clone())
    }

    /// Algorithm at a dotted path
    pub fn algorithm(&self, path: &str) -> Option<BoundAlgorithm> {
        self.get(path).and_then(|node| node.algorithm)
    }

    /// Dotted paths of every attached algorithm
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.root.read().collect_paths("", &mut out);
        out
    }

    pub fn len(&self) -> usize {
        self.paths().len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.read().children.is_empty()
    }

    pub fn clear(&self) {
        self.root.write().children.clear();
    }
}

/// Attaches unbound catalog algorithms to the namespace
pub struct UnboundMethodBinder;

impl UnboundMethodBinder {
    /// Bind every visible unbound algorithm; returns how many were bound
    pub fn run(functions: &dyn FunctionRegistry, namespace: &AlgorithmsNamespace) -> usize {
        let mut bound = 0;
        for (name, signature) in functions.unbound_signatures() {
            if signature.hidden {
                continue;
            }
            namespace.insert(BoundAlgorithm {
                description: signature.describe(),
                name,
                signature,
            });
            bound += 1;
        }
        bound
    }
}
