//! Registry of hand-written and generated proxy types

use std::collections::BTreeMap;

use strata_core::ProxyType;

/// Every proxy type a client currently knows
///
/// Hand-written descriptors live for the life of the client; generated
/// descriptors come and go with bootstrap and reset. A generated entry
/// never shadows a hand-written one.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    hand_written: BTreeMap<String, ProxyType>,
    generated: BTreeMap<String, ProxyType>,
    /// Generation order, replayed on teardown
    generated_names: Vec<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a hand-written descriptor
    pub fn register_hand_written(&mut self, descriptor: ProxyType) {
        self.hand_written
            .insert(descriptor.name().to_string(), descriptor);
    }

    /// Register a generated descriptor. Fails if the name is taken.
    pub fn insert_generated(&mut self, descriptor: ProxyType) -> bool {
        let name = descriptor.name().to_string();
        if self.contains(&name) {
            return false;
        }
        self.generated_names.push(name.clone());
        self.generated.insert(name, descriptor);
        true
    }

    pub fn remove_generated(&mut self, name: &str) -> Option<ProxyType> {
        self.generated_names.retain(|n| n != name);
        self.generated.remove(name)
    }

    /// Take the generation-ordered names, leaving the list empty
    pub fn take_generated_names(&mut self) -> Vec<String> {
        std::mem::take(&mut self.generated_names)
    }

    pub fn generated_names(&self) -> &[String] {
        &self.generated_names
    }

    pub fn get(&self, name: &str) -> Option<&ProxyType> {
        self.hand_written
            .get(name)
            .or_else(|| self.generated.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_generated(&self, name: &str) -> bool {
        self.generated.contains_key(name)
    }

    /// Every registered type name
    pub fn names(&self) -> Vec<String> {
        self.hand_written
            .keys()
            .chain(self.generated.keys())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.hand_written.len() + self.generated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
