//! Type classification: "is this value already of type X?"

use std::collections::BTreeSet;

use strata_core::{is_subtype, Value};

/// Answers instance checks against the currently registered types
///
/// The classifier only matches names it has been told about, so a
/// check against a type removed on reset fails even if a stale proxy of
/// that type is still around.
#[derive(Clone, Debug, Default)]
pub struct TypeClassifier {
    known: BTreeSet<String>,
}

impl TypeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of registered type names
    pub fn register_classes<I>(&mut self, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.known = names.into_iter().collect();
    }

    pub fn is_known(&self, type_name: &str) -> bool {
        self.known.contains(type_name)
    }

    /// Is `value` a proxy of `type_name` or one of its subtypes?
    pub fn is_instance(&self, value: &Value, type_name: &str) -> bool {
        if !self.is_known(type_name) {
            return false;
        }
        match value.as_proxy() {
            Some(proxy) => is_subtype(type_name, proxy.type_name()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{Expression, Proxy, ProxyKind};

    fn image() -> Value {
        Proxy::hand_written(ProxyKind::Image, Expression::constant(Value::Number(1.0))).into()
    }

    #[test]
    fn test_instance_checks() {
        let mut classifier = TypeClassifier::new();
        classifier.register_classes(["Image", "Element", "Reducer"].map(String::from));

        assert!(classifier.is_instance(&image(), "Image"));
        assert!(classifier.is_instance(&image(), "Element"));
        assert!(!classifier.is_instance(&image(), "Reducer"));
        assert!(!classifier.is_instance(&Value::Number(1.0), "Image"));
    }

    #[test]
    fn test_unknown_types_never_match() {
        let reducer: Value = Proxy::generated("Reducer", Expression::constant(Value::Null)).into();
        let mut classifier = TypeClassifier::new();
        classifier.register_classes(vec!["Reducer".to_string()]);
        assert!(classifier.is_instance(&reducer, "Reducer"));

        classifier.register_classes(Vec::new());
        assert!(!classifier.is_instance(&reducer, "Reducer"));
    }
}
