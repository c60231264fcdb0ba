//! Algorithm signatures and the catalog wire format

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::{StrataError, StrataResult};

/// Separator between a namespace and a member in algorithm names
pub const NAMESPACE_SEPARATOR: char = '.';

/// Signatures keyed by algorithm name
pub type SignatureMap = BTreeMap<String, Signature>;

/// Declared argument of an algorithm
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ArgumentDecl {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        ArgumentDecl {
            name: name.into(),
            type_name: type_name.into(),
            optional: false,
            description: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Server-declared signature of one algorithm
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Dotted algorithm name; filled from the catalog key
    #[serde(default)]
    pub name: String,
    /// Declared return type, possibly parametric (`Reducer<Object>`)
    pub returns: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub args: Vec<ArgumentDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

impl Signature {
    pub fn new(name: impl Into<String>, returns: impl Into<String>) -> Self {
        Signature {
            name: name.into(),
            returns: returns.into(),
            hidden: false,
            args: Vec::new(),
            description: None,
            deprecated: None,
        }
    }

    /// Append an argument declaration
    pub fn with_arg(mut self, arg: ArgumentDecl) -> Self {
        self.args.push(arg);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Return type without any parametric suffix
    pub fn bare_return_type(&self) -> &str {
        strip_parametric(&self.returns)
    }

    /// Text before the first separator, if the name is namespaced
    pub fn namespace(&self) -> Option<&str> {
        self.name
            .split_once(NAMESPACE_SEPARATOR)
            .map(|(prefix, _)| prefix)
    }

    /// Dotted name split into path segments
    pub fn path(&self) -> impl Iterator<Item = &str> {
        self.name.split(NAMESPACE_SEPARATOR)
    }

    /// Human-readable description derived from the signature
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "{}(", self.name);
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}: {}", arg.name, arg.type_name);
            if arg.optional {
                out.push('?');
            }
        }
        let _ = write!(out, ") -> {}", self.returns);

        if let Some(description) = &self.description {
            let _ = write!(out, "\n\n{}", description);
        }
        if !self.args.is_empty() {
            out.push_str("\n\nArgs:");
            for arg in &self.args {
                let _ = write!(out, "\n  {} ({}", arg.name, arg.type_name);
                if arg.optional {
                    out.push_str(", optional");
                }
                out.push(')');
                if let Some(description) = &arg.description {
                    let _ = write!(out, ": {}", description);
                }
            }
        }
        if let Some(note) = &self.deprecated {
            let _ = write!(out, "\n\nDEPRECATED: {}", note);
        }
        out
    }
}

/// Strip a parametric suffix: `Reducer<Object>` -> `Reducer`
pub fn strip_parametric(type_name: &str) -> &str {
    match type_name.find('<') {
        Some(idx) => &type_name[..idx],
        None => type_name,
    }
}

#[derive(Deserialize)]
struct CatalogEnvelope {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<EnvelopeError>,
}

#[derive(Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    message: String,
}

/// Is `root` a `data`/`error` envelope rather than a bare catalog?
///
/// Only `data` and `error` keys may be present, and a `data` value that is
/// itself a signature means an algorithm named `data`.
fn is_envelope(root: &serde_json::Value) -> bool {
    let Some(object) = root.as_object() else {
        return false;
    };
    if object.is_empty() || object.keys().any(|key| key != "data" && key != "error") {
        return false;
    }
    let is_signature =
        |value: &serde_json::Value| value.get("returns").map_or(false, |r| r.is_string());
    match object.get("data") {
        Some(data) => !is_signature(data),
        None => object.get("error").map_or(false, |error| !is_signature(error)),
    }
}

/// Parse a catalog document.
///
/// Accepts either a bare `name -> signature` object or one wrapped as
/// `{"data": {...}}`. An `{"error": {"message": ...}}` envelope is
/// reported as a load failure.
pub fn parse_catalog(json: &str) -> StrataResult<SignatureMap> {
    let root: serde_json::Value =
        serde_json::from_str(json).map_err(|e| StrataError::InvalidCatalog(e.to_string()))?;

    let body = if is_envelope(&root) {
        let envelope: CatalogEnvelope = serde_json::from_value(root)
            .map_err(|e| StrataError::InvalidCatalog(e.to_string()))?;
        if let Some(err) = envelope.error {
            return Err(StrataError::LoadFailure(err.message));
        }
        envelope
            .data
            .ok_or_else(|| StrataError::InvalidCatalog("missing data".into()))?
    } else {
        root
    };

    let raw: BTreeMap<String, Signature> =
        serde_json::from_value(body).map_err(|e| StrataError::InvalidCatalog(e.to_string()))?;

    Ok(raw
        .into_iter()
        .map(|(name, mut sig)| {
            sig.name = name.clone();
            (name, sig)
        })
        .collect())
}
