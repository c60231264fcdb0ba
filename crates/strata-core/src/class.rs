//! Proxy capability tags and proxy type descriptors
//!
//! Every proxy value carries a capability tag instead of relying on
//! structural type identity:
//! - Element kinds: Element, Image, Feature
//! - Collection kinds: Collection, ImageCollection, FeatureCollection
//! - Value kinds: Geometry, Filter, Number, String, Date, Dictionary, List
//! - Generated: synthesized from the catalog, identified by type name

use std::collections::BTreeMap;

use crate::{Expression, Signature};

/// Capability tag of a proxy value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProxyKind {
    Element,
    Image,
    ImageCollection,
    Feature,
    FeatureCollection,
    Collection,
    Geometry,
    Filter,
    Number,
    String,
    Date,
    Dictionary,
    List,
    /// Synthesized from the algorithm catalog
    Generated,
}

impl ProxyKind {
    /// Every hand-written kind
    pub const HAND_WRITTEN: [ProxyKind; 13] = [
        ProxyKind::Element,
        ProxyKind::Image,
        ProxyKind::ImageCollection,
        ProxyKind::Feature,
        ProxyKind::FeatureCollection,
        ProxyKind::Collection,
        ProxyKind::Geometry,
        ProxyKind::Filter,
        ProxyKind::Number,
        ProxyKind::String,
        ProxyKind::Date,
        ProxyKind::Dictionary,
        ProxyKind::List,
    ];

    /// Parse a hand-written type name
    pub fn from_type_name(name: &str) -> Option<Self> {
        ProxyKind::HAND_WRITTEN
            .into_iter()
            .find(|kind| kind.type_name() == name)
    }

    /// Type name the catalog uses for this kind
    pub fn type_name(self) -> &'static str {
        match self {
            ProxyKind::Element => "Element",
            ProxyKind::Image => "Image",
            ProxyKind::ImageCollection => "ImageCollection",
            ProxyKind::Feature => "Feature",
            ProxyKind::FeatureCollection => "FeatureCollection",
            ProxyKind::Collection => "Collection",
            ProxyKind::Geometry => "Geometry",
            ProxyKind::Filter => "Filter",
            ProxyKind::Number => "Number",
            ProxyKind::String => "String",
            ProxyKind::Date => "Date",
            ProxyKind::Dictionary => "Dictionary",
            ProxyKind::List => "List",
            ProxyKind::Generated => "Generated",
        }
    }

    /// Can values of this kind be treated as a collection?
    pub fn is_collection(self) -> bool {
        matches!(
            self,
            ProxyKind::Collection | ProxyKind::ImageCollection | ProxyKind::FeatureCollection
        )
    }

    /// Can values of this kind be treated as a collection element?
    pub fn is_element(self) -> bool {
        matches!(
            self,
            ProxyKind::Element | ProxyKind::Image | ProxyKind::Feature
        )
    }
}

/// Is `child` the same type as, or a subtype of, `parent`?
///
/// Only the element and collection families have subtypes. `Object`
/// is never a supertype.
pub fn is_subtype(parent: &str, child: &str) -> bool {
    if parent == child {
        return true;
    }
    match parent {
        "Element" | "EEObject" => matches!(child, "Element" | "Image" | "Feature"),
        "Collection" | "EECollection" => {
            matches!(child, "Collection" | "ImageCollection" | "FeatureCollection")
        }
        _ => false,
    }
}

/// A computed expression typed as a proxy
#[derive(Clone, Debug, PartialEq)]
pub struct Proxy {
    type_name: String,
    kind: ProxyKind,
    expression: Expression,
}

impl Proxy {
    /// Wrap an expression as a hand-written kind
    pub fn hand_written(kind: ProxyKind, expression: Expression) -> Self {
        Proxy {
            type_name: kind.type_name().to_string(),
            kind,
            expression,
        }
    }

    /// Wrap an expression as a generated type
    pub fn generated(type_name: impl Into<String>, expression: Expression) -> Self {
        Proxy {
            type_name: type_name.into(),
            kind: ProxyKind::Generated,
            expression,
        }
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Capability tag
    #[inline]
    pub fn kind(&self) -> ProxyKind {
        self.kind
    }

    #[inline]
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn into_expression(self) -> Expression {
        self.expression
    }

    #[inline]
    pub fn is_collection(&self) -> bool {
        self.kind.is_collection()
    }
}

/// How a type came to exist
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeOrigin {
    /// Hand-written client type with its own construction rules
    HandWritten(ProxyKind),
    /// Synthesized from the catalog
    Generated,
}

/// Whether a bound member takes the value as its receiver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    /// First argument is the receiver
    Instance,
    /// Called on the type itself
    Static,
}

/// An algorithm bound onto a proxy type
#[derive(Clone, Debug, PartialEq)]
pub struct BoundMember {
    /// Fully qualified algorithm name
    pub algorithm: String,
    pub signature: Signature,
    pub receiver: MemberKind,
}

/// Descriptor of a proxy type held in the type registry
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyType {
    name: String,
    origin: TypeOrigin,
    /// Bound members keyed by member name
    members: BTreeMap<String, BoundMember>,
}

impl ProxyType {
    /// Descriptor of a hand-written kind
    pub fn hand_written(kind: ProxyKind) -> Self {
        ProxyType {
            name: kind.type_name().to_string(),
            origin: TypeOrigin::HandWritten(kind),
            members: BTreeMap::new(),
        }
    }

    /// Descriptor of a generated type
    pub fn generated(name: impl Into<String>) -> Self {
        ProxyType {
            name: name.into(),
            origin: TypeOrigin::Generated,
            members: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn origin(&self) -> TypeOrigin {
        self.origin
    }

    pub fn is_generated(&self) -> bool {
        self.origin == TypeOrigin::Generated
    }

    /// Capability tag given to instances
    pub fn kind(&self) -> ProxyKind {
        match self.origin {
            TypeOrigin::HandWritten(kind) => kind,
            TypeOrigin::Generated => ProxyKind::Generated,
        }
    }

    /// Wrap an expression as an instance of this type
    pub fn wrap(&self, expression: Expression) -> Proxy {
        match self.origin {
            TypeOrigin::HandWritten(kind) => Proxy::hand_written(kind, expression),
            TypeOrigin::Generated => Proxy::generated(self.name.clone(), expression),
        }
    }

    pub fn member(&self, name: &str) -> Option<&BoundMember> {
        self.members.get(name)
    }

    /// Static member, if bound
    pub fn static_member(&self, name: &str) -> Option<&BoundMember> {
        self.members
            .get(name)
            .filter(|m| m.receiver == MemberKind::Static)
    }

    pub fn members(&self) -> impl Iterator<Item = (&String, &BoundMember)> {
        self.members.iter()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Bind a member; an existing binding under the same name is kept
    pub fn bind(&mut self, name: impl Into<String>, member: BoundMember) -> bool {
        match self.members.entry(name.into()) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(member);
                true
            }
        }
    }

    /// Remove every bound member, returning their algorithm names
    pub fn unbind_all(&mut self) -> Vec<String> {
        std::mem::take(&mut self.members)
            .into_values()
            .map(|m| m.algorithm)
            .collect()
    }
}
