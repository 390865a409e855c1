//! Identity policy and identity map for array reconciliation.

use crate::model::{IdentityConfig, Node};
use std::collections::HashMap;
use std::sync::Arc;

/// Field names probed, in order, when no identity field is configured.
pub const DEFAULT_IDENTITY_FIELDS: &[&str] = &["id", "uuid"];

/// Decides which field, if any, identifies the elements of an array.
///
/// An explicitly configured field name always wins; implementors only choose
/// how to infer a field from the new array's first element.
pub trait IdentityPolicy {
    /// Infer the identity field from the first element of the new array.
    fn infer(&self, first: &Node) -> Option<&str>;

    /// Resolve the active identity field for one array level.
    ///
    /// An empty next array never activates identity matching, and an empty
    /// configured field name disables it.
    fn resolve<'a>(
        &'a self,
        next: &[Node],
        explicit: Option<&'a IdentityConfig>,
    ) -> Option<&'a str> {
        if let Some(field) = explicit.and_then(IdentityConfig::explicit_field) {
            return (!field.is_empty()).then_some(field);
        }
        next.first().and_then(|first| self.infer(first))
    }
}

/// Probes the first element for each candidate field name in turn.
///
/// Only plain mappings are probed; the field counts as present when the key
/// exists, whatever its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultIdentityPolicy {
    fields: Vec<String>,
}

impl DefaultIdentityPolicy {
    pub fn new() -> Self {
        Self::with_fields(DEFAULT_IDENTITY_FIELDS.iter().copied())
    }

    /// Probe these field names instead of the defaults. An empty list
    /// disables inference, leaving only explicitly configured fields.
    pub fn with_fields<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl Default for DefaultIdentityPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityPolicy for DefaultIdentityPolicy {
    fn infer(&self, first: &Node) -> Option<&str> {
        let entries = first.as_object()?;
        self.fields
            .iter()
            .find(|field| entries.contains_key(field.as_str()))
            .map(String::as_str)
    }
}

/// Hashable form of a truthy identity value.
///
/// Scalars key by value; every other value keys by its allocation, so two
/// distinct mappings never share an identity even when deep-equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    True,
    Number(u64),
    String(Arc<str>),
    Ref(usize),
}

impl IdentityKey {
    /// Key for an identity value, or `None` when the value is falsy.
    pub fn from_value(value: &Node) -> Option<Self> {
        if !value.is_truthy() {
            return None;
        }
        let key = match value {
            Node::Bool(_) => IdentityKey::True,
            Node::Number(n) => IdentityKey::Number(n.to_bits()),
            Node::String(s) => IdentityKey::String(Arc::clone(s)),
            Node::Function(f) => IdentityKey::Ref(f.addr()),
            Node::Date(d) => IdentityKey::Ref(Arc::as_ptr(d) as *const () as usize),
            Node::Array(a) => IdentityKey::Ref(Arc::as_ptr(a) as *const () as usize),
            Node::Object(o) => IdentityKey::Ref(Arc::as_ptr(o) as *const () as usize),
            Node::Opaque(o) => IdentityKey::Ref(Arc::as_ptr(o) as *const () as usize),
            Node::Undefined | Node::Null => return None,
        };
        Some(key)
    }

    /// Key of an array element under `field`. Elements that are not plain
    /// mappings carry no identity.
    pub fn of_element(element: &Node, field: &str) -> Option<Self> {
        element.get(field).and_then(Self::from_value)
    }
}

/// Lookup from identity value to the previous element carrying it.
///
/// Built once per array level. When several previous elements share an
/// identity value the last one wins.
#[derive(Debug)]
pub struct IdentityMap<'a> {
    entries: HashMap<IdentityKey, &'a Node>,
}

impl<'a> IdentityMap<'a> {
    pub fn build(previous: &'a [Node], field: &str) -> Self {
        let entries = previous
            .iter()
            .filter_map(|element| {
                IdentityKey::of_element(element, field).map(|key| (key, element))
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&'a Node> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
