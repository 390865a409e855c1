use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Plain keyed mapping. Keys enumerate in sorted order.
pub type Mapping = BTreeMap<String, Node>;

/// An opaque instance: a structured value that is never looked into.
///
/// Every `'static` type that is `Debug + PartialEq + Send + Sync` is an
/// opaque value through the blanket implementation below. `eq_opaque` backs
/// deep equality of [`Node`] only; reconciliation compares opaque values by
/// pointer.
pub trait Opaque: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn eq_opaque(&self, other: &dyn Opaque) -> bool;
}

impl<T> Opaque for T
where
    T: Any + fmt::Debug + PartialEq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_opaque(&self, other: &dyn Opaque) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

type NativeFn = dyn Fn(&[Node]) -> Node + Send + Sync;

/// Shared reference to a callable. Equal only to clones of itself.
#[derive(Clone)]
pub struct FunctionRef(Arc<NativeFn>);

impl FunctionRef {
    pub fn new(f: impl Fn(&[Node]) -> Node + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invoke the function
    pub fn call(&self, args: &[Node]) -> Node {
        (self.0)(args)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for FunctionRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionRef({:#x})", self.addr())
    }
}

/// Classification tag for a [`Node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Undefined,
    Null,
    Bool,
    Number,
    String,
    Function,
    Date,
    Array,
    Object,
    Opaque,
}

impl NodeKind {
    /// Value types compared by primitive equality only, never descended into.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            NodeKind::Undefined
                | NodeKind::Null
                | NodeKind::Bool
                | NodeKind::Number
                | NodeKind::String
                | NodeKind::Function
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Undefined => "undefined",
            NodeKind::Null => "null",
            NodeKind::Bool => "bool",
            NodeKind::Number => "number",
            NodeKind::String => "string",
            NodeKind::Function => "function",
            NodeKind::Date => "date",
            NodeKind::Array => "array",
            NodeKind::Object => "object",
            NodeKind::Opaque => "opaque",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value in an immutable snapshot tree.
///
/// Composite variants and dates sit behind `Arc`, so reusing a subtree is a
/// pointer copy and reuse is observable with [`Node::same_ref`]. `PartialEq`
/// is deep, structural equality.
#[derive(Debug, Clone, Default)]
pub enum Node {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Function(FunctionRef),
    Date(Arc<DateTime<Utc>>),
    Array(Arc<Vec<Node>>),
    Object(Arc<Mapping>),
    Opaque(Arc<dyn Opaque>),
}

fn same_alloc<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

impl Node {
    /// Build an array node
    pub fn array(items: impl IntoIterator<Item = Node>) -> Self {
        Node::Array(Arc::new(items.into_iter().collect()))
    }

    /// Build a plain mapping node
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Node)>) -> Self {
        Node::Object(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Build a date node, truncated to millisecond precision
    pub fn date(instant: DateTime<Utc>) -> Self {
        Node::Date(Arc::new(instant.trunc_subsecs(3)))
    }

    /// Wrap any value as an opaque instance
    pub fn opaque<T: Opaque>(value: T) -> Self {
        Node::Opaque(Arc::new(value))
    }

    pub fn function(f: impl Fn(&[Node]) -> Node + Send + Sync + 'static) -> Self {
        Node::Function(FunctionRef::new(f))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Undefined => NodeKind::Undefined,
            Node::Null => NodeKind::Null,
            Node::Bool(_) => NodeKind::Bool,
            Node::Number(_) => NodeKind::Number,
            Node::String(_) => NodeKind::String,
            Node::Function(_) => NodeKind::Function,
            Node::Date(_) => NodeKind::Date,
            Node::Array(_) => NodeKind::Array,
            Node::Object(_) => NodeKind::Object,
            Node::Opaque(_) => NodeKind::Opaque,
        }
    }

    /// Reference identity.
    ///
    /// Scalars are identical when their values are (`NaN` is never identical
    /// to itself, `0.0` and `-0.0` are). Functions, dates, arrays, mappings
    /// and opaque values are identical only when they share an allocation.
    pub fn same_ref(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Undefined, Node::Undefined) | (Node::Null, Node::Null) => true,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::Number(a), Node::Number(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Function(a), Node::Function(b)) => a == b,
            (Node::Date(a), Node::Date(b)) => same_alloc(a, b),
            (Node::Array(a), Node::Array(b)) => same_alloc(a, b),
            (Node::Object(a), Node::Object(b)) => same_alloc(a, b),
            (Node::Opaque(a), Node::Opaque(b)) => same_alloc(a, b),
            _ => false,
        }
    }

    /// Truthiness: `undefined`, `null`, `false`, `0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Node::Undefined | Node::Null => false,
            Node::Bool(b) => *b,
            Node::Number(n) => *n != 0.0 && !n.is_nan(),
            Node::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Node::Undefined)
    }

    /// Mapping entry by key
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_object().and_then(|entries| entries.get(key))
    }

    /// Array element by position
    pub fn at(&self, index: usize) -> Option<&Node> {
        self.as_array().and_then(|items| items.get(index))
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Mapping> {
        match self {
            Node::Object(entries) => Some(&**entries),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Node::Date(instant) => Some(&**instant),
            _ => None,
        }
    }

    /// Downcast an opaque instance to its concrete type
    pub fn downcast_opaque<T: Opaque>(&self) -> Option<&T> {
        match self {
            Node::Opaque(value) => value.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Undefined, Node::Undefined) | (Node::Null, Node::Null) => true,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::Number(a), Node::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Function(a), Node::Function(b)) => a == b,
            (Node::Date(a), Node::Date(b)) => a.timestamp_millis() == b.timestamp_millis(),
            (Node::Array(a), Node::Array(b)) => same_alloc(a, b) || a == b,
            (Node::Object(a), Node::Object(b)) => same_alloc(a, b) || a == b,
            (Node::Opaque(a), Node::Opaque(b)) => same_alloc(a, b) || a.eq_opaque(&**b),
            _ => false,
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Node::String(s.into()),
            Value::Array(items) => Node::array(items.into_iter().map(Node::from)),
            Value::Object(entries) => {
                Node::object(entries.into_iter().map(|(k, v)| (k, Node::from(v))))
            }
        }
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Node::Number(n)
    }
}

impl From<i32> for Node {
    fn from(n: i32) -> Self {
        Node::Number(f64::from(n))
    }
}

impl From<u32> for Node {
    fn from(n: u32) -> Self {
        Node::Number(f64::from(n))
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.into())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s.into())
    }
}

impl From<DateTime<Utc>> for Node {
    fn from(instant: DateTime<Utc>) -> Self {
        Node::date(instant)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Array(Arc::new(items))
    }
}

impl From<Mapping> for Node {
    fn from(entries: Mapping) -> Self {
        Node::Object(Arc::new(entries))
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Node::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Tag(&'static str);

    #[test]
    fn test_kind_classification() {
        assert_eq!(Node::Undefined.kind(), NodeKind::Undefined);
        assert_eq!(Node::from(1).kind(), NodeKind::Number);
        assert_eq!(Node::from("x").kind(), NodeKind::String);
        assert_eq!(Node::array([]).kind(), NodeKind::Array);
        assert_eq!(Node::object::<&str>([]).kind(), NodeKind::Object);
        assert_eq!(Node::opaque(Tag("a")).kind(), NodeKind::Opaque);
        assert_eq!(Node::function(|_| Node::Null).kind(), NodeKind::Function);

        assert!(NodeKind::Function.is_atomic());
        assert!(NodeKind::Null.is_atomic());
        assert!(!NodeKind::Date.is_atomic());
        assert!(!NodeKind::Opaque.is_atomic());
    }

    #[test]
    fn test_same_ref_scalars_compare_by_value() {
        assert!(Node::from(5).same_ref(&Node::from(5.0)));
        assert!(Node::from(0.0).same_ref(&Node::from(-0.0)));
        assert!(!Node::from(f64::NAN).same_ref(&Node::from(f64::NAN)));
        assert!(Node::from("a").same_ref(&Node::from("a".to_string())));
        assert!(!Node::Null.same_ref(&Node::Undefined));
    }

    #[test]
    fn test_same_ref_composites_compare_by_allocation() {
        let a = Node::from(json!({"u": 5}));
        let b = Node::from(json!({"u": 5}));
        assert_eq!(a, b);
        assert!(!a.same_ref(&b));
        assert!(a.same_ref(&a.clone()));

        let f = Node::function(|args| args.first().cloned().unwrap_or_default());
        assert!(f.same_ref(&f.clone()));
        assert!(!f.same_ref(&Node::function(|_| Node::Null)));
    }

    #[test]
    fn test_deep_equality_for_dates_uses_milliseconds() {
        let instant = Utc.with_ymd_and_hms(2022, 12, 9, 10, 42, 0).unwrap();
        let a = Node::date(instant);
        let b = Node::date(instant);
        assert_eq!(a, b);
        assert!(!a.same_ref(&b));

        let precise = instant + chrono::Duration::microseconds(1500);
        assert_eq!(
            Node::date(precise).as_date().map(|d| d.timestamp_micros()),
            Some(instant.timestamp_micros() + 1000)
        );
    }

    #[test]
    fn test_opaque_deep_equality_and_downcast() {
        let a = Node::opaque(Tag("a"));
        assert_eq!(a, Node::opaque(Tag("a")));
        assert_ne!(a, Node::opaque(Tag("b")));
        assert_ne!(a, Node::opaque(42_u8));
        assert_eq!(a.downcast_opaque::<Tag>(), Some(&Tag("a")));
        assert_eq!(a.downcast_opaque::<u8>(), None);
    }

    #[test]
    fn test_truthiness() {
        for falsy in [
            Node::Undefined,
            Node::Null,
            Node::from(false),
            Node::from(0),
            Node::from(f64::NAN),
            Node::from(""),
        ] {
            assert!(!falsy.is_truthy(), "{:?} should be falsy", falsy);
        }
        for truthy in [
            Node::from(true),
            Node::from(-1),
            Node::from("0"),
            Node::array([]),
            Node::object::<&str>([]),
        ] {
            assert!(truthy.is_truthy(), "{:?} should be truthy", truthy);
        }
    }

    #[test]
    fn test_from_json_value() {
        let node = Node::from(json!({"items": [{"id": 1}, null], "name": "n"}));
        assert_eq!(node.get("name").and_then(Node::as_str), Some("n"));
        let items = node.get("items").and_then(Node::as_array).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("id").and_then(Node::as_f64), Some(1.0));
        assert_eq!(items[1], Node::Null);
        assert_eq!(node.get("missing"), None);
    }

    #[test]
    fn test_function_call() {
        let double = FunctionRef::new(|args| {
            Node::from(args.first().and_then(Node::as_f64).unwrap_or(0.0) * 2.0)
        });
        assert_eq!(double.call(&[Node::from(21)]), Node::from(42));
    }
}
