use serde_json::Value;
use sharetree_core::Node;

/// Build a tree from JSON
#[allow(dead_code)]
pub fn tree(value: Value) -> Node {
    Node::from(value)
}

/// Allocation address of a composite or date node.
///
/// Record it before moving a node into `reconcile` to check later that the
/// result (or one of its subtrees) is that very allocation.
#[allow(dead_code)]
pub fn addr(node: &Node) -> usize {
    match node {
        Node::Array(items) => std::sync::Arc::as_ptr(items) as *const () as usize,
        Node::Object(entries) => std::sync::Arc::as_ptr(entries) as *const () as usize,
        Node::Date(instant) => std::sync::Arc::as_ptr(instant) as *const () as usize,
        Node::Opaque(value) => std::sync::Arc::as_ptr(value) as *const () as usize,
        other => panic!("{} node has no allocation", other.kind()),
    }
}

/// Follow a dotted path such as `deep.deeper.1.name`; numeric segments
/// index arrays.
#[allow(dead_code)]
pub fn at<'a>(node: &'a Node, path: &str) -> &'a Node {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .fold(node, |current, segment| {
            let child = match (current, segment.parse::<usize>()) {
                (Node::Array(_), Ok(index)) => current.at(index),
                _ => current.get(segment),
            };
            child.unwrap_or_else(|| panic!("no node at segment '{}' of '{}'", segment, path))
        })
}

/// Assert that `path` resolves to the same allocation in both trees
#[allow(dead_code)]
pub fn assert_shared(result: &Node, previous: &Node, path: &str) {
    assert!(
        at(result, path).same_ref(at(previous, path)),
        "expected '{}' to be reused from previous",
        path
    );
}

/// Assert that `path` does not reuse the previous allocation
#[allow(dead_code)]
pub fn assert_fresh(result: &Node, previous: &Node, path: &str) {
    assert!(
        !at(result, path).same_ref(at(previous, path)),
        "expected '{}' to be a fresh value",
        path
    );
}
