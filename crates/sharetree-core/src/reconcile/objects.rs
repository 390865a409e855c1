//! Plain mapping merge.

use super::identity::IdentityPolicy;
use super::Reconciler;
use crate::model::{IdentityConfig, Mapping, Node};
use std::sync::Arc;

impl<P: IdentityPolicy> Reconciler<P> {
    /// Merge two plain mappings key by key.
    ///
    /// Each child of `next` is replaced by its reconciled counterpart. When
    /// every child comes back identical to the previous child under the same
    /// key and the key counts match, the previous mapping is returned instead.
    pub(crate) fn merge_objects(
        &self,
        previous: &Arc<Mapping>,
        mut next: Arc<Mapping>,
        config: Option<&IdentityConfig>,
    ) -> Node {
        let mut changed = previous.len() != next.len();

        // Writes go to `next` only. A shared `next` is copied on first write.
        for (key, slot) in Arc::make_mut(&mut next).iter_mut() {
            let prev_child = previous.get(key);
            let child_config = config.and_then(|c| c.for_key(key));
            let merged = self.reconcile_node(prev_child, std::mem::take(slot), child_config);

            match prev_child {
                Some(prev_child) if merged.same_ref(prev_child) => {}
                _ => changed = true,
            }
            *slot = merged;
        }

        if changed {
            Node::Object(next)
        } else {
            Node::Object(Arc::clone(previous))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn merge(previous: &Node, next: Node) -> Node {
        Reconciler::new().reconcile_node(Some(previous), next, None)
    }

    #[test]
    fn test_equal_mappings_return_previous() {
        let previous = Node::from(json!({ "a": 1, "b": { "c": "x" } }));
        let result = merge(&previous, Node::from(json!({ "a": 1, "b": { "c": "x" } })));
        assert!(result.same_ref(&previous));
    }

    #[test]
    fn test_changed_leaf_keeps_unchanged_siblings() {
        let previous = Node::from(json!({ "a": { "x": 1 }, "b": { "y": 2 } }));
        let next = Node::from(json!({ "a": { "x": 1 }, "b": { "y": 3 } }));
        let result = merge(&previous, next.clone());

        assert_eq!(result, next);
        assert!(!result.same_ref(&previous));
        assert!(result.get("a").unwrap().same_ref(previous.get("a").unwrap()));
        assert!(!result.get("b").unwrap().same_ref(previous.get("b").unwrap()));
    }

    #[test]
    fn test_added_key_with_equal_len_is_changed() {
        let previous = Node::from(json!({ "a": 1, "b": 2 }));
        let next = Node::from(json!({ "a": 1, "c": 2 }));
        let result = merge(&previous, next.clone());
        assert_eq!(result, next);
        assert!(!result.same_ref(&previous));
    }

    #[test]
    fn test_removed_key_is_changed() {
        let previous = Node::from(json!({ "a": { "x": 1 }, "b": 2 }));
        let next = Node::from(json!({ "a": { "x": 1 } }));
        let result = merge(&previous, next);
        assert!(!result.same_ref(&previous));
        assert!(result.get("a").unwrap().same_ref(previous.get("a").unwrap()));
        assert_eq!(result.get("b"), None);
    }

    #[test]
    fn test_undefined_entry_against_missing_key_is_changed() {
        let previous = Node::object([("a", Node::from(1))]);
        let next = Node::object([("a", Node::from(1)), ("b", Node::Undefined)]);
        let result = merge(&previous, next);
        assert!(!result.same_ref(&previous));
        assert_eq!(result.get("b"), Some(&Node::Undefined));
    }

    #[test]
    fn test_previous_left_untouched() {
        let previous = Node::from(json!({ "a": { "x": 1 }, "b": 2 }));
        let snapshot = Node::from(json!({ "a": { "x": 1 }, "b": 2 }));
        let _ = merge(&previous, Node::from(json!({ "a": { "x": 1 }, "b": 3 })));
        assert_eq!(previous, snapshot);
    }
}
