//! Array reconciliation with optional identity matching.

use super::identity::{IdentityKey, IdentityMap, IdentityPolicy};
use super::Reconciler;
use crate::model::{IdentityConfig, Node};
use std::sync::Arc;

impl<P: IdentityPolicy> Reconciler<P> {
    /// Reconcile two arrays element by element.
    ///
    /// Each new element is paired with the previous element at the same
    /// position. When an identity field is active and the pairing disagrees
    /// on the element's identity value, the previous element carrying that
    /// value is used instead and the array counts as changed. Elements whose
    /// identity value is falsy or missing keep the positional pairing.
    pub(crate) fn merge_arrays(
        &self,
        previous: &Arc<Vec<Node>>,
        mut next: Arc<Vec<Node>>,
        config: Option<&IdentityConfig>,
    ) -> Node {
        let mut changed = previous.len() != next.len();

        let field = self.policy.resolve(&next, config);
        let by_identity = match field {
            Some(field) if !next.is_empty() => {
                let map = IdentityMap::build(previous, field);
                tracing::trace!(
                    identity_field = field,
                    prev_len = previous.len(),
                    next_len = next.len(),
                    indexed = map.len(),
                    "identity matching active"
                );
                Some((field, map))
            }
            _ => None,
        };

        for (index, slot) in Arc::make_mut(&mut next).iter_mut().enumerate() {
            let mut candidate = previous.get(index);

            if let Some((field, map)) = &by_identity {
                if let Some(key) = IdentityKey::of_element(slot, field) {
                    // Composite identity values only match by allocation in
                    // the map, so the positional pair compares by value.
                    let paired = candidate.and_then(|c| c.get(field)) == slot.get(field);
                    if !paired {
                        candidate = map.get(&key);
                        changed = true;
                    }
                }
            }

            let child_config = config.and_then(|c| c.for_position(index));
            let merged = self.reconcile_node(candidate, std::mem::take(slot), child_config);

            match previous.get(index) {
                Some(prev_child) if merged.same_ref(prev_child) => {}
                _ => changed = true,
            }
            *slot = merged;
        }

        if changed {
            Node::Array(next)
        } else {
            Node::Array(Arc::clone(previous))
        }
    }
}
