//! Kind dispatch: the single recursive entry point of reconciliation.

use super::identity::IdentityPolicy;
use super::Reconciler;
use crate::model::{IdentityConfig, Node};

impl<P: IdentityPolicy> Reconciler<P> {
    /// Reconcile one (previous, next) pair.
    ///
    /// Rules, in order:
    /// 1. absent previous (or `Undefined`) yields `next`
    /// 2. `next` identical to `previous` yields `previous`
    /// 3. either side atomic yields `next`
    /// 4. arrays go to the array reconciler; a kind change yields `next`
    /// 5. dates with the same millisecond instant yield `previous`
    /// 6. mappings go to the object merger; a kind change yields `next`
    /// 7. opaque values yield `next`
    pub(crate) fn reconcile_node(
        &self,
        previous: Option<&Node>,
        next: Node,
        config: Option<&IdentityConfig>,
    ) -> Node {
        let previous = match previous {
            None | Some(Node::Undefined) => return next,
            Some(previous) => previous,
        };

        if next.same_ref(previous) {
            return previous.clone();
        }

        if next.kind().is_atomic() || previous.kind().is_atomic() {
            return next;
        }

        match (previous, next) {
            (Node::Array(prev_items), Node::Array(next_items)) => {
                self.merge_arrays(prev_items, next_items, config)
            }
            (Node::Date(prev_instant), Node::Date(next_instant)) => {
                if prev_instant.timestamp_millis() == next_instant.timestamp_millis() {
                    previous.clone()
                } else {
                    Node::Date(next_instant)
                }
            }
            (Node::Object(prev_entries), Node::Object(next_entries)) => {
                self.merge_objects(prev_entries, next_entries, config)
            }
            (_, next) => {
                tracing::trace!(
                    prev_kind = %previous.kind(),
                    next_kind = %next.kind(),
                    "replaced without descent"
                );
                next
            }
        }
    }
}
