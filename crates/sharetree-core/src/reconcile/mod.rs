//! Structural-sharing reconciliation
//!
//! Given the previous snapshot of a tree and a freshly produced next
//! snapshot, [`Reconciler::reconcile`] returns a tree that is deep-equal to
//! the next snapshot and shares every subtree that did not change with the
//! previous one. Callers can then detect change with [`Node::same_ref`]
//! instead of a deep comparison.
//!
//! ## Dispatch
//!
//! Values are classified by [`NodeKind`](crate::model::NodeKind). Atomic
//! values are never descended into; arrays and plain mappings are merged
//! child by child; dates compare by millisecond instant; opaque values are
//! always replaced.
//!
//! ## Arrays and identity
//!
//! Array elements pair by position unless an identity field is active for
//! that array, in which case elements that moved are paired with the
//! previous element carrying the same identity value. The field is either
//! configured through [`IdentityConfig`] or inferred by an
//! [`IdentityPolicy`] from the first new element.
//!
//! Reconciliation is total: it never fails and never writes to the previous
//! tree.

pub mod arrays;
pub mod dispatch;
pub mod identity;
pub mod objects;

pub use identity::{
    DefaultIdentityPolicy, IdentityKey, IdentityMap, IdentityPolicy, DEFAULT_IDENTITY_FIELDS,
};

use crate::config::ReconcilerConfig;
use crate::model::{IdentityConfig, Node};
use crate::schema::OP_RECONCILE;
use crate::{log_op_end, log_op_start};

/// Reconciles snapshot pairs under an identity policy.
///
/// A reconciler is immutable and can be shared across threads when its
/// policy can.
#[derive(Debug, Clone, Default)]
pub struct Reconciler<P = DefaultIdentityPolicy> {
    policy: P,
    default_identity: IdentityConfig,
}

impl Reconciler<DefaultIdentityPolicy> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a reconciler from loaded configuration: its field list drives
    /// inference and its identity tree applies when a call passes none.
    pub fn from_config(config: &ReconcilerConfig) -> Self {
        Self {
            policy: DefaultIdentityPolicy::with_fields(config.identity_fields.iter().cloned()),
            default_identity: config.identity.clone(),
        }
    }
}

impl<P: IdentityPolicy> Reconciler<P> {
    /// Use a custom identity policy
    pub fn with_policy(policy: P) -> Self {
        Self {
            policy,
            default_identity: IdentityConfig::Inferred,
        }
    }

    /// Identity configuration applied by [`Reconciler::reconcile_with_defaults`]
    pub fn with_default_identity(mut self, identity: IdentityConfig) -> Self {
        self.default_identity = identity;
        self
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn default_identity(&self) -> &IdentityConfig {
        &self.default_identity
    }

    /// Reconcile `next` against `previous`.
    ///
    /// The result is deep-equal to `next`. Any subtree of the result that is
    /// deep-equal to the subtree of `previous` it was paired with is that
    /// very subtree of `previous`.
    ///
    /// # Example
    ///
    /// ```
    /// use sharetree_core::{Node, Reconciler};
    /// use serde_json::json;
    ///
    /// let previous = Node::from(json!({ "a": { "x": 1 }, "b": [1, 2] }));
    /// let next = Node::from(json!({ "a": { "x": 1 }, "b": [1, 2, 3] }));
    ///
    /// let result = Reconciler::new().reconcile(Some(&previous), next.clone(), None);
    /// assert_eq!(result, next);
    /// assert!(result.get("a").unwrap().same_ref(previous.get("a").unwrap()));
    /// assert!(!result.get("b").unwrap().same_ref(previous.get("b").unwrap()));
    /// ```
    pub fn reconcile(
        &self,
        previous: Option<&Node>,
        next: Node,
        config: Option<&IdentityConfig>,
    ) -> Node {
        log_op_start!(OP_RECONCILE, next_kind = next.kind().as_str());
        let start = std::time::Instant::now();

        let result = self.reconcile_node(previous, next, config);
        let reused_previous = previous.is_some_and(|p| result.same_ref(p));

        log_op_end!(
            OP_RECONCILE,
            duration_ms = start.elapsed().as_millis() as u64,
            reused_previous = reused_previous
        );
        result
    }

    /// Reconcile using the reconciler's default identity configuration
    pub fn reconcile_with_defaults(&self, previous: Option<&Node>, next: Node) -> Node {
        self.reconcile(previous, next, Some(&self.default_identity))
    }
}

/// Reconcile with the default identity policy.
///
/// Shorthand for `Reconciler::new().reconcile(previous, next, config)`.
pub fn reconcile(previous: Option<&Node>, next: Node, config: Option<&IdentityConfig>) -> Node {
    Reconciler::new().reconcile(previous, next, config)
}
