//! ShareTree Core - structural sharing between immutable tree snapshots
//!
//! This crate reconciles a freshly produced snapshot of a data tree against
//! the previous one, returning a tree that is value-equal to the new snapshot
//! while reusing every unchanged subtree of the old one. Consumers compare
//! subtrees with [`Node::same_ref`] to find out what changed.
//!
//! It provides:
//! - The [`Node`] tree model with pointer-observable sharing
//! - Kind-dispatched reconciliation of mappings, arrays, dates and opaque values
//! - Identity matching of moved array elements, inferred or configured
//! - Configuration loading from JSON or TOML
//! - Structured logging and a canonical error facility

pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod reconcile;

pub use sharetree_core_types::schema;

// Re-export commonly used types
pub use config::ReconcilerConfig;
pub use errors::{ExError, ExErrorKind, Result, ShareTreeError};
pub use model::{FunctionRef, IdentityConfig, Mapping, Node, NodeKind, Opaque};
pub use reconcile::{reconcile, DefaultIdentityPolicy, IdentityPolicy, Reconciler};
