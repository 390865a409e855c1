pub mod identity_config;
pub mod node;

pub use identity_config::IdentityConfig;
pub use node::{FunctionRef, Mapping, Node, NodeKind, Opaque};
