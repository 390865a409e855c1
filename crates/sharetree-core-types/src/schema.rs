//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Reconciliation outcome fields
pub const FIELD_NEXT_KIND: &str = "next_kind";
pub const FIELD_REUSED_PREVIOUS: &str = "reused_previous";
pub const FIELD_IDENTITY_FIELD: &str = "identity_field";

// Collection sizes
pub const FIELD_PREV_LEN: &str = "prev_len";
pub const FIELD_NEXT_LEN: &str = "next_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical operation names
pub const OP_RECONCILE: &str = "reconcile";
pub const OP_LOAD_CONFIG: &str = "load_config";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
