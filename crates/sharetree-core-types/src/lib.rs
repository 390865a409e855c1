//! Core types shared across sharetree facilities
//!
//! This crate provides the canonical schema constants (field keys, operation
//! names and event names) used by both the error and logging facilities of
//! `sharetree-core`.

pub mod schema;
