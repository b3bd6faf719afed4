//! Shared domain types for Newsdex.
//!
//! This crate contains the records that flow through the search pipeline:
//! documents and their dedup keys, index metadata rows, scored results, the
//! index descriptor, global configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod document;
pub mod error;
pub mod index;
