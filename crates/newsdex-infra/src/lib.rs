//! Infrastructure layer for Newsdex.
//!
//! Contains implementations of the ports defined in `newsdex-core`: the JSON
//! corpus store, the generation-swapping index store, and the fastembed
//! embedding provider, plus configuration loading and data-dir layout.

pub mod config;
pub mod embedder;
pub mod filesystem;
pub mod store;
