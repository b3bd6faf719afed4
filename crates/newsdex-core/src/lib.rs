//! Business logic and port trait definitions for Newsdex.
//!
//! This crate defines the "ports" (document store, index store, embedder)
//! that the infrastructure layer implements, plus the pure pipeline pieces:
//! ingestion merge, text preparation, the flat index, the index builder, and
//! the query engine. It depends only on `newsdex-types` -- never on
//! `newsdex-infra` or any IO crate.

pub mod builder;
pub mod embedding;
pub mod index;
pub mod ingest;
pub mod query;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;
