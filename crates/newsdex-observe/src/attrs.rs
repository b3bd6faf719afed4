//! Span naming for Newsdex operations.
//!
//! Every command runs inside one root span named `newsdex` whose
//! `newsdex.operation` field carries one of the `OP_*` values below, so
//! exported traces can be grouped without parsing span names.

/// Tracer and service name reported to OpenTelemetry.
pub const SERVICE_NAME: &str = "newsdex";

// --- Operation name values ---

/// Merge a fetched batch into the corpus.
pub const OP_INGEST: &str = "ingest";

/// Embed the corpus and publish a new index generation.
pub const OP_BUILD: &str = "build_index";

/// Answer a similarity query.
pub const OP_SEARCH: &str = "search";

/// Report corpus and index state.
pub const OP_STATUS: &str = "status";
