//! Persistence ports implemented by newsdex-infra.

pub mod document;
pub mod index;
