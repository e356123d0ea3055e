//! Compilation from parsed clauses to executable queries.
//!
//! [`QueryCompiler`] drives the whole translation; the submodules handle
//! filter predicates, transformation pipelines, and name/value resolution.

mod assemble;
mod filter;
mod resolve;
mod transform;

pub use assemble::QueryCompiler;
