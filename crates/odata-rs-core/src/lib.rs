//! # odata-rs-core
//!
//! Foundation types for the odata-rs workspace. This crate has no
//! dependencies on the rest of the workspace and provides the pieces every
//! other crate shares.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result alias
//! - [`settings`] - Runtime settings and global configuration
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;

// Re-export the most commonly used types at the crate root.
pub use error::{Clause, ODataError, ODataResult};
pub use settings::{Settings, SETTINGS};
