//! ui
//!
//! User-facing diagnostics.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware messages on stderr
//! - [`shell_hints`] - Warnings about obsolete legacy shell configuration

pub mod output;
pub mod shell_hints;
