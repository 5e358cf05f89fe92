//! legacy-bridge - A modern front-end for a bundled legacy CLI
//!
//! The `lbr` binary ships a legacy executable inside itself. On each run it
//! makes sure a byte-identical copy of that executable is present in the user
//! cache directory, then either hands the command line to it or answers
//! natively.
//!
//! # Architecture
//!
//! - [`cli`] - Argument parsing, dispatch and exit codes
//! - [`cache`] - Content-verified deployment of the payload to disk
//! - [`legacy`] - The embedded payload and subprocess execution
//! - [`catalog`] - Command list introspection, merging and rendering
//! - [`update`] - Background check for newer releases
//! - [`core`] - Configuration and path routing
//! - [`ui`] - Diagnostics on stderr
//!
//! # Invariants
//!
//! 1. The payload on disk is rewritten only when its size or hash differs
//! 2. A failed or interrupted write is re-detected as stale on the next run
//! 3. The legacy exit code is propagated unchanged
//! 4. Native commands win over legacy commands of the same name

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod core;
pub mod legacy;
pub mod ui;
pub mod update;
