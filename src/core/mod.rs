//! core
//!
//! Configuration and path routing shared by every layer.
//!
//! # Modules
//!
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for cache storage

pub mod config;
pub mod paths;
