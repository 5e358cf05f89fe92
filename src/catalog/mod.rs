//! catalog
//!
//! The unified command list shown by `list`.
//!
//! # Modules
//!
//! - [`model`] - Command descriptors and catalogs
//! - [`fetch`] - Introspection of the legacy executable
//! - [`merge`] - Combining legacy and native commands
//! - [`render`] - JSON, Markdown and text output
//!
//! # Flow
//!
//! ```text
//! legacy `list --format=json` ──fetch──► Catalog ──merge(native)──► Catalog ──render──► bytes
//! ```

pub mod fetch;
pub mod merge;
pub mod model;
pub mod render;

pub use fetch::{fetch, FetchError, ListRequest};
pub use merge::merge;
pub use model::{Application, Catalog, CommandDescriptor, Source};
pub use render::{render, ListFormat, RenderError};
