//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Native commands are handled here; everything else is passed to the legacy
//! executable. Handlers return `anyhow::Result` and leave exit-code mapping to
//! [`crate::cli::run`].
//!
//! # Async Commands
//!
//! Commands that run the legacy executable are async underneath. Handlers
//! stay synchronous and `block_on` the shared runtime in [`Context`].

mod init;
mod list;
mod passthrough;
mod version;

pub use init::project_init;
pub use list::list;
pub use passthrough::passthrough;
pub use version::{version, version_line};

use anyhow::{Context as _, Result};

use super::args::Command;
use super::Context;
use crate::catalog::CommandDescriptor;

/// Dispatch a command to its handler.
///
/// `None` runs the legacy executable without arguments.
pub fn dispatch(command: Option<Command>, ctx: &Context) -> Result<()> {
    match command {
        Some(Command::List {
            namespace,
            format,
            raw,
            all,
        }) => list::list(ctx, namespace.as_deref(), &format, raw, all),
        Some(Command::Version) => version::version(ctx),
        Some(Command::ProjectInit { title, force }) => {
            let cwd = std::env::current_dir().context("Failed to read the current directory")?;
            init::project_init(ctx, &cwd, title.as_deref(), force)
        }
        Some(Command::External(args)) => passthrough::passthrough(ctx, &args),
        None => passthrough::passthrough(ctx, &[]),
    }
}

/// Descriptors for the commands this binary implements itself.
pub fn native_commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::native("list", "Lists commands")
            .with_usage("list [--format FORMAT] [--raw] [--all] [--] [<namespace>]")
            .with_help(
                "The list command lists all commands, or those in one namespace.\n\n\
                 Use --format=json or --format=md for machine-readable output.",
            )
            .with_argument("namespace", false, "The namespace name")
            .with_option("format", None, "The output format (txt, json, or md)")
            .with_option("raw", None, "To output raw command list")
            .with_option("all", None, "Show all commands, including hidden ones"),
        CommandDescriptor::native("version", "Print the version number").with_usage("version"),
        CommandDescriptor::native("project:init", "Initialize a project in the current directory")
            .with_usage("project:init [--title TITLE] [--force]")
            .with_option("title", None, "Project title (defaults to the directory name)")
            .with_option("force", None, "Overwrite an existing project file"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn native_names_are_unique() {
        let commands = native_commands();
        let names: HashSet<_> = commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), commands.len());
    }

    #[test]
    fn natives_are_marked_native() {
        assert!(native_commands().iter().all(|c| c.is_native() && !c.hidden));
    }

    #[test]
    fn project_init_is_native() {
        let commands = native_commands();
        let init = commands.iter().find(|c| c.name == "project:init").unwrap();
        assert_eq!(init.namespace(), Some("project"));
    }
}
