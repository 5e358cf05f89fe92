//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all native commands:
//! - `--help` / `-h`: Show help for the wrapper
//! - `-V` / `--version`: Same as `lbr version`
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Suppress warnings and notices
//! - `--config <path>`: Use this configuration file instead of the built-in one
//! - `--legacy-path <path>`: Run this legacy executable instead of the bundled one
//!
//! Anything that is not a native command is collected verbatim into
//! [`Command::External`] and handed to the legacy executable, including its
//! own flags.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};

/// Front-end for the bundled legacy CLI
#[derive(Parser, Debug)]
#[command(name = "lbr")]
#[command(author, about, long_about = None)]
#[command(disable_version_flag = true, disable_help_subcommand = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Suppress warnings and notices
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file to use instead of the built-in defaults
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run a local legacy executable instead of the bundled one
    #[arg(long, global = true, value_name = "PATH")]
    pub legacy_path: Option<PathBuf>,

    /// Display version information
    #[arg(short = 'V', long = "version")]
    pub version: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Parse command-line arguments, exiting with a usage error if invalid.
    pub fn parse_args() -> Self {
        let cli = <Self as Parser>::parse();
        if let Err(err) = cli.validate() {
            err.exit();
        }
        cli
    }

    /// Parse from an explicit argument list.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = <Self as Parser>::try_parse_from(args)?;
        cli.validate()?;
        Ok(cli)
    }

    /// Cross-argument checks clap cannot express declaratively.
    fn validate(&self) -> Result<(), clap::Error> {
        if let Some(Command::List {
            format, raw: true, ..
        }) = &self.command
        {
            if format != "txt" {
                return Err(Cli::command().error(
                    ErrorKind::ArgumentConflict,
                    "--raw can only be used with --format=txt",
                ));
            }
        }
        Ok(())
    }
}

/// Available commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Lists commands
    List {
        /// Only list commands in this namespace
        namespace: Option<String>,

        /// The output format (txt, json, or md); other formats are rendered by the legacy CLI
        #[arg(long, default_value = "txt")]
        format: String,

        /// Output the raw command list
        #[arg(long)]
        raw: bool,

        /// Show all commands, including hidden ones
        #[arg(long)]
        all: bool,
    },

    /// Print the version number
    Version,

    /// Initialize a project in the current directory
    #[command(name = "project:init")]
    ProjectInit {
        /// Project title (defaults to the directory name)
        #[arg(long)]
        title: Option<String>,

        /// Overwrite an existing project file
        #[arg(long)]
        force: bool,
    },

    /// Any other command is run by the legacy CLI
    #[command(external_subcommand)]
    External(Vec<OsString>),
}
