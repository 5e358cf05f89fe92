//! ui::shell_hints
//!
//! Detects shell configuration left behind by the standalone legacy installer.
//!
//! The legacy installer appended a block to `~/.zshrc` / `~/.bashrc`:
//!
//! ```text
//! # BEGIN SNIPPET: <Application Name> configuration
//! ...
//! # END SNIPPET
//! ```
//!
//! The wrapper does not need it, so after each command we point it out.

use std::fs;
use std::path::{Path, PathBuf};

use super::output::{self, Verbosity};

const SNIPPET_END: &str = "# END SNIPPET";
const SHELL_CONFIG_FILES: &[&str] = &[".zshrc", ".bashrc"];

/// A leftover snippet found in a shell config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leftover {
    pub file: PathBuf,
    pub snippet: String,
}

/// Find the first legacy snippet block in `contents`.
pub fn find_snippet(contents: &str, app_name: &str) -> Option<String> {
    let start_marker = format!("# BEGIN SNIPPET: {} configuration", app_name);
    let start = contents.find(&start_marker)?;
    let after_start = start + start_marker.len();
    let end = contents[after_start..].find(SNIPPET_END)? + after_start + SNIPPET_END.len();
    Some(contents[start..end].to_string())
}

/// Scan the shell config files under `home`.
pub fn scan(home: &Path, app_name: &str) -> Vec<Leftover> {
    SHELL_CONFIG_FILES
        .iter()
        .filter_map(|name| {
            let file = home.join(name);
            let contents = fs::read_to_string(&file).ok()?;
            let snippet = find_snippet(&contents, app_name)?;
            Some(Leftover { file, snippet })
        })
        .collect()
}

/// Warn about leftovers in the user's home directory.
pub fn warn_leftovers(app_name: &str, verbosity: Verbosity) {
    let Some(home) = dirs::home_dir() else {
        return;
    };

    for leftover in scan(&home, app_name) {
        output::warn(
            format!(
                "Your {} file contains code that is no longer needed for the {}",
                leftover.file.display(),
                app_name
            ),
            verbosity,
        );
        output::notice(
            format!(
                "Please remove the following lines from {}:\n\t{}",
                leftover.file.display(),
                leftover.snippet.replace('\n', "\n\t")
            ),
            verbosity,
        );
    }
}
