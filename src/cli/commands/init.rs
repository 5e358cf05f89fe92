//! project:init command - Initialize a project in the current directory

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::cli::Context;
use crate::ui::output::Verbosity;

/// File name of the project descriptor inside `.<slug>/`.
pub const PROJECT_FILE_NAME: &str = "project.toml";

/// Contents of the project descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub title: String,
    /// Wrapper version that created the file.
    pub created_with: String,
}

/// Location of the project descriptor for `dir`.
pub fn project_file_path(dir: &Path, slug: &str) -> PathBuf {
    dir.join(format!(".{}", slug)).join(PROJECT_FILE_NAME)
}

/// Initialize a project in `cwd`.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `cwd` - Project directory
/// * `title` - Project title; defaults to the directory name
/// * `force` - Overwrite an existing project file
pub fn project_init(ctx: &Context, cwd: &Path, title: Option<&str>, force: bool) -> Result<()> {
    let path = project_file_path(cwd, &ctx.config.application.slug);

    if path.exists() && !force {
        bail!(
            "A project is already initialized at {}. Use --force to overwrite it.",
            path.display()
        );
    }

    let title = match title {
        Some(title) if !title.trim().is_empty() => title.trim().to_string(),
        Some(_) => bail!("Project title cannot be empty"),
        None => default_title(cwd),
    };

    let project = ProjectFile {
        title,
        created_with: format!(
            "{} {}",
            ctx.config.application.executable,
            env!("CARGO_PKG_VERSION")
        ),
    };
    write_project_atomic(&path, &project)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if ctx.verbosity != Verbosity::Quiet {
        println!(
            "Initialized project '{}' in {}",
            project.title,
            cwd.display()
        );
    }
    Ok(())
}

fn default_title(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

/// Write via a sibling temp file and rename.
fn write_project_atomic(path: &Path, project: &ProjectFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(project)?;

    let temp_path = path.with_extension("toml.tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    drop(file);

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use tempfile::TempDir;
    use tokio::runtime::Runtime;
    use tokio_util::sync::CancellationToken;

    fn with_ctx<F: FnOnce(&Context)>(f: F) {
        let runtime = Runtime::new().unwrap();
        let ctx = Context {
            config: Config::embedded().unwrap(),
            verbosity: Verbosity::Quiet,
            legacy_path: None,
            runtime: runtime.handle().clone(),
            cancel: CancellationToken::new(),
        };
        f(&ctx);
    }

    fn read(path: &Path) -> ProjectFile {
        toml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn creates_project_file() {
        let dir = TempDir::new().unwrap();
        with_ctx(|ctx| project_init(ctx, dir.path(), Some("Shop"), false).unwrap());

        let path = dir.path().join(".legacy-bridge/project.toml");
        let project = read(&path);
        assert_eq!(project.title, "Shop");
        assert!(project.created_with.starts_with("lbr "));
        assert!(!dir.path().join(".legacy-bridge/project.toml.tmp").exists());
    }

    #[test]
    fn title_defaults_to_directory_name() {
        let parent = TempDir::new().unwrap();
        let dir = parent.path().join("my-shop");
        fs::create_dir(&dir).unwrap();

        with_ctx(|ctx| project_init(ctx, &dir, None, false).unwrap());

        assert_eq!(read(&project_file_path(&dir, "legacy-bridge")).title, "my-shop");
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        with_ctx(|ctx| {
            project_init(ctx, dir.path(), Some("First"), false).unwrap();

            let err = project_init(ctx, dir.path(), Some("Second"), false).unwrap_err();
            assert!(err.to_string().contains("--force"));

            project_init(ctx, dir.path(), Some("Second"), true).unwrap();
        });

        let project = read(&project_file_path(dir.path(), "legacy-bridge"));
        assert_eq!(project.title, "Second");
    }

    #[test]
    fn blank_title_is_rejected() {
        let dir = TempDir::new().unwrap();
        with_ctx(|ctx| {
            assert!(project_init(ctx, dir.path(), Some("  "), false).is_err());
        });
        assert!(!project_file_path(dir.path(), "legacy-bridge").exists());
    }
}
