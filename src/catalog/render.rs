//! catalog::render
//!
//! Renders a [`Catalog`] for humans and machines.
//!
//! # Formats
//!
//! | `--format` | `--raw` | [`ListFormat`] |
//! |------------|---------|----------------|
//! | `json`     |         | `Json`         |
//! | `md`       |         | `Markdown`     |
//! | `txt`      | no      | `Text`         |
//! | `txt`      | yes     | `RawText`      |
//!
//! Any other `--format` has no renderer here; [`ListFormat::parse`] returns
//! `None` and the caller hands the request to the legacy executable.
//!
//! Every format ends with a newline.

use std::fmt::{self, Write};

use serde::Serialize;
use thiserror::Error;

use super::model::{Application, Catalog, CommandDescriptor, NamespaceGroup, GLOBAL_NAMESPACE_ID};

/// Column at which `RawText` descriptions start.
pub const RAW_NAME_WIDTH: usize = 40;

/// Errors from rendering a catalog.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode catalog as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to format catalog: {0}")]
    Format(#[from] fmt::Error),
}

/// Output formats with a native renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Json,
    Markdown,
    Text,
    RawText,
}

impl ListFormat {
    /// Map `--format` and `--raw` to a native format.
    ///
    /// `raw` only affects `txt`.
    pub fn parse(format: &str, raw: bool) -> Option<Self> {
        match format {
            "json" => Some(ListFormat::Json),
            "md" => Some(ListFormat::Markdown),
            "txt" if raw => Some(ListFormat::RawText),
            "txt" => Some(ListFormat::Text),
            _ => None,
        }
    }
}

/// Render `catalog` in `format`.
pub fn render(catalog: &Catalog, format: ListFormat) -> Result<Vec<u8>, RenderError> {
    let out = match format {
        ListFormat::Json => render_json(catalog)?,
        ListFormat::Markdown => render_markdown(catalog)?,
        ListFormat::Text => render_text(catalog)?,
        ListFormat::RawText => render_raw(catalog)?,
    };
    Ok(out.into_bytes())
}

#[derive(Serialize)]
struct JsonCatalog<'a> {
    application: &'a Application,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
    commands: &'a [CommandDescriptor],
    namespaces: Vec<NamespaceGroup>,
}

fn render_json(catalog: &Catalog) -> Result<String, RenderError> {
    let view = JsonCatalog {
        application: &catalog.application,
        namespace: catalog.scope(),
        commands: &catalog.commands,
        namespaces: catalog.namespaces(),
    };
    let mut out = serde_json::to_string_pretty(&view)?;
    out.push('\n');
    Ok(out)
}

fn title(application: &Application) -> String {
    match &application.version {
        Some(version) => format!("{} {}", application.name, version),
        None => application.name.clone(),
    }
}

fn executable(application: &Application) -> &str {
    if application.executable.is_empty() {
        &application.name
    } else {
        &application.executable
    }
}

fn label(command: &CommandDescriptor) -> String {
    if command.aliases.is_empty() {
        command.name.clone()
    } else {
        format!("{} ({})", command.name, command.aliases.join(", "))
    }
}

fn render_text(catalog: &Catalog) -> Result<String, RenderError> {
    let mut out = String::new();
    writeln!(out, "{}", title(&catalog.application))?;
    writeln!(out)?;
    writeln!(out, "Usage:")?;
    writeln!(
        out,
        "  {} <command> [options] [arguments]",
        executable(&catalog.application)
    )?;
    writeln!(out)?;

    match catalog.scope() {
        Some(namespace) => writeln!(out, "Available commands for the \"{}\" namespace:", namespace)?,
        None => writeln!(out, "Available commands:")?,
    }

    let width = catalog
        .commands
        .iter()
        .map(|c| label(c).chars().count())
        .max()
        .unwrap_or(0);

    for group in catalog.namespaces() {
        if catalog.scope().is_none() && group.id != GLOBAL_NAMESPACE_ID {
            writeln!(out, " {}", group.id)?;
        }
        for name in &group.commands {
            let Some(command) = catalog.get(name) else {
                continue;
            };
            let line = format!(
                "  {:<width$}  {}",
                label(command),
                command.description,
                width = width
            );
            writeln!(out, "{}", line.trim_end())?;
        }
    }
    Ok(out)
}

fn render_raw(catalog: &Catalog) -> Result<String, RenderError> {
    let mut out = String::new();
    for command in &catalog.commands {
        let line = format!(
            "{:<width$} {}",
            command.name,
            command.description,
            width = RAW_NAME_WIDTH - 1
        );
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(out)
}

fn anchor(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn render_markdown(catalog: &Catalog) -> Result<String, RenderError> {
    let mut out = String::new();
    let executable = executable(&catalog.application);

    writeln!(out, "# {}", title(&catalog.application))?;

    for group in catalog.namespaces() {
        writeln!(out)?;
        if group.id != GLOBAL_NAMESPACE_ID {
            writeln!(out, "**{}:**", group.id)?;
            writeln!(out)?;
        }
        for name in &group.commands {
            writeln!(out, "* [`{}`](#{})", name, anchor(name))?;
        }
    }

    for command in &catalog.commands {
        writeln!(out)?;
        write_markdown_command(&mut out, executable, command)?;
    }
    Ok(out)
}

fn write_markdown_command(
    out: &mut String,
    executable: &str,
    command: &CommandDescriptor,
) -> fmt::Result {
    writeln!(out, "## `{}`", command.name)?;
    writeln!(out)?;
    if !command.description.is_empty() {
        writeln!(out, "{}", command.description)?;
        writeln!(out)?;
    }
    if !command.aliases.is_empty() {
        let aliases: Vec<_> = command.aliases.iter().map(|a| format!("`{}`", a)).collect();
        writeln!(out, "Aliases: {}", aliases.join(", "))?;
        writeln!(out)?;
    }

    writeln!(out, "### Usage")?;
    writeln!(out)?;
    writeln!(out, "```")?;
    if command.usage.is_empty() {
        writeln!(out, "{} {}", executable, command.name)?;
    }
    for usage in &command.usage {
        writeln!(out, "{} {}", executable, usage)?;
    }
    writeln!(out, "```")?;

    if !command.help.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", command.help.trim_end())?;
    }

    if !command.definition.arguments.is_empty() {
        writeln!(out)?;
        writeln!(out, "#### Arguments")?;
        writeln!(out)?;
        for (name, argument) in &command.definition.arguments {
            let required = argument
                .get("is_required")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            write!(
                out,
                "* `{}` ({})",
                name,
                if required { "required" } else { "optional" }
            )?;
            match argument.get("description").and_then(|v| v.as_str()) {
                Some(description) if !description.is_empty() => writeln!(out, ": {}", description)?,
                _ => writeln!(out)?,
            }
        }
    }

    if !command.definition.options.is_empty() {
        writeln!(out)?;
        writeln!(out, "#### Options")?;
        writeln!(out)?;
        for (key, option) in &command.definition.options {
            let name = option
                .get("name")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("--{}", key));
            write!(out, "* `{}`", name)?;
            if let Some(shortcut) = option.get("shortcut").and_then(|v| v.as_str()) {
                if !shortcut.is_empty() {
                    write!(out, " (`{}`)", shortcut)?;
                }
            }
            match option.get("description").and_then(|v| v.as_str()) {
                Some(description) if !description.is_empty() => writeln!(out, ": {}", description)?,
                _ => writeln!(out)?,
            }
        }
    }
    Ok(())
}
