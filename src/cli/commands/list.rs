//! list command - Show the merged command catalog

use std::io::{self, Write};

use anyhow::{Context as _, Result};

use super::native_commands;
use crate::catalog::{self, Catalog, ListFormat, ListRequest};
use crate::cli::Context;
use crate::core::config::Config;
use crate::ui::output;

/// List commands from the legacy executable merged with native ones.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `namespace` - Only list commands in this namespace
/// * `format` - `txt`, `json` or `md`; anything else is rendered by the legacy CLI
/// * `raw` - Plain name/description lines (`txt` only)
/// * `all` - Include hidden commands
pub fn list(
    ctx: &Context,
    namespace: Option<&str>,
    format: &str,
    raw: bool,
    all: bool,
) -> Result<()> {
    let legacy = ctx.legacy()?;

    let Some(list_format) = ListFormat::parse(format, raw) else {
        output::debug(
            format!("Format '{}' is rendered by the legacy CLI", format),
            ctx.verbosity,
        );
        let args = delegated_args(format, namespace, all);
        ctx.runtime.block_on(legacy.exec(args, &ctx.cancel))?;
        return Ok(());
    };

    let request = ListRequest {
        namespace: namespace.map(str::to_string),
        all,
    };
    let fetched = ctx
        .runtime
        .block_on(catalog::fetch(&legacy, &request, &ctx.cancel))?;
    output::debug(
        format!("Legacy CLI listed {} commands", fetched.commands.len()),
        ctx.verbosity,
    );

    let merged = build_catalog(fetched, &ctx.config, all);
    let rendered = catalog::render(&merged, list_format).context("Failed to render command list")?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&rendered)?;
    stdout.flush()?;
    Ok(())
}

/// Merge native commands and present the catalog as this application.
fn build_catalog(fetched: Catalog, config: &Config, all: bool) -> Catalog {
    let mut merged = catalog::merge(fetched, &native_commands());
    merged.application.name = config.application.name.clone();
    merged.application.executable = config.application.executable.clone();
    if !all {
        merged.retain_visible();
    }
    merged
}

fn delegated_args(format: &str, namespace: Option<&str>, all: bool) -> Vec<String> {
    let mut args = vec!["list".to_string(), format!("--format={}", format)];
    if all {
        args.push("--all".to_string());
    }
    if let Some(namespace) = namespace {
        args.push(namespace.to_string());
    }
    args
}
