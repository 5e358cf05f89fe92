//! version command - Print wrapper and legacy versions

use anyhow::Result;

use crate::cli::Context;
use crate::core::paths::CachePaths;
use crate::legacy::Payload;
use crate::ui::output;

/// Print the version line, plus payload details with `--debug`.
pub fn version(ctx: &Context) -> Result<()> {
    let payload = Payload::embedded();
    println!(
        "{}",
        version_line(
            &ctx.config.application.name,
            env!("CARGO_PKG_VERSION"),
            &payload.version
        )
    );

    if ctx.debug() {
        output::debug(format!("Legacy payload SHA-256: {}", payload.sha256), ctx.verbosity);
        match CachePaths::from_config(&ctx.config) {
            Some(paths) => output::debug(
                format!(
                    "Legacy payload path: {}",
                    paths.payload_path(&payload.file_name).display()
                ),
                ctx.verbosity,
            ),
            None => output::debug("No user cache directory available", ctx.verbosity),
        }
    }
    Ok(())
}

/// `<name> <version> (Wrapped ...)`.
///
/// The legacy version is only spelled out when its base (the part before the
/// first `-`) differs from the wrapper's.
pub fn version_line(name: &str, version: &str, legacy_version: &str) -> String {
    if base(version) == base(legacy_version) {
        format!("{} {} (Wrapped)", name, version)
    } else {
        format!("{} {} (Wrapped legacy CLI {})", name, version, legacy_version)
    }
}

fn base(version: &str) -> &str {
    version.split('-').next().unwrap_or(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn different_versions_are_both_shown() {
        assert_eq!(
            version_line("Acme CLI", "0.3.0", "4.10.0"),
            "Acme CLI 0.3.0 (Wrapped legacy CLI 4.10.0)"
        );
    }

    #[test]
    fn same_base_version_is_shown_once() {
        assert_eq!(
            version_line("Acme CLI", "4.10.0", "4.10.0-beta.2"),
            "Acme CLI 4.10.0 (Wrapped)"
        );
        assert_eq!(
            version_line("Acme CLI", "4.10.0-dev", "4.10.0"),
            "Acme CLI 4.10.0-dev (Wrapped)"
        );
    }
}
