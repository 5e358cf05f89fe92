//! Pass-through - Run any non-native command with the legacy CLI

use std::ffi::OsString;

use anyhow::Result;

use crate::cli::Context;
use crate::ui::output;

/// Run the legacy executable with `args` and inherited stdio.
///
/// A non-zero legacy exit surfaces as a `BridgeError::Exited` in the error
/// chain so the exit code can be propagated.
pub fn passthrough(ctx: &Context, args: &[OsString]) -> Result<()> {
    let legacy = ctx.legacy()?;
    output::debug(
        format!("Running {} {:?}", legacy.program().display(), args),
        ctx.verbosity,
    );
    ctx.runtime
        .block_on(legacy.exec(args.iter().cloned(), &ctx.cancel))?;
    Ok(())
}
