use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Runs an external toolchain invocation inside `dir`, surfacing a non-zero
/// exit status as an error.
pub fn run_argv_in(dir: &Path, argv: &[String]) -> Result<()> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("empty command argv"))?;

    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .status()
        .with_context(|| format!("failed to start command '{} {}'", program, args.join(" ")))?;

    if !status.success() {
        bail!(
            "command failed with status {}: {} {}",
            status,
            program,
            args.join(" ")
        );
    }

    Ok(())
}
