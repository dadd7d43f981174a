use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::constants::FINGERPRINT_STAMP;

/// Computes a deterministic SHA256 fingerprint over a list of input files.
///
/// The fingerprint captures the identity of the front-end dependency
/// manifests so an unchanged tree can skip the expensive dependency
/// install step entirely.
pub fn compute(base_dir: &Path, inputs: &[String]) -> Result<String> {
    let mut hasher = Sha256::new();

    // Hash in name order so the result does not depend on config ordering.
    let mut sorted = inputs.to_owned();
    sorted.sort();

    for input in sorted {
        let path = base_dir.join(&input);
        hasher.update(input.as_bytes());
        hasher.update(b"\0");

        // Optional inputs (a lockfile may not exist yet) are recorded as
        // absent rather than rejected.
        if path.is_file() {
            let content = std::fs::read(&path)
                .with_context(|| format!("failed to read fingerprint input '{}'", path.display()))?;
            hasher.update(&content);
            debug!("fingerprint: mixed {} ({} bytes)", input, content.len());
        } else {
            hasher.update(b"\0absent\0");
            debug!("fingerprint: input {} is absent", input);
        }
    }

    Ok(hex::encode(hasher.finalize()))
}

/// True when the recorded stamp matches the current fingerprint of `inputs`.
/// A missing stamp means the dependency install has never run.
pub fn is_current(project_dir: &Path, inputs: &[String]) -> Result<bool> {
    let stamp_path = project_dir.join(FINGERPRINT_STAMP);
    let Ok(recorded) = std::fs::read_to_string(&stamp_path) else {
        return Ok(false);
    };
    let current = compute(project_dir, inputs)?;
    Ok(recorded.trim() == current)
}

/// Records the current fingerprint of `inputs` after a successful install.
pub fn record(project_dir: &Path, inputs: &[String]) -> Result<()> {
    let current = compute(project_dir, inputs)?;
    let stamp_path = project_dir.join(FINGERPRINT_STAMP);
    if let Some(parent) = stamp_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create stamp directory '{}'", parent.display()))?;
    }
    std::fs::write(&stamp_path, current)
        .with_context(|| format!("failed to write stamp '{}'", stamp_path.display()))
}
