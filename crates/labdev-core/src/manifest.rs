use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::constants::MANIFEST_NODE;

/// The subset of the front-end `package.json` this tool cares about.
///
/// The extension's version lives in the JS manifest, not in any Python or
/// labdev file; it is read here once and surfaced in operator output.
#[derive(Debug, Deserialize)]
pub struct PackageManifest {
    pub version: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl PackageManifest {
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(MANIFEST_NODE);
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read manifest '{}'", path.display()))?;
        let manifest = serde_json::from_str::<Self>(&text)
            .with_context(|| format!("failed to parse JSON manifest '{}'", path.display()))?;
        Ok(manifest)
    }

    /// True when a front-end manifest is present at all.
    pub fn exists(project_dir: &Path) -> bool {
        project_dir.join(MANIFEST_NODE).exists()
    }
}
