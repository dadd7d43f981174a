use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::constants::{LOCKFILE_NPM, LOCKFILE_YARN, MANIFEST_NODE};

#[derive(Debug, Deserialize)]
pub struct LabdevConfig {
    pub project: ProjectConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
}

impl LabdevConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {path}"))?;
        let cfg = toml::from_str::<Self>(&text)
            .with_context(|| format!("failed to parse TOML config: {path}"))?;
        Ok(cfg)
    }
}

#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    /// The Python module that receives the built bundle as package data.
    pub module: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// The JS toolchain binary used for dependency install and builds.
    pub tool: String,
    /// Manifest script for the development build.
    pub script: String,
    /// Manifest script for the production build.
    pub prod_script: String,
    /// Representative files that must exist after a successful build.
    pub targets: Vec<String>,
    /// Files whose content identity gates dependency installation.
    pub fingerprint: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            tool: "jlpm".to_string(),
            script: "build:labextension".to_string(),
            prod_script: "build:labextension:prod".to_string(),
            targets: Vec::new(),
            fingerprint: vec![
                MANIFEST_NODE.to_string(),
                LOCKFILE_YARN.to_string(),
                LOCKFILE_NPM.to_string(),
            ],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplatesConfig {
    /// Template assets projected into other applications' shared-data trees,
    /// in declared order.
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

/// One template asset to expose inside one consumer application's data tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkSpec {
    /// Application subtree below the shared-data root, e.g. "nbconvert/templates".
    pub app: PathBuf,
    /// Asset directory name exposed inside that subtree.
    pub asset: String,
}
