use anyhow::{anyhow, bail, Result};
use tracing::info;

use labdev_core::{
    fingerprint, paths, InstallMode, PackageManifest, Pipeline, ShareRoots, Step, StepContext,
    TemplateLinker,
};

use crate::executor;

/// Installs front-end dependencies through the JS toolchain, skipped when
/// the manifest fingerprint matches the recorded stamp.
pub struct DepsStep;

impl Step for DepsStep {
    fn name(&self) -> &str {
        "deps"
    }

    fn run(&self, ctx: &StepContext<'_>) -> Result<()> {
        if !PackageManifest::exists(&ctx.project_dir) {
            bail!("no package.json in '{}'", ctx.project_dir.display());
        }

        let inputs = &ctx.config.build.fingerprint;
        if fingerprint::is_current(&ctx.project_dir, inputs)? {
            info!(target: "labdev", "dependency manifests unchanged, skipping install");
            return Ok(());
        }

        let argv = labdev_ext_npm::deps_argv(&ctx.config.build.tool);
        executor::run_argv_in(&ctx.project_dir, &argv)?;
        fingerprint::record(&ctx.project_dir, inputs)
    }
}

/// Compiles the front-end bundle through the external toolchain.
pub struct BundleStep {
    selector: String,
}

impl BundleStep {
    pub fn new(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
        }
    }
}

impl Step for BundleStep {
    fn name(&self) -> &str {
        "bundle"
    }

    fn run(&self, ctx: &StepContext<'_>) -> Result<()> {
        let build = &ctx.config.build;
        let argv = labdev_ext_npm::build_argv(
            &build.tool,
            &build.script,
            &build.prod_script,
            &self.selector,
        )
        .ok_or_else(|| {
            anyhow!(
                "unknown build selector '{}' (supported: {})",
                self.selector,
                labdev_ext_npm::supported_selectors().join(", ")
            )
        })?;
        executor::run_argv_in(&ctx.project_dir, &argv)
    }
}

/// Verifies that representative build artifacts exist after the bundle.
pub struct EnsureAssetsStep;

impl Step for EnsureAssetsStep {
    fn name(&self) -> &str {
        "ensure-assets"
    }

    fn run(&self, ctx: &StepContext<'_>) -> Result<()> {
        for target in &ctx.config.build.targets {
            let path = ctx.project_dir.join(target);
            if !path.exists() {
                bail!("missing build artifact '{}'", path.display());
            }
        }
        Ok(())
    }
}

/// The base editable install, delegated to the external packaging tool.
pub struct BaseInstallStep {
    user: bool,
}

impl BaseInstallStep {
    pub fn new(user: bool) -> Self {
        Self { user }
    }
}

pub(crate) fn pip_develop_argv(user: bool) -> Vec<String> {
    let mut argv: Vec<String> = ["python", "-m", "pip", "install", "-e", "."]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    if user {
        argv.push("--user".to_string());
    }
    argv
}

impl Step for BaseInstallStep {
    fn name(&self) -> &str {
        "base-install"
    }

    fn run(&self, ctx: &StepContext<'_>) -> Result<()> {
        executor::run_argv_in(&ctx.project_dir, &pip_develop_argv(self.user))
    }
}

/// Projects the package's template assets into other applications'
/// shared-data trees via relative symlinks.
pub struct LinkTemplatesStep {
    mode: InstallMode,
    roots: ShareRoots,
}

impl LinkTemplatesStep {
    pub fn new(mode: InstallMode, roots: ShareRoots) -> Self {
        Self { mode, roots }
    }
}

impl Step for LinkTemplatesStep {
    fn name(&self) -> &str {
        "link-templates"
    }

    fn run(&self, ctx: &StepContext<'_>) -> Result<()> {
        let links = &ctx.config.templates.links;
        let linker = TemplateLinker::new(
            paths::package_share_root(&ctx.project_dir),
            self.roots.clone(),
            links.clone(),
        );
        linker.apply(self.mode)?;
        info!(
            target: "labdev",
            "linked {} template pair(s) into the {} tree",
            links.len(),
            self.mode
        );
        Ok(())
    }
}

/// The front-end build stages shared by `build` and `develop`.
pub fn frontend_stages(selector: &str) -> Pipeline {
    Pipeline::new()
        .then(Box::new(DepsStep))
        .then(Box::new(BundleStep::new(selector)))
        .then(Box::new(EnsureAssetsStep))
}

/// The full development-install pipeline. Template linking is the last
/// stage, after the base install completes; linking targets other
/// applications' trees and does not depend on this package's own install
/// state.
pub fn develop_stages(selector: &str, skip_build: bool, user: bool, roots: ShareRoots) -> Pipeline {
    let mode = if user {
        InstallMode::User
    } else {
        InstallMode::System
    };
    let pipeline = if skip_build {
        Pipeline::new()
    } else {
        frontend_stages(selector)
    };
    pipeline
        .then(Box::new(BaseInstallStep::new(user)))
        .then(Box::new(LinkTemplatesStep::new(mode, roots)))
}

/// Template linking alone, for iterating on templates without reinstalling.
pub fn link_stages(mode: InstallMode, roots: ShareRoots) -> Pipeline {
    Pipeline::new().then(Box::new(LinkTemplatesStep::new(mode, roots)))
}
