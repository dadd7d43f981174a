use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::{info, instrument};

use labdev_core::{LabdevConfig, PackageManifest};

use crate::Cli;

/// Runs the `init` command to bootstrap a labdev config for an extension
/// project.
#[instrument(skip(cli))]
pub fn run(cli: &Cli) -> Result<()> {
    let (name, module) = detect_identity(&cli.project_dir);
    let content = render_config(&name, &module);

    write_if_absent(&cli.config, &content, cli.force)
        .with_context(|| format!("failed to write '{}'", cli.config))?;

    // Round-trip the generated file so a broken template never ships.
    let cfg = LabdevConfig::load_from_file(&cli.config)?;

    info!(
        "init complete: project={}, config={}",
        cfg.project.name, cli.config
    );
    println!("next: run 'ldv develop'");

    Ok(())
}

/// Picks the project identity from the front-end manifest when present,
/// falling back to a placeholder.
fn detect_identity(project_dir: &Path) -> (String, String) {
    let name = PackageManifest::load(project_dir)
        .ok()
        .and_then(|manifest| manifest.name)
        .unwrap_or_else(|| "my-lab-extension".to_string());
    let module = name.replace('@', "").replace(['-', '/'], "_");
    (name, module)
}

fn render_config(name: &str, module: &str) -> String {
    format!(
        r#"[project]
name = "{name}"
module = "{module}"

[build]
tool = "jlpm"
script = "build:labextension"
prod_script = "build:labextension:prod"
targets = ["{module}/labextension/package.json"]
fingerprint = ["package.json", "yarn.lock"]

[templates]
# Template assets exposed to other applications, in declared order, e.g.
# links = [
#     {{ app = "nbconvert/templates", asset = "{name}" }},
# ]
links = []
"#
    )
}

fn write_if_absent(path: &str, content: &str, force: bool) -> Result<()> {
    let output = Path::new(path);

    if output.exists() && !force {
        return Err(anyhow!(
            "'{}' already exists. Re-run with --force to overwrite",
            path
        ));
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }

    fs::write(output, content)
        .with_context(|| format!("failed to write file '{}'", output.display()))
}
