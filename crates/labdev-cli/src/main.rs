use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use labdev_core::{
    CommandRef, InstallMode, LabdevConfig, PackageManifest, PrimaryCommand, ShareRoots,
    StepContext,
};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod executor;
mod init;
mod steps;
mod styles;

#[allow(unused_imports)]
use styles as s;

/// The command-line interface for labdev.
#[derive(Debug, Parser)]
#[command(name = "ldv")]
#[command(version)]
#[command(styles = s::get_clap_styles())]
#[command(
    help_template = "{bin} {version}\n\n{about-with-newline}{usage-heading} {usage}\n\n{all-args}{after-help}"
)]
#[command(about = "Build and development-install workflow for front-end Jupyter extensions")]
#[command(
    long_about = "labdev orchestrates the development workflow of a front-end extension
package: it drives the external JS toolchain to compile the bundle, checks
that the built artifacts exist, delegates the editable install to the
packaging tool, and projects the package's template assets into other
applications' shared-data trees via relative symlinks.

Common Commands:
  init              Initialize a labdev.toml in the current directory
  build:dev         Install dependencies and run the development build
  build:prod        Install dependencies and run the production build
  develop           Full development install, including template linking
  link              Re-link template assets only
"
)]
#[command(
    after_help = "\x1b[1;36mExamples:\x1b[0m\n  \x1b[32mldv init\x1b[0m                  \x1b[2m# Bootstrap a labdev.toml\x1b[0m\n  \x1b[32mldv develop\x1b[0m               \x1b[2m# Build, install editable, link templates\x1b[0m\n  \x1b[32mldv develop --user\x1b[0m        \x1b[2m# Target the per-user shared-data tree\x1b[0m\n  \x1b[32mldv build prod\x1b[0m            \x1b[2m# Production bundle (shorthand for build:prod)\x1b[0m\n  \x1b[32mldv link\x1b[0m                  \x1b[2m# Refresh template links only\x1b[0m"
)]
pub(crate) struct Cli {
    /// Command in canonical form, for example: `develop`, `build:prod`, `link`
    command: Option<String>,
    /// Optional selector (supports `ldv build prod` style)
    selector: Option<String>,
    /// Path to labdev config file.
    #[arg(long, default_value = "labdev.toml")]
    config: String,
    /// Directory containing the extension project.
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,
    /// Target the per-user shared-data tree instead of the environment prefix.
    #[arg(long, default_value_t = false)]
    user: bool,
    /// Environment prefix override for system-mode installs.
    #[arg(long)]
    prefix: Option<PathBuf>,
    /// Skip the front-end build stages during `develop`.
    #[arg(long, default_value_t = false)]
    skip_build: bool,
    /// Overwrite generated files if they already exist.
    #[arg(long, default_value_t = false)]
    force: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    debug!("parsed cli arguments: {:?}", cli);

    let command_name = match &cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!(); // Add a newline after help
            return Ok(());
        }
    };

    let command_text = match &cli.selector {
        Some(selector) => format!("{}:{}", command_name, selector),
        None => command_name.clone(),
    };

    let command = CommandRef::from_str(&command_text)
        .map_err(|e| anyhow!("failed to parse command '{}': {e}", command_text))?;

    if command.primary == PrimaryCommand::Init {
        return init::run(&cli);
    }

    let cfg = LabdevConfig::load_from_file(&cli.config)
        .with_context(|| format!("unable to load config '{}'", cli.config))?;

    execute(&cli, &cfg, &command)
}

/// Executes a validated labdev command.
fn execute(cli: &Cli, cfg: &LabdevConfig, command: &CommandRef) -> Result<()> {
    let roots = ShareRoots::from_env(cli.prefix.clone());
    let mode = if cli.user {
        InstallMode::User
    } else {
        InstallMode::System
    };

    let pipeline = match command.primary {
        PrimaryCommand::Init => return init::run(cli),
        PrimaryCommand::Build => {
            let selector = command.selector.as_deref().unwrap_or("dev");
            steps::frontend_stages(selector)
        }
        PrimaryCommand::Develop => {
            if let Ok(manifest) = PackageManifest::load(&cli.project_dir) {
                println!(
                    "develop {} v{} ({} mode)",
                    cfg.project.name, manifest.version, mode
                );
            }
            let selector = command.selector.as_deref().unwrap_or("dev");
            steps::develop_stages(selector, cli.skip_build, cli.user, roots)
        }
        PrimaryCommand::Link => steps::link_stages(mode, roots),
    };

    for name in pipeline.stage_names() {
        println!(" - {name}");
    }

    let ctx = StepContext {
        project_dir: cli.project_dir.clone(),
        config: cfg,
    };
    pipeline.run(&ctx)
}
