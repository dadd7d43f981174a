use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::LabdevConfig;

/// Ambient data handed to every stage of an install run.
pub struct StepContext<'a> {
    /// Directory containing the extension project.
    pub project_dir: PathBuf,
    pub config: &'a LabdevConfig,
}

/// One named stage of an install workflow.
pub trait Step {
    /// Stage name, shown in operator output and failure messages.
    fn name(&self) -> &str;
    fn run(&self, ctx: &StepContext<'_>) -> Result<()>;
}

/// An ordered, single-pass sequence of install stages.
///
/// Stage order is part of the contract: stages run exactly once, in the
/// order they were added, and the first failure stops the run with the
/// failing stage named.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Step>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: Box<dyn Step>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    pub fn run(&self, ctx: &StepContext<'_>) -> Result<()> {
        for step in &self.steps {
            info!(target: "labdev", "stage {}", step.name());
            step.run(ctx)
                .with_context(|| format!("stage '{}' failed", step.name()))?;
        }
        Ok(())
    }
}
