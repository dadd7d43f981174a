//! Argv mappings for the external JS toolchain (`jlpm`, `npm`, ...).
//!
//! The toolchain itself is an external collaborator; this crate only knows
//! how to spell its invocations. Running them is the CLI executor's job.

/// Build selectors the toolchain mapping understands.
pub fn supported_selectors() -> &'static [&'static str] {
    &["dev", "prod"]
}

/// Dependency installation for the front-end package.
pub fn deps_argv(tool: &str) -> Vec<String> {
    argv(&[tool, "install"])
}

/// Invocation of a manifest script through the toolchain.
pub fn run_script_argv(tool: &str, script: &str) -> Vec<String> {
    argv(&[tool, "run", script])
}

/// Maps a build selector to the toolchain invocation for it, or `None` for
/// a selector the mapping does not understand.
pub fn build_argv(tool: &str, script: &str, prod_script: &str, selector: &str) -> Option<Vec<String>> {
    match selector {
        "dev" => Some(run_script_argv(tool, script)),
        "prod" => Some(run_script_argv(tool, prod_script)),
        _ => None,
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}
