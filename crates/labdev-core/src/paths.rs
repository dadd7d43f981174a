use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use crate::constants::SHARE_TREE;
use crate::linker::LinkError;

/// Which shared-data tree an install targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// The active environment prefix (`<prefix>/share/jupyter`).
    System,
    /// The per-user Jupyter data directory.
    User,
}

impl InstallMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

impl Display for InstallMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The shared-data roots an install run can target, resolved once at the
/// process boundary. Core code receives this as a value and never probes
/// the environment itself.
#[derive(Debug, Clone, Default)]
pub struct ShareRoots {
    /// Active environment prefix, if any.
    pub prefix: Option<PathBuf>,
    /// Per-user Jupyter data directory, if resolvable.
    pub user_data_dir: Option<PathBuf>,
}

impl ShareRoots {
    /// Resolves the roots from the calling environment. This is the only
    /// place ambient process state is consulted; `prefix_override` (a CLI
    /// flag) wins over any activated environment.
    pub fn from_env(prefix_override: Option<PathBuf>) -> Self {
        let prefix = prefix_override
            .or_else(|| std::env::var_os("VIRTUAL_ENV").map(PathBuf::from))
            .or_else(|| std::env::var_os("CONDA_PREFIX").map(PathBuf::from));
        let user_data_dir = dirs::data_dir().map(|base| base.join("jupyter"));

        Self {
            prefix,
            user_data_dir,
        }
    }

    /// The shared-data root links are created under for `mode`.
    pub fn resolve(&self, mode: InstallMode) -> Result<PathBuf, LinkError> {
        match mode {
            InstallMode::System => self
                .prefix
                .as_deref()
                .map(|prefix| prefix.join(SHARE_TREE))
                .ok_or(LinkError::RootResolution { mode }),
            InstallMode::User => self
                .user_data_dir
                .clone()
                .ok_or(LinkError::RootResolution { mode }),
        }
    }
}

/// This package's own shared-data tree, the source side of every link.
pub fn package_share_root(project_dir: &Path) -> PathBuf {
    project_dir.join(SHARE_TREE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_mode_resolves_under_prefix() {
        let roots = ShareRoots {
            prefix: Some(PathBuf::from("/env")),
            user_data_dir: Some(PathBuf::from("/home/dev/.local/share/jupyter")),
        };

        let root = roots.resolve(InstallMode::System).unwrap();
        assert_eq!(root, PathBuf::from("/env/share/jupyter"));
    }

    #[test]
    fn user_mode_resolves_to_user_data_dir() {
        let roots = ShareRoots {
            prefix: Some(PathBuf::from("/env")),
            user_data_dir: Some(PathBuf::from("/home/dev/.local/share/jupyter")),
        };

        let root = roots.resolve(InstallMode::User).unwrap();
        assert_eq!(root, PathBuf::from("/home/dev/.local/share/jupyter"));
    }

    #[test]
    fn unresolvable_root_is_reported() {
        let roots = ShareRoots::default();

        let err = roots.resolve(InstallMode::User).unwrap_err();
        assert!(matches!(
            err,
            LinkError::RootResolution {
                mode: InstallMode::User
            }
        ));
        assert!(roots.resolve(InstallMode::System).is_err());
    }

    #[test]
    fn share_root_sits_inside_the_project() {
        let root = package_share_root(Path::new("/work/jupyterlab-presto"));
        assert_eq!(
            root,
            PathBuf::from("/work/jupyterlab-presto/share/jupyter")
        );
    }
}
