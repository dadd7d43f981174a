use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::LinkSpec;
use crate::paths::{InstallMode, ShareRoots};

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("could not determine the {mode} shared-data root")]
    RootResolution { mode: InstallMode },
    #[error("failed to create link directory '{path}'")]
    DirCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove existing entry at '{path}'")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to create symlink at '{path}'")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One planned link: where the asset lives in this package's share tree,
/// where it must appear under the resolved shared-data root, and the
/// relative value the link will carry. Recomputed on every run, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOp {
    pub source: PathBuf,
    pub target: PathBuf,
    pub rel_source: PathBuf,
}

impl LinkOp {
    pub fn plan(share_root: &Path, target_root: &Path, spec: &LinkSpec) -> Self {
        let source = share_root.join(&spec.app).join(&spec.asset);
        let target = target_root.join(&spec.app).join(&spec.asset);
        let parent = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| target_root.to_path_buf());
        let rel_source = relative_from(&source, &parent);

        Self {
            source,
            target,
            rel_source,
        }
    }
}

/// Projects this package's template assets into other applications'
/// shared-data trees via relative symbolic links, as the last stage of a
/// development install.
pub struct TemplateLinker {
    share_root: PathBuf,
    roots: ShareRoots,
    specs: Vec<LinkSpec>,
}

impl TemplateLinker {
    pub fn new(share_root: PathBuf, roots: ShareRoots, specs: Vec<LinkSpec>) -> Self {
        Self {
            share_root,
            roots,
            specs,
        }
    }

    /// Establishes one relative symlink per configured pair, in declared
    /// order, under the shared-data root for `mode`.
    ///
    /// The root is resolved once for the whole run. Any entry already
    /// occupying a target is replaced; re-running with identical inputs is
    /// idempotent. A directory-creation or removal failure aborts the run,
    /// leaving earlier pairs linked.
    pub fn apply(&self, mode: InstallMode) -> Result<(), LinkError> {
        let target_root = self.roots.resolve(mode)?;

        for spec in &self.specs {
            let op = LinkOp::plan(&self.share_root, &target_root, spec);
            establish(&op)?;
            info!(
                target: "labdev",
                "{} -> {}",
                op.rel_source.display(),
                op.target.display()
            );
        }

        Ok(())
    }
}

fn establish(op: &LinkOp) -> Result<(), LinkError> {
    if let Some(parent) = op.target.parent() {
        fs::create_dir_all(parent).map_err(|source| LinkError::DirCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    remove_existing(&op.target)?;

    // The source may not have been staged yet; the link is created anyway
    // and resolved lazily by consumers.
    if !op.source.exists() {
        debug!(target: "labdev", "link source {} does not exist yet", op.source.display());
    }

    create_symlink(&op.rel_source, &op.target).map_err(|source| LinkError::Create {
        path: op.target.clone(),
        source,
    })
}

/// Removes whatever occupies `target`. Absence is not an error; a populated
/// directory is (only empty directories are removed).
fn remove_existing(target: &Path) -> Result<(), LinkError> {
    let meta = match fs::symlink_metadata(target) {
        Ok(meta) => meta,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(LinkError::Remove {
                path: target.to_path_buf(),
                source,
            })
        }
    };

    let removed = if meta.is_dir() {
        fs::remove_dir(target)
    } else {
        fs::remove_file(target)
    };

    removed.map_err(|source| LinkError::Remove {
        path: target.to_path_buf(),
        source,
    })
}

fn create_symlink(rel_source: &Path, target: &Path) -> io::Result<()> {
    #[cfg(target_family = "unix")]
    std::os::unix::fs::symlink(rel_source, target)?;

    #[cfg(target_family = "windows")]
    std::os::windows::fs::symlink_dir(rel_source, target)?;

    Ok(())
}

/// The relative path from `base` to `path`. Both are expected to be
/// absolute; the result stays valid when the whole tree is relocated.
pub fn relative_from(path: &Path, base: &Path) -> PathBuf {
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    let shared = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in shared..base_parts.len() {
        rel.push("..");
    }
    for part in &path_parts[shared..] {
        rel.push(part.as_os_str());
    }

    if rel.as_os_str().is_empty() {
        rel.push(".");
    }

    rel
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spec(app: &str, asset: &str) -> LinkSpec {
        LinkSpec {
            app: PathBuf::from(app),
            asset: asset.to_string(),
        }
    }

    /// A project with its share tree staged, plus an empty environment
    /// prefix to link into.
    fn fixture() -> (TempDir, PathBuf, ShareRoots) {
        let dir = tempfile::tempdir().unwrap();
        let share_root = dir.path().join("pkg/share/jupyter");
        fs::create_dir_all(share_root.join("nbconvert/templates/presto")).unwrap();
        fs::create_dir_all(share_root.join("voila/templates/presto")).unwrap();

        let roots = ShareRoots {
            prefix: Some(dir.path().join("env")),
            user_data_dir: Some(dir.path().join("home/.local/share/jupyter")),
        };

        (dir, share_root, roots)
    }

    fn presto_specs() -> Vec<LinkSpec> {
        vec![
            spec("nbconvert/templates", "presto"),
            spec("voila/templates", "presto"),
        ]
    }

    #[test]
    fn relative_from_walks_up_to_the_shared_ancestor() {
        let rel = relative_from(
            Path::new("/pkg/share/jupyter/nbconvert/templates/presto"),
            Path::new("/env/share/jupyter/nbconvert/templates"),
        );
        assert_eq!(
            rel,
            PathBuf::from("../../../../../pkg/share/jupyter/nbconvert/templates/presto")
        );

        let sibling = relative_from(Path::new("/a/b/c"), Path::new("/a/b"));
        assert_eq!(sibling, PathBuf::from("c"));

        let same = relative_from(Path::new("/a/b"), Path::new("/a/b"));
        assert_eq!(same, PathBuf::from("."));
    }

    #[test]
    fn apply_creates_relative_links_for_every_pair() {
        let (_dir, share_root, roots) = fixture();
        let linker = TemplateLinker::new(share_root.clone(), roots.clone(), presto_specs());

        linker.apply(InstallMode::System).expect("apply should succeed");

        let target_root = roots.resolve(InstallMode::System).unwrap();
        for app in ["nbconvert/templates", "voila/templates"] {
            let target = target_root.join(app).join("presto");
            let meta = fs::symlink_metadata(&target).expect("target should exist");
            assert!(meta.file_type().is_symlink());

            // The stored value is relative and dereferences to the staged source.
            let stored = fs::read_link(&target).unwrap();
            assert!(stored.is_relative());
            let resolved = target.parent().unwrap().join(&stored).canonicalize().unwrap();
            assert_eq!(
                resolved,
                share_root.join(app).join("presto").canonicalize().unwrap()
            );
        }
    }

    #[test]
    fn second_apply_is_idempotent() {
        let (_dir, share_root, roots) = fixture();
        let linker = TemplateLinker::new(share_root, roots.clone(), presto_specs());

        linker.apply(InstallMode::System).unwrap();
        let target = roots
            .resolve(InstallMode::System)
            .unwrap()
            .join("nbconvert/templates/presto");
        let before = fs::read_link(&target).unwrap();

        linker.apply(InstallMode::System).expect("re-apply should succeed");
        assert_eq!(fs::read_link(&target).unwrap(), before);
    }

    #[test]
    fn stale_link_is_replaced() {
        let (dir, share_root, roots) = fixture();
        let target_root = roots.resolve(InstallMode::System).unwrap();
        let target = target_root.join("nbconvert/templates/presto");

        fs::create_dir_all(target.parent().unwrap()).unwrap();
        let elsewhere = dir.path().join("stale");
        fs::create_dir_all(&elsewhere).unwrap();
        create_symlink(&elsewhere, &target).unwrap();

        let linker = TemplateLinker::new(share_root.clone(), roots, presto_specs());
        linker.apply(InstallMode::System).unwrap();

        let resolved = target
            .parent()
            .unwrap()
            .join(fs::read_link(&target).unwrap())
            .canonicalize()
            .unwrap();
        assert_eq!(
            resolved,
            share_root
                .join("nbconvert/templates/presto")
                .canonicalize()
                .unwrap()
        );
    }

    #[test]
    fn regular_file_at_target_is_replaced() {
        let (_dir, share_root, roots) = fixture();
        let target = roots
            .resolve(InstallMode::System)
            .unwrap()
            .join("nbconvert/templates/presto");
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, b"stray").unwrap();

        let linker = TemplateLinker::new(share_root, roots, presto_specs());
        linker.apply(InstallMode::System).unwrap();

        assert!(fs::symlink_metadata(&target).unwrap().file_type().is_symlink());
    }

    #[test]
    fn populated_directory_at_target_is_fatal() {
        let (_dir, share_root, roots) = fixture();
        let target = roots
            .resolve(InstallMode::System)
            .unwrap()
            .join("nbconvert/templates/presto");
        fs::create_dir_all(target.join("occupied")).unwrap();

        let linker = TemplateLinker::new(share_root, roots, presto_specs());
        let err = linker.apply(InstallMode::System).unwrap_err();
        assert!(matches!(err, LinkError::Remove { .. }));
    }

    #[test]
    fn missing_parent_chain_is_created() {
        let (_dir, share_root, roots) = fixture();
        let target_root = roots.resolve(InstallMode::System).unwrap();
        assert!(!target_root.exists());

        let linker = TemplateLinker::new(share_root, roots, presto_specs());
        linker.apply(InstallMode::System).unwrap();

        assert!(target_root.join("nbconvert/templates").is_dir());
        assert!(target_root.join("voila/templates").is_dir());
    }

    #[test]
    fn user_mode_links_under_the_user_data_dir() {
        let (_dir, share_root, roots) = fixture();
        let linker = TemplateLinker::new(share_root, roots.clone(), presto_specs());

        linker.apply(InstallMode::User).unwrap();

        let target = roots
            .resolve(InstallMode::User)
            .unwrap()
            .join("voila/templates/presto");
        assert!(fs::symlink_metadata(&target).unwrap().file_type().is_symlink());
    }

    #[test]
    fn unresolvable_root_fails_before_any_mutation() {
        let (dir, share_root, _) = fixture();
        let roots = ShareRoots {
            prefix: Some(dir.path().join("env")),
            user_data_dir: None,
        };
        let linker = TemplateLinker::new(share_root, roots, presto_specs());

        let err = linker.apply(InstallMode::User).unwrap_err();
        assert!(matches!(
            err,
            LinkError::RootResolution {
                mode: InstallMode::User
            }
        ));
        assert!(!dir.path().join("env").exists());
    }

    #[test]
    fn unstaged_source_still_produces_a_link() {
        let dir = tempfile::tempdir().unwrap();
        let share_root = dir.path().join("pkg/share/jupyter");
        let roots = ShareRoots {
            prefix: Some(dir.path().join("env")),
            user_data_dir: None,
        };

        let linker = TemplateLinker::new(share_root, roots.clone(), presto_specs());
        linker.apply(InstallMode::System).expect("broken links are allowed");

        let target = roots
            .resolve(InstallMode::System)
            .unwrap()
            .join("nbconvert/templates/presto");
        assert!(fs::symlink_metadata(&target).unwrap().file_type().is_symlink());
        // Dangling: the link itself exists, its referent does not.
        assert!(!target.exists());
    }
}
