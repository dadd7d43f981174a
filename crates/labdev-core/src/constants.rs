//! Constants used across the labdev workspace.

/// The filename for labdev's primary configuration.
pub const CONFIG_FILE: &str = "labdev.toml";

/// The manifest file of the front-end package.
pub const MANIFEST_NODE: &str = "package.json";

/// Lockfiles that pin the front-end dependency tree.
pub const LOCKFILE_YARN: &str = "yarn.lock";
pub const LOCKFILE_NPM: &str = "package-lock.json";

/// Stamp recording the manifest fingerprint of the last dependency install.
/// Lives under node_modules so wiping it forces a reinstall.
pub const FINGERPRINT_STAMP: &str = "node_modules/.labdev-fingerprint";

/// The shared-data subtree Jupyter-style applications search for assets.
pub const SHARE_TREE: &str = "share/jupyter";
