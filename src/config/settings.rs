//! Process-wide settings: file locations and session policy
//!
//! Built once in `main` and passed by reference to the store, registry and
//! session bootstrap.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, SshdError};

/// Prefix namespacing every alias owned by the tool.
pub const CLI_PREFIX: &str = "sshd_cli";

/// Alias of the global defaults block.
pub const WILDCARD_ALIAS: &str = "*";

/// Comment embedded in generated keys.
pub const KEY_COMMENT: &str = "### Auto generated key by sshd-cli ###";

/// Editor extension required for remote sessions.
pub const REMOTE_SSH_EXTENSION: &str = "ms-vscode-remote.remote-ssh";

const CONFIG_FILE: &str = "config";
const DEFAULT_EDITOR: &str = "code";

/// Known-hosts sink for the managed block.
#[cfg(windows)]
pub const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
pub const NULL_DEVICE: &str = "/dev/null";

/// What to do when the editor or its remote extension is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorPolicy {
    /// Abort the session with `EditorNotFound`.
    Require,
    /// Log a warning and carry on.
    #[default]
    Warn,
    /// Do not query the editor at all.
    Skip,
}

impl FromStr for EditorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "require" => Ok(EditorPolicy::Require),
            "warn" => Ok(EditorPolicy::Warn),
            "skip" => Ok(EditorPolicy::Skip),
            other => Err(format!(
                "unknown editor policy '{other}' (expected require, warn or skip)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    ssh_dir: PathBuf,
    editor: String,
    editor_policy: EditorPolicy,
}

impl Settings {
    /// Settings rooted at an explicit SSH directory.
    pub fn new(ssh_dir: impl Into<PathBuf>) -> Self {
        Self {
            ssh_dir: ssh_dir.into(),
            editor: DEFAULT_EDITOR.to_string(),
            editor_policy: EditorPolicy::default(),
        }
    }

    /// Settings rooted at `~/.ssh`.
    pub fn from_home() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            SshdError::storage(
                "~",
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "could not determine the home directory",
                ),
            )
        })?;
        Ok(Self::new(home.join(".ssh")))
    }

    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = editor.into();
        self
    }

    pub fn with_editor_policy(mut self, policy: EditorPolicy) -> Self {
        self.editor_policy = policy;
        self
    }

    pub fn ssh_dir(&self) -> &Path {
        &self.ssh_dir
    }

    /// Path of the SSH client configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.ssh_dir.join(CONFIG_FILE)
    }

    /// Managed private key.
    pub fn private_key_path(&self) -> PathBuf {
        self.ssh_dir.join(format!("{CLI_PREFIX}_rsa"))
    }

    /// Managed public key.
    pub fn public_key_path(&self) -> PathBuf {
        self.ssh_dir.join(format!("{CLI_PREFIX}_rsa.pub"))
    }

    /// Wildcard alias of the tool-managed identity block.
    pub fn managed_alias(&self) -> String {
        format!("{CLI_PREFIX}*")
    }

    pub fn editor(&self) -> &str {
        &self.editor
    }

    pub fn editor_policy(&self) -> EditorPolicy {
        self.editor_policy
    }
}
