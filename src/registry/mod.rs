//! Host registry: the user-facing view of `~/.ssh/config`
//!
//! Opening a registry loads the config and normalizes the synthetic blocks.
//! Every mutating call validates first and persists last, so a failed call
//! never leaves a half-applied change on disk.

mod normalize;
mod validate;

pub use normalize::InvariantMaintainer;
pub use validate::{validate_alias, validate_host_address};

use serde::Serialize;

use crate::config::{ConfigStore, Settings, CLI_PREFIX, WILDCARD_ALIAS};
use crate::error::{Result, SshdError};

/// What `list` reports for a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostSummary {
    pub hostname: String,
}

impl HostSummary {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }
}

pub struct HostRegistry {
    store: ConfigStore,
}

impl HostRegistry {
    /// Load the config file and bring the synthetic blocks in line.
    pub fn open(settings: &Settings) -> Result<Self> {
        let mut store = ConfigStore::load(settings.config_path())?;
        InvariantMaintainer::new(settings).normalize(&mut store)?;
        Ok(Self { store })
    }

    /// User hosts in file order, without the tool's own blocks.
    pub fn list(&self) -> Vec<(String, HostSummary)> {
        self.store
            .document()
            .blocks()
            .filter(|block| !is_synthetic(block.alias()))
            .map(|block| {
                (
                    block.alias().to_string(),
                    HostSummary::new(block.get("HostName").unwrap_or_default()),
                )
            })
            .collect()
    }

    pub fn exists(&self, alias: &str) -> bool {
        self.store.block(alias).is_some()
    }

    /// Add `alias` pointing at `hostname`.
    pub fn add(&mut self, hostname: &str, alias: &str, overwrite: bool) -> Result<()> {
        if !validate_host_address(hostname) {
            return Err(SshdError::InvalidHostAddress(hostname.to_string()));
        }
        check_user_alias(alias)?;

        if self.exists(alias) {
            if !overwrite {
                return Err(SshdError::AliasAlreadyExists(alias.to_string()));
            }
            tracing::info!(alias, "overwriting existing host");
            self.store.remove_block(alias);
        }

        self.store
            .add_block(alias, [("HostName", hostname)], None)?;
        self.store.persist()?;

        tracing::info!(alias, hostname, "host added");
        Ok(())
    }

    /// Remove `alias`.
    pub fn remove(&mut self, alias: &str) -> Result<()> {
        check_user_alias(alias)?;
        if !self.exists(alias) {
            return Err(SshdError::InvalidAlias(alias.to_string()));
        }

        self.store.remove_block(alias);
        self.store.persist()?;

        tracing::info!(alias, "host removed");
        Ok(())
    }
}

fn is_synthetic(alias: &str) -> bool {
    alias == WILDCARD_ALIAS || alias.starts_with(CLI_PREFIX)
}

/// Synthetic blocks are owned by the maintainer and never edited directly.
fn check_user_alias(alias: &str) -> Result<()> {
    if validate_alias(alias) && !is_synthetic(alias) {
        Ok(())
    } else {
        Err(SshdError::InvalidAlias(alias.to_string()))
    }
}

/// Alias suggested for a hostname: its first label, lowercased.
pub fn default_alias(hostname: &str) -> String {
    hostname
        .split('.')
        .next()
        .unwrap_or(hostname)
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_alias() {
        assert_eq!(default_alias("Build01.ci.example.com"), "build01");
        assert_eq!(default_alias("localhost"), "localhost");
        assert_eq!(default_alias("10.0.0.5"), "10");
    }

    #[test]
    fn test_is_synthetic() {
        assert!(is_synthetic("*"));
        assert!(is_synthetic("sshd_cli*"));
        assert!(is_synthetic("sshd_cli-box"));
        assert!(!is_synthetic("web*"));
        assert!(!is_synthetic("db"));
    }

    #[test]
    fn test_check_user_alias() {
        assert!(check_user_alias("db1").is_ok());
        for alias in ["*", "sshd_cli*", "", "a b"] {
            assert!(matches!(
                check_user_alias(alias),
                Err(SshdError::InvalidAlias(ref a)) if a == alias
            ));
        }
    }
}
