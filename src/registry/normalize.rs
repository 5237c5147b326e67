//! Synthetic block maintenance
//!
//! Two blocks belong to the tool and must sit at the top of the file, in
//! this order:
//!
//! ```text
//! Host *
//!     GSSAPIAuthentication yes
//!     GSSAPIDelegateCredentials yes
//!
//! Host sshd_cli*
//!     IdentityFile ~/.ssh/sshd_cli_rsa
//!     IdentitiesOnly yes
//!     StrictHostKeyChecking accept-new
//!     UserKnownHostsFile /dev/null
//! ```
//!
//! SSH takes the first value it sees for each directive, so these defaults
//! win over anything users put further down.

use crate::config::{ConfigStore, Settings, NULL_DEVICE, WILDCARD_ALIAS};
use crate::error::Result;

/// Keeps the synthetic blocks present, unique and first.
pub struct InvariantMaintainer<'a> {
    settings: &'a Settings,
}

impl<'a> InvariantMaintainer<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Rebuild both synthetic blocks in place and persist the store.
    pub fn normalize(&self, store: &mut ConfigStore) -> Result<()> {
        self.apply(store)?;
        store.persist()
    }

    /// Rebuild both synthetic blocks in memory.
    pub fn apply(&self, store: &mut ConfigStore) -> Result<()> {
        let managed = self.settings.managed_alias();

        store.remove_block(WILDCARD_ALIAS);
        store.remove_block(&managed);

        let first = store.hosts().into_iter().next();
        let identity = self.settings.private_key_path();
        store.add_block(
            &managed,
            [
                ("IdentityFile", identity.display().to_string()),
                ("IdentitiesOnly", "yes".to_string()),
                ("StrictHostKeyChecking", "accept-new".to_string()),
                ("UserKnownHostsFile", NULL_DEVICE.to_string()),
            ],
            first.as_deref(),
        )?;

        // The managed block is now first, so the defaults land above it.
        let first = store.hosts().into_iter().next();
        store.add_block(
            WILDCARD_ALIAS,
            [
                ("GSSAPIAuthentication", "yes"),
                ("GSSAPIDelegateCredentials", "yes"),
            ],
            first.as_deref(),
        )?;

        tracing::debug!(managed = %managed, "synthetic host blocks normalized");
        Ok(())
    }
}
