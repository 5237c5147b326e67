//! SSH client configuration handling
//!
//! - Settings: file locations and session policy
//! - Host blocks and the ordered document they form
//! - Loading and atomically rewriting `~/.ssh/config`

mod host;
mod settings;
mod storage;

pub use host::{canonical_directive, ConfigDocument, Directive, HostBlock};
pub use settings::{
    EditorPolicy, Settings, CLI_PREFIX, KEY_COMMENT, NULL_DEVICE, REMOTE_SSH_EXTENSION,
    WILDCARD_ALIAS,
};
pub use storage::ConfigStore;
