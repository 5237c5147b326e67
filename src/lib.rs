//! sshd-cli - SSH host aliases and remote development sessions
//!
//! This crate:
//! - Manages host aliases in `~/.ssh/config` without disturbing other entries
//! - Keeps a wildcard defaults block and a managed identity block at the top of the file
//! - Checks alias, editor and key pair before starting a remote session

pub mod cli;
pub mod config;
pub mod error;
pub mod registry;
pub mod session;

pub use error::{Result, SshdError};
