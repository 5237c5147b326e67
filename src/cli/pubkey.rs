//! Display the managed public key

use std::fs;

use colored::Colorize;
use ssh_key::{HashAlg, PublicKey};

use crate::config::Settings;
use crate::error::{Result, SshdError};

/// Read and parse the managed public key.
pub fn read_public_key(settings: &Settings) -> Result<PublicKey> {
    let path = settings.public_key_path();
    if !path.exists() {
        return Err(SshdError::InvalidKey(format!(
            "{} not found. Run 'sshd-cli connect' once to generate it.",
            path.display()
        )));
    }

    let content = fs::read_to_string(&path).map_err(|e| SshdError::storage(&path, e))?;
    PublicKey::from_openssh(content.trim())
        .map_err(|e| SshdError::InvalidKey(format!("{}: {e}", path.display())))
}

pub fn run(settings: &Settings) -> Result<()> {
    let key = read_public_key(settings)?;
    let openssh = key
        .to_openssh()
        .map_err(|e| SshdError::InvalidKey(e.to_string()))?;

    println!();
    println!("{}", "Your sshd-cli public key:".cyan().bold());
    println!();
    println!("{}", "─".repeat(60).dimmed());
    println!("{}", openssh);
    println!("{}", "─".repeat(60).dimmed());
    println!("Fingerprint: {}", key.fingerprint(HashAlg::Sha256));
    println!();
    println!(
        "Add this key to {} on your servers.",
        "~/.ssh/authorized_keys".cyan()
    );
    println!();

    Ok(())
}
