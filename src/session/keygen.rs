//! RSA key pair generation through `ssh-keygen`

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Result, SshdError};

/// Key size passed to `ssh-keygen -b`.
pub const RSA_BITS: u32 = 2048;

/// Produces a key pair at `output` (private) and `output.pub` (public).
pub trait KeyGenerator {
    /// Returns the generator's exit status; 0 is success.
    fn generate(&self, output: &Path, comment: &str) -> Result<i32>;
}

/// Runs the OpenSSH `ssh-keygen` binary found on PATH.
pub struct SshKeygen;

impl SshKeygen {
    fn binary() -> Result<std::path::PathBuf> {
        which::which("ssh-keygen").map_err(|_| SshdError::KeyGenToolMissing)
    }

    /// Arguments for an unencrypted RSA key.
    pub fn args(output: &Path, comment: &str) -> Vec<String> {
        vec![
            "-t".to_string(),
            "rsa".to_string(),
            "-b".to_string(),
            RSA_BITS.to_string(),
            "-N".to_string(),
            String::new(),
            "-C".to_string(),
            comment.to_string(),
            "-f".to_string(),
            output.display().to_string(),
        ]
    }
}

impl KeyGenerator for SshKeygen {
    fn generate(&self, output: &Path, comment: &str) -> Result<i32> {
        let binary = Self::binary()?;
        tracing::debug!(binary = %binary.display(), output = %output.display(), "running ssh-keygen");

        let status = Command::new(&binary)
            .args(Self::args(output, comment))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|e| SshdError::KeyPairGeneration(e.to_string()))?;

        // A missing code means the process was killed by a signal.
        Ok(status.code().unwrap_or(-1))
    }
}
