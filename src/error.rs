use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SshdError>;

/// Exit code returned for command-line usage errors.
pub const USAGE_EXIT_CODE: u8 = 64;

#[derive(Debug, Error)]
pub enum SshdError {
    #[error("'{0}' is not a valid host address.")]
    InvalidHostAddress(String),

    #[error("'{0}' alias already exists. Use -o/--overwrite flag to replace.")]
    AliasAlreadyExists(String),

    #[error("'{0}' is not a valid alias.")]
    InvalidAlias(String),

    #[error("'{0}' is not a valid response.")]
    InvalidResponse(String),

    #[error("Failed to generate RSA key pair: {0}")]
    KeyPairGeneration(String),

    #[error("ssh-keygen was not found on PATH. Install an OpenSSH client to generate keys.")]
    KeyGenToolMissing,

    #[error("Editor check failed: {0}")]
    EditorNotFound(String),

    #[error("Cannot access '{}': {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Host block '{0}' already exists in the config file")]
    DuplicateAlias(String),

    #[error("Failed to render output: {0}")]
    Output(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Failed to launch '{program}': {reason}")]
    Launch { program: String, reason: String },
}

impl SshdError {
    /// Wrap an I/O failure on `path`.
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SshdError::Storage {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error kind. Values are stable across releases.
    pub fn exit_code(&self) -> u8 {
        match self {
            SshdError::InvalidHostAddress(_) => 1,
            SshdError::AliasAlreadyExists(_) => 2,
            SshdError::InvalidAlias(_) => 3,
            SshdError::InvalidResponse(_) => 9,
            SshdError::KeyPairGeneration(_) => 10,
            SshdError::KeyGenToolMissing => 11,
            SshdError::EditorNotFound(_) => 12,
            SshdError::Storage { .. } => 13,
            SshdError::DuplicateAlias(_) => 14,
            SshdError::Output(_) => 15,
            SshdError::InvalidKey(_) => 16,
            SshdError::Launch { .. } => 17,
        }
    }
}

impl From<serde_json::Error> for SshdError {
    fn from(e: serde_json::Error) -> Self {
        SshdError::Output(e.to_string())
    }
}

impl From<serde_yaml_ng::Error> for SshdError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        SshdError::Output(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = vec![
            SshdError::InvalidHostAddress("h".into()),
            SshdError::AliasAlreadyExists("a".into()),
            SshdError::InvalidAlias("a".into()),
            SshdError::InvalidResponse("r".into()),
            SshdError::KeyPairGeneration("exit 1".into()),
            SshdError::KeyGenToolMissing,
            SshdError::EditorNotFound("code".into()),
            SshdError::storage("/tmp/x", std::io::Error::other("boom")),
            SshdError::DuplicateAlias("a".into()),
            SshdError::Output("bad".into()),
            SshdError::InvalidKey("bad".into()),
            SshdError::Launch {
                program: "ssh".into(),
                reason: "not found".into(),
            },
        ];

        let codes: HashSet<u8> = errors.iter().map(SshdError::exit_code).collect();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&0));
        assert!(!codes.contains(&USAGE_EXIT_CODE));
    }

    #[test]
    fn test_user_error_codes_are_fixed() {
        assert_eq!(SshdError::InvalidHostAddress(String::new()).exit_code(), 1);
        assert_eq!(SshdError::AliasAlreadyExists(String::new()).exit_code(), 2);
        assert_eq!(SshdError::InvalidAlias(String::new()).exit_code(), 3);
        assert_eq!(SshdError::InvalidResponse(String::new()).exit_code(), 9);
    }
}
