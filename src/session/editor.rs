//! External editor queries

use std::process::{Command, Stdio};

use crate::error::{Result, SshdError};

/// Editor used to open remote sessions.
pub trait Editor {
    /// Name shown in messages.
    fn name(&self) -> &str;

    fn is_available(&self) -> bool;

    /// Installed extension identifiers.
    fn list_extensions(&self) -> Result<Vec<String>>;
}

/// VS Code (or a compatible fork) invoked through its CLI launcher.
pub struct CodeEditor {
    binary: String,
}

impl CodeEditor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Editor for CodeEditor {
    fn name(&self) -> &str {
        &self.binary
    }

    fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    fn list_extensions(&self) -> Result<Vec<String>> {
        let binary = which::which(&self.binary)
            .map_err(|_| SshdError::EditorNotFound(format!("'{}' was not found on PATH", self.binary)))?;

        let output = Command::new(binary)
            .arg("--list-extensions")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| SshdError::EditorNotFound(format!("failed to run '{}': {e}", self.binary)))?;

        Ok(parse_extensions(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn parse_extensions(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
