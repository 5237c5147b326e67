//! Hand-off to the program that actually opens the session

use std::process::{Command, Stdio};

use crate::error::{Result, SshdError};

/// How a ready session is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Remote window in the editor.
    Editor,
    /// Plain `ssh` in the current terminal.
    Terminal,
}

pub trait Connector {
    fn connect(&self, alias: &str, mode: SessionMode) -> Result<()>;

    /// Close a running multiplexed session. Returns `false` when none was running.
    fn disconnect(&self, alias: &str) -> Result<bool>;
}

/// Spawns `ssh` or the editor launcher.
pub struct ProcessConnector {
    editor: String,
}

impl ProcessConnector {
    pub fn new(editor: impl Into<String>) -> Self {
        Self {
            editor: editor.into(),
        }
    }

    /// Command line used to open `alias` in `mode`.
    pub fn command_line(&self, alias: &str, mode: SessionMode) -> (String, Vec<String>) {
        match mode {
            SessionMode::Editor => (
                self.editor.clone(),
                vec![
                    "--remote".to_string(),
                    format!("ssh-remote+{alias}"),
                ],
            ),
            SessionMode::Terminal => ("ssh".to_string(), vec![alias.to_string()]),
        }
    }
}

impl Connector for ProcessConnector {
    fn connect(&self, alias: &str, mode: SessionMode) -> Result<()> {
        let (program, args) = self.command_line(alias, mode);
        let binary = which::which(&program).map_err(|_| SshdError::Launch {
            program: program.clone(),
            reason: "not found on PATH".to_string(),
        })?;

        tracing::info!(alias, ?mode, "starting session");
        let status = Command::new(binary)
            .args(&args)
            .status()
            .map_err(|e| SshdError::Launch {
                program: program.clone(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            tracing::warn!(alias, code = ?status.code(), "session command exited unsuccessfully");
        }
        Ok(())
    }

    fn disconnect(&self, alias: &str) -> Result<bool> {
        let Ok(ssh) = which::which("ssh") else {
            return Ok(false);
        };

        let status = Command::new(ssh)
            .args(["-O", "exit", alias])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| SshdError::Launch {
                program: "ssh".to_string(),
                reason: e.to_string(),
            })?;

        Ok(status.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_command_line() {
        let connector = ProcessConnector::new("code");
        let (program, args) = connector.command_line("db1", SessionMode::Editor);
        assert_eq!(program, "code");
        assert_eq!(args, vec!["--remote", "ssh-remote+db1"]);
    }

    #[test]
    fn test_terminal_command_line() {
        let connector = ProcessConnector::new("code");
        let (program, args) = connector.command_line("db1", SessionMode::Terminal);
        assert_eq!(program, "ssh");
        assert_eq!(args, vec!["db1"]);
    }
}
