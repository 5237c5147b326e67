//! Session commands: connect and kill

use colored::Colorize;

use crate::config::{EditorPolicy, Settings};
use crate::error::{Result, SshdError};
use crate::registry::HostRegistry;
use crate::session::{
    CodeEditor, Connector, ProcessConnector, SessionBootstrap, SessionMode, SshKeygen,
};

use super::hosts::{print_hosts, OutputFormat};
use super::{info, interactive_mode, prompt};

pub fn connect(settings: &Settings, alias: Option<String>, terminal: bool) -> Result<()> {
    let registry = HostRegistry::open(settings)?;
    let alias = resolve_alias(&registry, alias, "Please enter an host alias to start remote session: ")?;

    let mode = if terminal {
        SessionMode::Terminal
    } else {
        SessionMode::Editor
    };

    let editor = CodeEditor::new(settings.editor());
    let keygen = SshKeygen;
    let mut bootstrap = SessionBootstrap::new(&registry, settings, &editor, &keygen);
    if mode == SessionMode::Terminal {
        bootstrap = bootstrap.with_editor_policy(EditorPolicy::Skip);
    }
    bootstrap.run(&alias)?;

    info(&format!("Starting session on {}.", alias.cyan().bold()));
    ProcessConnector::new(settings.editor()).connect(&alias, mode)
}

pub fn kill(settings: &Settings, alias: Option<String>) -> Result<()> {
    let registry = HostRegistry::open(settings)?;
    let alias = resolve_alias(&registry, alias, "Please enter the host alias to stop: ")?;

    if !registry.exists(&alias) {
        return Err(SshdError::InvalidAlias(alias));
    }

    if ProcessConnector::new(settings.editor()).disconnect(&alias)? {
        info(&format!("Session on '{alias}' stopped."));
    } else {
        info(&format!("No active session on '{alias}'."));
    }
    Ok(())
}

fn resolve_alias(registry: &HostRegistry, alias: Option<String>, label: &str) -> Result<String> {
    match alias.filter(|a| !a.is_empty()) {
        Some(alias) => Ok(alias),
        None => {
            interactive_mode();
            print_hosts(registry, OutputFormat::Table)?;
            prompt(label)
        }
    }
}
