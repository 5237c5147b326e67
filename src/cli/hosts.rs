//! Host management commands

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::config::Settings;
use crate::error::{Result, SshdError};
use crate::registry::{default_alias, validate_host_address, HostRegistry, HostSummary};

use super::{confirm, info, interactive_mode, prompt};

/// Output format of `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Serialize)]
struct HostEntry {
    host: String,
    config: HostSummary,
}

#[derive(Debug, Serialize)]
struct HostsDocument {
    hosts: Vec<HostEntry>,
}

/// Add a new host, prompting for anything not given on the command line.
pub fn add(
    settings: &Settings,
    hostname: Option<String>,
    alias: Option<String>,
    mut overwrite: bool,
) -> Result<()> {
    let mut registry = HostRegistry::open(settings)?;

    let (hostname, alias) = match hostname.filter(|h| !h.is_empty()) {
        Some(hostname) => {
            let alias = match alias.filter(|a| !a.is_empty()) {
                Some(alias) => alias,
                None => {
                    let alias = default_alias(&hostname);
                    info(&format!("Alias not passed, defaulting to: {}", alias.cyan().bold()));
                    alias
                }
            };
            (hostname, alias)
        }
        None => {
            interactive_mode();
            let hostname = prompt(" Enter the host address: ")?;
            if !validate_host_address(&hostname) {
                return Err(SshdError::InvalidHostAddress(hostname));
            }

            let suggested = default_alias(&hostname);
            let alias = prompt(&format!(
                " Enter a short alias for the host (defaults to {}): ",
                suggested.cyan().bold()
            ))?;
            let alias = if alias.is_empty() { suggested } else { alias };

            if registry.exists(&alias) {
                overwrite = confirm(&format!(
                    " {} already exists. Do you want to overwrite it?",
                    alias.cyan().bold()
                ))?;
            }
            (hostname, alias)
        }
    };

    registry.add(&hostname, &alias, overwrite)?;
    info(&format!("New host with alias '{alias}' added successfully."));
    Ok(())
}

/// Remove a host, prompting for the alias when it is not given.
pub fn remove(settings: &Settings, alias: Option<String>) -> Result<()> {
    let mut registry = HostRegistry::open(settings)?;

    let alias = match alias.filter(|a| !a.is_empty()) {
        Some(alias) => alias,
        None => {
            interactive_mode();
            print_hosts(&registry, OutputFormat::Table)?;
            prompt("Please enter the alias of the host to remove: ")?
        }
    };

    registry.remove(&alias)?;
    info(&format!("Host with alias '{alias}' removed successfully."));
    Ok(())
}

/// List saved hosts.
pub fn list(settings: &Settings, format: OutputFormat) -> Result<()> {
    let registry = HostRegistry::open(settings)?;
    print_hosts(&registry, format)
}

pub(crate) fn print_hosts(registry: &HostRegistry, format: OutputFormat) -> Result<()> {
    let hosts = registry.list();
    println!("Total Hosts: {}.", hosts.len());

    let rendered = match format {
        OutputFormat::Table => render_table(&hosts),
        OutputFormat::Json => format!("\n{}", render_json(&hosts)?),
        OutputFormat::Yaml => format!("\n{}", render_yaml(&hosts)?),
    };
    println!("{rendered}");
    Ok(())
}

fn entries(hosts: &[(String, HostSummary)]) -> Vec<HostEntry> {
    hosts
        .iter()
        .map(|(host, config)| HostEntry {
            host: host.clone(),
            config: config.clone(),
        })
        .collect()
}

fn render_table(hosts: &[(String, HostSummary)]) -> String {
    let width = hosts
        .iter()
        .map(|(alias, _)| alias.len())
        .max()
        .unwrap_or(0)
        .max("ALIAS".len())
        + 2;

    let mut out = format!(
        "{}{}\n{}",
        format!("{:<width$}", "ALIAS").bold(),
        "CONFIGURATION".bold(),
        "─".repeat(width + 40).dimmed()
    );

    for (alias, summary) in hosts {
        let config = serde_json::to_string(summary).unwrap_or_default();
        out.push('\n');
        out.push_str(&format!(
            "{}{}",
            format!("{alias:<width$}").cyan().bold(),
            config.bright_magenta()
        ));
    }
    out
}

fn render_json(hosts: &[(String, HostSummary)]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&entries(hosts))?)
}

fn render_yaml(hosts: &[(String, HostSummary)]) -> Result<String> {
    Ok(serde_yaml_ng::to_string(&HostsDocument {
        hosts: entries(hosts),
    })?)
}
