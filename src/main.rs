use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use sshd_cli::cli::{self, hosts::OutputFormat};
use sshd_cli::config::{EditorPolicy, Settings};
use sshd_cli::error::{Result, USAGE_EXIT_CODE};

#[derive(Parser)]
#[command(name = "sshd-cli")]
#[command(version)]
#[command(about = "A cli tool to connect to servers and manage remote development sessions.", long_about = None)]
struct Cli {
    /// SSH directory holding `config` and the managed key pair (defaults to ~/.ssh)
    #[arg(long, global = true, env = "SSHD_CLI_SSH_DIR")]
    ssh_dir: Option<PathBuf>,

    /// Behaviour when the editor or its remote-ssh extension is missing: require, warn or skip
    #[arg(long, global = true, env = "SSHD_CLI_EDITOR_POLICY", default_value = "warn")]
    editor_policy: EditorPolicy,

    /// Editor launcher used for remote sessions
    #[arg(long, global = true, env = "SSHD_CLI_EDITOR", default_value = "code")]
    editor: String,

    /// Log filter (e.g. warn, info, sshd_cli=debug)
    #[arg(long, global = true, env = "SSHD_CLI_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new server.
    #[command(visible_alias = "new")]
    Add {
        /// Address of the host to add
        hostname: Option<String>,

        /// Short alias for the host (defaults to the hostname prefix)
        #[arg(short, long)]
        alias: Option<String>,

        /// Overwrite if the alias exists
        #[arg(short, long)]
        overwrite: bool,
    },

    /// Remove an existing server.
    #[command(visible_alias = "delete")]
    Remove {
        /// Alias of the host to remove
        alias: Option<String>,
    },

    /// List all saved servers.
    #[command(visible_aliases = ["ls", "show", "status"])]
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Start remote session on a server.
    #[command(visible_alias = "start")]
    Connect {
        /// Alias of the host to connect
        alias: Option<String>,

        /// Connect in terminal ssh mode
        #[arg(short, long)]
        ssh: bool,
    },

    /// Kill running session on a server.
    #[command(visible_alias = "stop")]
    Kill {
        /// Alias of the host to kill session
        alias: Option<String>,
    },

    /// Show the managed public key.
    Pubkey,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let usage_error = e.use_stderr();
            let _ = e.print();
            return if usage_error {
                ExitCode::from(USAGE_EXIT_CODE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            cli::error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}

fn settings(cli: &Cli) -> Result<Settings> {
    let settings = match &cli.ssh_dir {
        Some(dir) => Settings::new(dir),
        None => Settings::from_home()?,
    };
    Ok(settings
        .with_editor(&cli.editor)
        .with_editor_policy(cli.editor_policy))
}

fn run(cli: Cli) -> Result<()> {
    let settings = settings(&cli)?;

    match cli.command {
        Commands::Add {
            hostname,
            alias,
            overwrite,
        } => cli::hosts::add(&settings, hostname, alias, overwrite),
        Commands::Remove { alias } => cli::hosts::remove(&settings, alias),
        Commands::List { output } => cli::hosts::list(&settings, output),
        Commands::Connect { alias, ssh } => cli::session::connect(&settings, alias, ssh),
        Commands::Kill { alias } => cli::session::kill(&settings, alias),
        Commands::Pubkey => cli::pubkey::run(&settings),
    }
}
