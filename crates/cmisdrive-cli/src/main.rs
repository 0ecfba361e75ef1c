#![deny(unsafe_code)]

mod commands;
mod config;
mod exit_code;
mod output;

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cmisdrive_core::{MEMORY_URL, RepoError, SessionParams, connect};
use cmisdrive_driver::{DirectoryDeletePolicy, DriverHost, HostError};

use crate::commands::{cat, info, ls, mkdir, mv, put, rm, stat};
use crate::config::FileConfig;

const DEFAULT_USER: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin";
const DEFAULT_MOUNT_POINT: &str = "N:\\";

/// Browse and edit a CMIS repository through the CmisDrive filesystem adapter
#[derive(Parser)]
#[command(name = "cmisdrive")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # List the repository root
    cmisdrive --url https://ecm.example.com/cmis/browser ls \\

    # Upload a file
    cmisdrive put \\Reports\\q3.pdf --from q3.pdf

    # Try things out without a server
    cmisdrive --url memory: info
")]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Config file (default: platform config dir, `config.toml`)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Repository URL (`http(s)://...` browser binding endpoint, or `memory:`)
    #[arg(long, env = "CMISDRIVE_URL", global = true)]
    url: Option<String>,

    /// Repository user
    #[arg(long, env = "CMISDRIVE_USER", global = true)]
    user: Option<String>,

    /// Repository password (insecure, prefer --password-stdin or CMISDRIVE_PASSWORD)
    #[arg(long, env = "CMISDRIVE_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Read password from stdin (single line)
    #[arg(long, conflicts_with = "password", global = true)]
    password_stdin: bool,

    /// Use the admin/admin development credentials
    #[arg(long, conflicts_with_all = ["user", "password", "password_stdin"], global = true)]
    default_credentials: bool,

    /// Repository id to bind to (default: first repository offered)
    #[arg(long, global = true)]
    repository_id: Option<String>,

    /// Drive the adapter would be mounted at
    #[arg(long, global = true)]
    mount_point: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show volume and repository information
    Info(info::Args),

    /// List directory contents
    Ls(ls::Args),

    /// Show file information
    Stat(stat::Args),

    /// Read and output file contents
    Cat(cat::Args),

    /// Write stdin (or a local file) to a file
    Put(put::Args),

    /// Create a directory
    Mkdir(mkdir::Args),

    /// Remove a file or directory
    Rm(rm::Args),

    /// Move or rename a file or directory
    Mv(mv::Args),
}

/// Invocation problems detected before any repository call.
#[derive(Debug, Error)]
enum CliError {
    #[error("No repository URL given (use --url, CMISDRIVE_URL or `url` in the config file)")]
    MissingUrl,

    #[error("--password-stdin requires the password to be piped in")]
    PasswordStdinIsTerminal,

    #[error("Password from stdin is empty")]
    EmptyPassword,
}

/// Connection settings after merging flags, environment and config file.
struct Connection {
    params: SessionParams,
    mount_point: String,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS),
        Err(e) => {
            let code = categorize_error(&e);

            let args: Vec<String> = std::env::args().collect();
            let is_quiet = args.iter().any(|a| a == "-q" || a == "--quiet");
            if !is_quiet {
                eprintln!("Error: {e:#}");
            }

            ExitCode::from(code)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Guard must outlive every command so buffered log lines are flushed
    let _log_guard = if cli.quiet {
        None
    } else {
        setup_tracing(cli.verbose, cli.log_file.as_deref())?
    };

    let file_config = config::load(cli.config.as_deref())?;
    let connection = resolve_connection(&cli, &file_config)?;

    let mut options = file_config.drive_options();
    if let Commands::Rm(args) = &cli.command
        && args.recursive
    {
        options.delete_directory_policy = DirectoryDeletePolicy::FolderOnly;
    }

    let repo = connect(&connection.params)
        .with_context(|| format!("Failed to connect to {}", connection.params.url))?;
    let host = DriverHost::new(repo, options);

    let result = match &cli.command {
        Commands::Info(args) => info::execute(&host, &connection.mount_point, args),
        Commands::Ls(args) => ls::execute(&host, args),
        Commands::Stat(args) => stat::execute(&host, args),
        Commands::Cat(args) => cat::execute(&host, args),
        Commands::Put(args) => put::execute(&host, args),
        Commands::Mkdir(args) => mkdir::execute(&host, args),
        Commands::Rm(args) => rm::execute(&host, args),
        Commands::Mv(args) => mv::execute(&host, args),
    };

    let status = host.unmount();
    if result.is_ok() && !status.is_success() {
        return Err(HostError::Status(status)).context("Unmount failed");
    }
    result
}

fn resolve_connection(cli: &Cli, file_config: &FileConfig) -> Result<Connection> {
    let url = cli
        .url
        .clone()
        .or_else(|| file_config.url.clone())
        .ok_or(CliError::MissingUrl)?;

    let (user, password) = if cli.default_credentials {
        (DEFAULT_USER.to_string(), SecretString::from(DEFAULT_PASSWORD))
    } else {
        let user = cli
            .user
            .clone()
            .or_else(|| file_config.user.clone())
            .unwrap_or_else(|| DEFAULT_USER.to_string());
        (user.clone(), get_password(cli, &url, &user)?)
    };

    let mut params = SessionParams::new(url, user, password);
    if let Some(id) = cli.repository_id.clone().or_else(|| file_config.repository_id.clone()) {
        params = params.with_repository_id(id);
    }

    let mount_point = cli
        .mount_point
        .clone()
        .or_else(|| file_config.mount_point.clone())
        .unwrap_or_else(|| DEFAULT_MOUNT_POINT.to_string());

    Ok(Connection { params, mount_point })
}

/// Password priority: --password-stdin, --password / CMISDRIVE_PASSWORD,
/// then an interactive prompt. The in-memory repository needs none.
fn get_password(cli: &Cli, url: &str, user: &str) -> Result<SecretString> {
    if cli.password_stdin {
        return read_password_from_stdin();
    }
    if let Some(ref password) = cli.password {
        return Ok(SecretString::from(password.clone()));
    }
    if url.trim().starts_with(MEMORY_URL) {
        return Ok(SecretString::from(String::new()));
    }
    let password = rpassword::prompt_password(format!("Password for {user}@{url}: "))
        .context("Failed to read password")?;
    Ok(SecretString::from(password))
}

fn read_password_from_stdin() -> Result<SecretString> {
    if io::stdin().is_terminal() {
        return Err(CliError::PasswordStdinIsTerminal.into());
    }

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    let password = password.trim_end_matches('\n').trim_end_matches('\r');
    if password.is_empty() {
        return Err(CliError::EmptyPassword.into());
    }
    Ok(SecretString::from(password.to_string()))
}

/// Set up tracing based on verbosity. `RUST_LOG` overrides the level.
fn setup_tracing(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    let Some(log_file) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(io::stderr)
            .init();
        return Ok(None);
    };

    let directory = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .with_context(|| format!("Invalid log file path: {}", log_file.display()))?;
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory: {}", directory.display()))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();
    Ok(Some(guard))
}

/// Map an error chain to an exit code by downcasting to the typed errors.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.downcast_ref::<CliError>().is_some() || cause.downcast_ref::<config::ConfigError>().is_some() {
            return exit_code::USAGE;
        }
        if let Some(repo_err) = cause.downcast_ref::<RepoError>() {
            return match repo_err {
                RepoError::InvalidArgument { .. } => exit_code::USAGE,
                _ => exit_code::CONNECTION_FAILED,
            };
        }
        if cause.downcast_ref::<HostError>().is_some() {
            return exit_code::OPERATION_FAILED;
        }
    }
    exit_code::GENERAL_ERROR
}
