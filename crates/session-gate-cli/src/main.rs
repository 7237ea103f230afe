// crates/session-gate-cli/src/main.rs
// ============================================================================
// Module: Session Gate CLI Entry Point
// Description: Command dispatcher for the Session Gate gateway.
// Purpose: Provide a safe, loopback-by-default launcher and config tooling.
// Dependencies: clap, session-gate-config, session-gate-http, tokio
// ============================================================================

//! ## Overview
//! The Session Gate CLI launches the gateway and validates configuration.
//! Binding beyond loopback requires explicit opt-in, and exposed binds must
//! not talk to cleartext collaborators. Security posture: configuration is
//! untrusted input and is validated before the gateway starts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use session_gate_cli::serve_policy::ALLOW_NON_LOOPBACK_ENV;
use session_gate_cli::serve_policy::BindOutcome;
use session_gate_cli::serve_policy::enforce_bind_policy;
use session_gate_cli::serve_policy::resolve_allow_non_loopback;
use session_gate_config::SessionGateConfig;
use session_gate_config::config_toml_example;
use session_gate_http::GatewayServer;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Session Gate: a session-gating gateway for protected paths.
#[derive(Debug, Parser)]
#[command(name = "session-gate", disable_version_flag = true)]
struct Cli {
    /// Prints the version and exits.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    show_version: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level CLI commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Runs the gateway.
    Serve(ServeCommand),
    /// Configuration tooling.
    Config {
        /// Config subcommand to execute.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for the `serve` command.
#[derive(Debug, Args)]
struct ServeCommand {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Permits binding to a non-loopback address.
    #[arg(long, action = ArgAction::SetTrue)]
    allow_non_loopback: bool,
}

/// Config subcommands.
#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Validates a configuration file.
    Validate(ConfigValidateCommand),
    /// Prints a canonical example configuration.
    Example,
}

/// Arguments for `config validate`.
#[derive(Debug, Args)]
struct ConfigValidateCommand {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failure carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// User-facing failure message.
    message: String,
}

impl CliError {
    /// Builds a CLI error from a message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result alias for CLI command handlers.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("session-gate {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        return Err(CliError::new("no command given; try `session-gate serve --config <path>`"));
    };

    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command,
        } => command_config(command),
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = SessionGateConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    let allow_non_loopback = resolve_allow_non_loopback(command.allow_non_loopback)
        .map_err(|err| CliError::new(err.to_string()))?;
    let bind_outcome = enforce_bind_policy(&config, allow_non_loopback)
        .map_err(|err| CliError::new(err.to_string()))?;
    warn_bind_posture(&bind_outcome, allow_non_loopback)?;

    let server = GatewayServer::from_config(config)
        .map_err(|err| CliError::new(format!("gateway init failed: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("gateway failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Emits launch notes about the bind posture.
fn warn_bind_posture(outcome: &BindOutcome, allow_non_loopback: bool) -> CliResult<()> {
    if outcome.network_exposed {
        write_stderr_line(&format!(
            "session-gate: WARNING: gateway bound to {} and reachable from the network; \
             audit logging is {}",
            outcome.bind_addr,
            if outcome.audit_enabled { "enabled" } else { "disabled" },
        ))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        return Ok(());
    }
    if !allow_non_loopback {
        write_stderr_line(&format!(
            "session-gate: listening on loopback {} only; set {ALLOW_NON_LOOPBACK_ENV}=1 to \
             expose the gateway",
            outcome.bind_addr,
        ))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
        ConfigCommand::Example => command_config_example(),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = SessionGateConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    write_stdout_line("configuration OK")
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the canonical example configuration.
fn command_config_example() -> CliResult<ExitCode> {
    write_stdout_bytes(config_toml_example().as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes one line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes one line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed writing to {stream}: {error}")
}

/// Reports a fatal error and returns the failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(&format!("session-gate: error: {message}"));
    ExitCode::FAILURE
}
