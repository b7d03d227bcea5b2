use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::{Listener, RunOptions, RunOutcome, ServerState, ServerStatus, ShutdownOptions};
use modkit_db::{redact_credentials_in_dsn, ConnectOpts, DbHandle};
use runtime::{AppConfig, CliArgs};
use users_info::UsersInfo;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Upper bound on returning pooled connections once serving has stopped.
const DB_CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Users service - CRUD over a relational store
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users service - CRUD over a relational store")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    match real_main().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "users-server failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn real_main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &log_base_dir(&cli));

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

/// Relative log file paths resolve against the config file's directory, or the cwd.
fn log_base_dir(cli: &Cli) -> PathBuf {
    cli.config
        .as_deref()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn connect_opts(config: &AppConfig) -> ConnectOpts {
    let mut opts = ConnectOpts::default();
    if let Some(db) = &config.database {
        if db.max_conns.is_some() {
            opts.max_conns = db.max_conns;
        }
        if db.acquire_timeout.is_some() {
            opts.acquire_timeout = db.acquire_timeout;
        }
    }
    opts
}

async fn run_server(config: AppConfig) -> Result<ExitCode> {
    let status = ServerStatus::new();
    tracing::info!(state = %status.current(), "users-server starting");

    let dsn = config.database_url()?;
    let addr = config.bind_addr()?;

    tracing::info!(dsn = %redact_credentials_in_dsn(Some(dsn)), "Connecting to database");
    let db = DbHandle::connect(dsn, connect_opts(&config)).await?;
    tracing::info!(engine = ?db.engine(), "Connected to database");

    let users = match UsersInfo::init(&db).await {
        Ok(users) => users,
        Err(e) => {
            db.close_within(DB_CLOSE_TIMEOUT).await;
            return Err(e);
        }
    };

    let router = modkit::http::with_standard_layers(users.register_rest(Router::new()));

    let outcome = modkit::run(RunOptions {
        listener: Listener::Addr(addr),
        router,
        shutdown: ShutdownOptions::Signals,
        drain_timeout: config.server.drain_timeout,
        request_timeout: config.server.request_timeout,
        status: status.clone(),
    })
    .await;

    if !db.close_within(DB_CLOSE_TIMEOUT).await {
        tracing::warn!(timeout = ?DB_CLOSE_TIMEOUT, "database pool did not close in time");
    }
    status.advance(ServerState::Stopped);

    match outcome? {
        RunOutcome::Clean => {
            tracing::info!("users-server stopped");
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Forced => {
            tracing::warn!("users-server stopped after forced drain");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn check_config(config: &AppConfig) -> Result<ExitCode> {
    tracing::info!("Checking configuration...");
    config.database_url()?;
    config.bind_addr()?;

    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(ExitCode::SUCCESS)
}
