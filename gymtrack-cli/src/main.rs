//! GymTrack CLI - Command-line front end for the workout tracker
//!
//! Runs an interactive shell or a scripted demo against the in-process
//! backend, and manages the configuration file.

mod display;
mod forms;
mod shell;

use clap::{Parser, Subcommand};
use gymtrack_applications::{AppContext, Backend};
use gymtrack_core::{
    config_error, default_config_path, init_logging, log_operation_error, log_operation_start,
    log_operation_success, ErrorContext, GymTrackConfig, GymTrackError, GymTrackResult,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "gymtrack")]
#[command(about = "Log workouts and track weekly progress")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive shell: register, log in and manage workouts
    Shell,

    /// Scripted walkthrough against a fresh in-memory backend
    Demo,

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long)]
        force: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> GymTrackResult<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;

    let mut logging_config = config.logging.clone();
    if cli.verbose {
        logging_config.level = "debug".to_string();
    }

    init_logging(&logging_config).map_err(|e| GymTrackError::Config {
        message: format!("Failed to initialize logging: {}", e),
        source: Some(e),
        context: ErrorContext::new("cli")
            .with_operation("init_logging")
            .with_suggestion("Check the [logging] section of the configuration"),
    })?;

    info!("Starting GymTrack CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Shell => handle_shell(config).await?,
        Commands::Demo => handle_demo(config).await?,
        Commands::Config {
            show,
            init,
            force,
            validate,
        } => handle_config(cli.config.as_ref(), show, init, force, validate)?,
    }

    Ok(())
}

/// Explicit path, then `<config dir>/gymtrack/config.toml`, then `./gymtrack.toml`
fn load_config(config_path: Option<&PathBuf>) -> GymTrackResult<GymTrackConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from {:?}", path);
        return GymTrackConfig::from_file(path);
    }

    let candidates = [default_config_path(), Some(PathBuf::from("gymtrack.toml"))];
    for path in candidates.iter().flatten() {
        if path.exists() {
            info!("Loading configuration from {:?}", path);
            return GymTrackConfig::from_file(path);
        }
    }

    info!("No configuration file found, using defaults");
    Ok(GymTrackConfig::default())
}

fn to_cli_error(operation: &str, error: anyhow::Error) -> GymTrackError {
    GymTrackError::Internal {
        message: format!("{:#}", error),
        source: None,
        context: ErrorContext::new("cli").with_operation(operation),
    }
}

async fn handle_shell(config: GymTrackConfig) -> GymTrackResult<()> {
    config.validate()?;
    log_operation_start!("shell");

    let backend = Backend::acquire_or_reuse(Backend::in_memory).clone();
    let context = AppContext::new(config, backend).await;

    let stdin = std::io::stdin();
    let mut shell = shell::Shell::new(&context, stdin.lock(), std::io::stdout());
    let outcome = shell.run().await;
    context.shutdown();

    match outcome {
        Ok(()) => {
            log_operation_success!("shell");
            Ok(())
        }
        Err(e) => {
            let error = to_cli_error("shell", e);
            log_operation_error!("shell", error);
            Err(error)
        }
    }
}

async fn handle_demo(config: GymTrackConfig) -> GymTrackResult<()> {
    config.validate()?;
    log_operation_start!("demo");

    let context = AppContext::new(config, Backend::in_memory()).await;
    let mut stdout = std::io::stdout();
    let outcome = shell::run_demo(&context, &mut stdout).await;
    context.shutdown();

    outcome.map_err(|e| {
        let error = to_cli_error("demo", e);
        log_operation_error!("demo", error);
        error
    })?;
    log_operation_success!("demo");
    Ok(())
}

fn handle_config(
    path: Option<&PathBuf>,
    show: bool,
    init: bool,
    force: bool,
    validate: bool,
) -> GymTrackResult<()> {
    if !(show || init || validate) {
        println!("Nothing to do. Use --init, --show or --validate.");
        return Ok(());
    }

    if init {
        let config_path = path
            .cloned()
            .or_else(default_config_path)
            .ok_or_else(|| config_error!("No configuration directory available", "config_init"))?;

        if config_path.exists() && !force {
            println!(
                "⚠️ Configuration already exists at {:?}. Use --force to overwrite.",
                config_path
            );
        } else {
            GymTrackConfig::default().save_to_file(&config_path)?;
            println!("✅ Configuration initialized at: {:?}", config_path);
        }
    }

    if show {
        let config = load_config(path)?;
        let rendered = toml::to_string_pretty(&config).map_err(|e| GymTrackError::Config {
            message: format!("Failed to render config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config_show"),
        })?;
        println!("📋 Current configuration:");
        println!("{}", rendered);
    }

    if validate {
        let config = load_config(path)?;
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}
