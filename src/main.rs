mod config;
mod deploy;
mod error;
mod gcloud;
mod inventory;
mod resource;
mod store;

/// Version injected at compile time via GCP_INVENTORY_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("GCP_INVENTORY_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use config::Config;
use gcloud::runner::ProcessRunner;
use resource::Registry;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Default configuration file, relative to the working directory
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Deploy and run a GCP project inventory job
#[derive(Parser, Debug)]
#[command(name = "gcp-inventory", version, about, long_about = None)]
struct Args {
    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deploy the Cloud Run Job that will inventory the target project
    Deploy {
        /// Path to the configuration file
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
    /// Inventory the target project and upload the results to the bucket
    Inventory {
        /// Path to the configuration file (environment variables otherwise)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Staging directory (a temporary directory otherwise)
        #[arg(long)]
        staging_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `--log-level`.
fn setup_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing_level.as_str().to_lowercase()));

    let (writer, guard) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_appender::non_blocking(file)
        },
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(log_file.is_none())
        .with_target(false)
        .init();

    tracing::debug!("gcp-inventory {} started with log level: {:?}", VERSION, level);

    Ok(Some(guard))
}

/// `config.yaml` in the working directory, else the user config directory
fn resolve_config_path(path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = path {
        return path;
    }

    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return local;
    }

    dirs::config_dir()
        .map(|p| p.join("gcp-inventory").join(DEFAULT_CONFIG_FILE))
        .filter(|p| p.exists())
        .unwrap_or(local)
}

fn load_config(path: &Path) -> Result<Config> {
    tracing::info!("> Configuration from : {}", path.display());
    Config::load(path).context("Error attempting to get configuration")
}

fn run_deploy(path: Option<PathBuf>) -> Result<()> {
    let path = resolve_config_path(path);
    let mut config = load_config(&path)?;

    let report = deploy::run(&ProcessRunner, &mut config)?;
    tracing::debug!("Deploy report: {:?}", report);
    Ok(())
}

fn run_inventory(path: Option<PathBuf>, staging_dir: Option<PathBuf>) -> Result<()> {
    let config = match path {
        Some(path) => load_config(&path)?,
        None => {
            tracing::info!("> Configuration from environment");
            Config::from_env().context("Error attempting to get configuration")?
        },
    };

    let registry = Registry::builtin().context("Embedded resource catalog is invalid")?;

    // Held until the upload has finished
    let temp_dir;
    let staging_root = match staging_dir {
        Some(dir) => dir,
        None => {
            temp_dir = tempfile::Builder::new()
                .prefix("gcp-inventory-")
                .tempdir()
                .context("Failed to create staging directory")?;
            temp_dir.path().to_path_buf()
        },
    };

    inventory::run(&ProcessRunner, &registry, &config, &staging_root)?;
    Ok(())
}

fn main() -> ExitCode {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level, args.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::FAILURE;
        },
    };
    let logs_to_stderr = args.log_file.is_none() && !matches!(args.log_level, LogLevel::Off);

    let result = match args.command {
        Commands::Deploy { path } => run_deploy(path),
        Commands::Inventory { path, staging_dir } => run_inventory(path, staging_dir),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            if !logs_to_stderr {
                eprintln!("Error: {err:#}");
            }
            ExitCode::FAILURE
        },
    }
}
