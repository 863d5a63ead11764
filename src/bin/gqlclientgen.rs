//! generate typed graphql clients for the services in `gqlclientgen.yml`
//!
//! each service gets a directory with `schema.introspect.json`,
//! `schema.graphql`, `model.rs`, `client.rs`, and `mod.rs`. a failing
//! service does not stop the others; the exit status is 1 if any failed.

use clap::{Parser, ValueEnum};
use gqlclientgen::project::DEFAULT_CONFIG_PATH;
use gqlclientgen::{run_services, CancelFlag, ProjectConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gqlclientgen", version, about = "generate typed graphql clients")]
struct Args {
    /// project configuration file
    #[arg(long, short, env = "GQLCLIENTGEN_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// only generate these services (repeatable)
    #[arg(long = "service", short, value_name = "NAME")]
    services: Vec<String>,

    /// log level, used when RUST_LOG is not set
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    setup_tracing(args.log_level);

    let project = match ProjectConfig::load(&args.config) {
        Ok(project) => project,
        Err(err) => {
            tracing::error!(config = %args.config.display(), error = %err, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    let services = match project.select(&args.services) {
        Ok(services) => services,
        Err(err) => {
            tracing::error!(error = %err, "invalid service selection");
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancelFlag::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("interrupt received, stopping after the current step");
                on_signal.cancel();
            }
            Err(err) => tracing::error!(error = %err, "failed to install ctrl-c handler"),
        }
    });

    tracing::info!(services = services.len(), "starting generation");
    let report = run_services(&project, &services, &cancel).await;
    if report.is_success() {
        tracing::info!(generated = report.succeeded.len(), "done");
        ExitCode::SUCCESS
    } else {
        let failed: Vec<&str> = report.failed.iter().map(|(name, _)| name.as_str()).collect();
        tracing::error!(
            generated = report.succeeded.len(),
            failed = %failed.join(", "),
            "generation failed"
        );
        ExitCode::FAILURE
    }
}

fn setup_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
