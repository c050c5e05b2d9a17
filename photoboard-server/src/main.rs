//! # Photoboard Server
//!
//! Upload, list, and delete photos with comments.
//!
//! ## Overview
//!
//! - `GET /` lists every photo with its date, comment, and a delete button
//! - `GET /upload` shows the upload form, `POST /upload` stores a photo
//! - `POST /delete/{filename}` removes a photo
//! - `GET /uploads/{filename}` serves the stored file
//!
//! `photoboard-server sweep` checks the upload directory against the
//! metadata snapshot and exits.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use photoboard_core::SweepMode;
use photoboard_server::{
    AppState,
    infra::{
        config::{Config, ConfigLoad, ConfigLoader},
        startup::{ProdStartupHooks, StartupHooks},
    },
    routes,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "photoboard-server")]
#[command(about = "Upload, list, and delete photos with comments")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone, Default)]
struct ServeArgs {
    /// Path to the TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Env file to load instead of `./.env`
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compare the upload directory with the photo snapshot and exit
    Sweep {
        /// Delete orphaned files and drop records whose file is missing
        #[arg(long, default_value_t = false)]
        prune: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Sweep { prune }) => run_sweep(&cli.serve, prune).await,
        None => run_server(cli.serve).await,
    }
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &args.env_file {
        loader = loader.with_env_file(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    apply_cli_overrides(&mut config, args);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }

    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }

    Ok(Arc::new(config))
}

fn apply_cli_overrides(config: &mut Config, args: &ServeArgs) {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }
}

async fn run_sweep(args: &ServeArgs, prune: bool) -> anyhow::Result<()> {
    let config = load_runtime_config(args)?;
    let state = AppState::bootstrap(config).await?;

    let mode = if prune {
        SweepMode::Prune
    } else {
        SweepMode::Report
    };
    let report = state
        .photos()
        .sweep(mode)
        .await
        .context("photo sweep failed")?;

    for name in &report.orphaned_blobs {
        info!(filename = %name, "orphaned file");
    }
    for name in &report.dangling_records {
        info!(filename = %name, "record without file");
    }
    if report.is_clean() {
        info!("photo storage is consistent");
    } else if mode == SweepMode::Report {
        info!("re-run with --prune to clean up");
    }

    Ok(())
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    run_server_with_hooks(args, &ProdStartupHooks).await
}

async fn run_server_with_hooks<H>(args: ServeArgs, hooks: &H) -> anyhow::Result<()>
where
    H: StartupHooks,
{
    let config = load_runtime_config(&args)?;
    let state = AppState::bootstrap(Arc::clone(&config)).await?;

    hooks.run(&state).await?;

    let router = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                config.server.host, config.server.port
            )
        })?;

    info!(
        "Server is running at http://{}:{}",
        config.server.host, config.server.port
    );

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_overrides_win_over_loaded_config() {
        let mut config = Config::default();
        config.server.port = 8080;

        let args = ServeArgs {
            port: Some(9443),
            host: Some("127.0.0.1".into()),
            ..ServeArgs::default()
        };
        apply_cli_overrides(&mut config, &args);

        assert_eq!(config.server.port, 9443);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn sweep_subcommand_parses_prune_flag() {
        let cli = Cli::try_parse_from(["photoboard-server", "sweep", "--prune"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Sweep { prune: true })));

        let cli = Cli::try_parse_from(["photoboard-server", "--port", "4000"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.port, Some(4000));

        let cli =
            Cli::try_parse_from(["photoboard-server", "sweep", "--env-file", "prod.env"]).unwrap();
        assert_eq!(cli.serve.env_file, Some(PathBuf::from("prod.env")));
    }
}
