use std::path::PathBuf;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::info;

use reelshelf_server::create_app;
use reelshelf_server::infra::config::{ConfigLoad, ConfigLoader};
use reelshelf_server::infra::startup::{
    build_app_state, connect_database, init_tracing, log_config_warnings,
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "reelshelf-server")]
#[command(about = "Book and movie tracking server with shareable profile cards")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Path to a reelshelf.toml configuration file
    #[arg(short, long, env = "REELSHELF_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.serve.config.clone() {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = cli.serve.port {
        config.server.port = port;
    }
    if let Some(host) = cli.serve.host.clone() {
        config.server.host = host;
    }
    log_config_warnings(&config, &warnings);

    let database = connect_database(&config).await?;

    match cli.command {
        Some(Command::Db(DbCommand::Migrate)) => {
            database
                .migrate()
                .await
                .context("database migration failed")?;
            info!("Database migrations applied successfully");
            Ok(())
        }
        None => {
            database
                .migrate()
                .await
                .context("database migration failed")?;

            let addr = config.bind_address();
            let state = build_app_state(config, &database).await?;
            let router = create_app(state);

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            info!(%addr, "reelshelf server listening");
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("server error")?;
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
