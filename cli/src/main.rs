mod cli;

use std::path::PathBuf;

use anyhow::Context;

use clap::{Parser, Subcommand};

use rest_publish::{settings::Settings, vault::FileVault};

use tracing_subscriber::EnvFilter;

use crate::cli::{
    config::{config_cli, ConfigCLI},
    publish::{publish_cli, Publish},
    show::{show_cli, Show},
};

#[derive(Parser)]
#[command(name = "rest-publish", bin_name = "rest-publish", version, about, long_about = None, rename_all = "kebab-case")]
struct RestPublish {
    /// Settings file. Defaults to the platform config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory documents are resolved against.
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,

    /// Used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upload a document, creating or updating its remote record.
    Publish(Publish),

    /// Print the publish record stored in a document.
    Show(Show),

    /// Manage the token and endpoint.
    #[command(subcommand)]
    Config(ConfigCLI),
}

fn default_config_path() -> anyhow::Result<PathBuf> {
    let dir = dirs::config_dir().context("no config directory on this platform, use --config")?;

    Ok(dir.join("rest-publish").join("data.json"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = RestPublish::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };

    let vault = FileVault::new(cli.vault);

    match cli.command {
        Commands::Publish(args) => {
            let settings = Settings::load(&config_path)
                .await
                .with_context(|| format!("cannot read settings {}", config_path.display()))?
                .with_env_overrides();

            publish_cli(settings, vault, args).await
        }
        Commands::Show(args) => show_cli(vault, args).await,
        Commands::Config(args) => config_cli(config_path, args).await,
    }

    Ok(())
}
