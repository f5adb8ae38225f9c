use std::path::{Path, PathBuf};

use clap::Subcommand;

use rest_publish::{errors::Error, settings::Settings};

#[derive(Debug, Subcommand)]
pub enum ConfigCLI {
    /// Print the current settings, token masked.
    Show,

    /// Store the API token sent as `Authorization: Token ...`.
    SetToken {
        token: String,
    },

    /// Store the endpoint documents are created under.
    SetUrl {
        url: String,
    },
}

pub async fn config_cli(path: PathBuf, cli: ConfigCLI) {
    if let Err(e) = config(&path, cli).await {
        eprintln!("❗ {}", e);
        std::process::exit(1);
    }
}

async fn config(path: &Path, cli: ConfigCLI) -> Result<(), Error> {
    // Environment overrides are never written back.
    let mut settings = Settings::load(path).await?;

    match cli {
        ConfigCLI::Show => {
            println!("file: {}", path.display());
            println!("token: {}", settings.masked_token());
            println!("publish url: {}", settings.publish_url);
            return Ok(());
        }
        ConfigCLI::SetToken { token } => settings.token = token,
        ConfigCLI::SetUrl { url } => settings.set_publish_url(&url)?,
    }

    settings.save(path).await?;

    println!("✅ Settings saved to {}", path.display());

    Ok(())
}
