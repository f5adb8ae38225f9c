use std::path::PathBuf;

use clap::Parser;

use rest_publish::{
    errors::Error, metadata::read_publish_record, vault::FileVault, PublishRecord,
};

#[derive(Debug, Parser)]
pub struct Show {
    /// Path to the markdown file, relative to the vault.
    path: PathBuf,
}

pub async fn show_cli(vault: FileVault, args: Show) {
    match show(&vault, &args).await {
        Ok(text) => print!("{}", text),
        Err(e) => {
            eprintln!("❗ {}", e);
            std::process::exit(1);
        }
    }
}

async fn show(vault: &FileVault, args: &Show) -> Result<String, Error> {
    let record = read_publish_record(vault, &args.path).await?;

    Ok(describe(record.as_ref()))
}

fn describe(record: Option<&PublishRecord>) -> String {
    let record = match record {
        Some(record) => record,
        None => return String::from("Not yet published.\n"),
    };

    let id = match &record.id {
        Some(id) => id.to_string(),
        None => String::from("none"),
    };

    format!(
        "id: {}\nstatus: {}\ntitle: {}\npublish date: {}\n",
        id, record.status, record.title, record.publish_date
    )
}
