use std::{io::Write, path::PathBuf};

use async_trait::async_trait;

use clap::Parser;

use rest_publish::{
    errors::Error,
    prompt::{Prompt, PublishContext, UserInput},
    settings::Settings,
    vault::FileVault,
    PublishStatus, Publisher,
};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

#[derive(Debug, Parser)]
pub struct Publish {
    /// Path to the markdown file, relative to the vault.
    path: PathBuf,

    /// Title of the post. Defaults to the published title.
    #[arg(long)]
    title: Option<String>,

    /// Either draft or published.
    #[arg(long)]
    status: Option<PublishStatus>,

    /// Publish date, sent as is.
    #[arg(long)]
    date: Option<String>,

    /// Do not ask anything, upload right away.
    #[arg(short, long)]
    yes: bool,
}

pub async fn publish_cli(settings: Settings, vault: FileVault, args: Publish) {
    let publisher = match Publisher::new(vault, &settings) {
        Ok(publisher) => publisher,
        Err(e) => {
            eprintln!("❗ {}", e);
            std::process::exit(1);
        }
    };

    let prompt = TerminalPrompt {
        title: args.title,
        status: args.status,
        date: args.date,
        assume_yes: args.yes,
    };

    match publisher.run(&args.path, &prompt).await {
        Ok(Some(record)) => match record.id {
            Some(id) => println!("✅ Published {}", id),
            None => println!("✅ Published"),
        },
        Ok(None) => println!("Publish cancelled."),
        // Already reported by the vault.
        Err(_) => std::process::exit(1),
    }
}

/// Form shown on the terminal, flags pre-fill the matching fields.
pub struct TerminalPrompt {
    pub title: Option<String>,
    pub status: Option<PublishStatus>,
    pub date: Option<String>,
    pub assume_yes: bool,
}

impl TerminalPrompt {
    fn overlay(&self, defaults: &UserInput) -> UserInput {
        UserInput {
            title: self.title.clone().unwrap_or_else(|| defaults.title.clone()),
            status: self.status.unwrap_or(defaults.status),
            publish_date: self
                .date
                .clone()
                .unwrap_or_else(|| defaults.publish_date.clone()),
        }
    }
}

#[async_trait(?Send)]
impl Prompt for TerminalPrompt {
    async fn collect(&self, context: &PublishContext) -> Result<Option<UserInput>, Error> {
        let mut input = self.overlay(&context.defaults);

        if self.assume_yes {
            return Ok(Some(input));
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("Publish Settings: {}", context.file_name);

        match context.existing.as_ref().and_then(|record| record.id.as_ref()) {
            Some(id) => println!("Updating record {}", id),
            None => println!("Creating a new record"),
        }

        if self.title.is_none() {
            match ask(&mut lines, "Title", &input.title).await? {
                Some(title) => input.title = title,
                None => return Ok(None),
            }
        }

        while self.status.is_none() {
            let answer = match ask(&mut lines, "Status (draft/published)", &input.status.to_string()).await? {
                Some(answer) => answer,
                None => return Ok(None),
            };

            match answer.parse::<PublishStatus>() {
                Ok(status) => {
                    input.status = status;
                    break;
                }
                Err(_) => println!("❗ Unknown status {}", answer),
            }
        }

        if self.date.is_none() {
            match ask(&mut lines, "Publish date", &input.publish_date).await? {
                Some(date) => input.publish_date = date,
                None => return Ok(None),
            }
        }

        let confirmed = match ask(&mut lines, "Submit? (y/n)", "n").await? {
            Some(answer) => matches!(answer.to_lowercase().as_str(), "y" | "yes"),
            None => false,
        };

        Ok(confirmed.then_some(input))
    }
}

/// One line of input, `default` when left blank, `None` on end of input.
async fn ask<R>(lines: &mut Lines<R>, label: &str, default: &str) -> Result<Option<String>, Error>
where
    R: AsyncBufRead + Unpin,
{
    print!("{} [{}]: ", label, default);
    std::io::stdout().flush()?;

    let line = match lines.next_line().await? {
        Some(line) => line,
        None => return Ok(None),
    };

    let line = line.trim();

    if line.is_empty() {
        return Ok(Some(default.to_owned()));
    }

    Ok(Some(line.to_owned()))
}
