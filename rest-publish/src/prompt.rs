use std::path::PathBuf;

use async_trait::async_trait;

use publish_api::responses::{PublishRecord, PublishStatus};

use crate::errors::Error;

/// Fields the user can edit before an upload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserInput {
    pub title: String,
    pub status: PublishStatus,
    pub publish_date: String,
}

impl From<&PublishRecord> for UserInput {
    fn from(record: &PublishRecord) -> Self {
        Self {
            title: record.title.clone(),
            status: record.status,
            publish_date: record.publish_date.clone(),
        }
    }
}

/// Per operation state handed to the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishContext {
    pub path: PathBuf,
    pub file_name: String,
    pub existing: Option<PublishRecord>,

    /// Seeded from the existing record, empty draft otherwise.
    pub defaults: UserInput,
}

impl PublishContext {
    pub fn new(path: PathBuf, file_name: String, existing: Option<PublishRecord>) -> Self {
        let defaults = existing.as_ref().map(UserInput::from).unwrap_or_default();

        Self {
            path,
            file_name,
            existing,
            defaults,
        }
    }

    pub fn is_update(&self) -> bool {
        self.existing
            .as_ref()
            .map_or(false, |record| record.id.is_some())
    }
}

/// Collects the user's input. `None` cancels the publish.
#[async_trait(?Send)]
pub trait Prompt {
    async fn collect(&self, context: &PublishContext) -> Result<Option<UserInput>, Error>;
}

/// Always answers the same.
#[derive(Debug, Clone, Default)]
pub struct Prefilled(pub Option<UserInput>);

#[async_trait(?Send)]
impl Prompt for Prefilled {
    async fn collect(&self, _context: &PublishContext) -> Result<Option<UserInput>, Error> {
        Ok(self.0.clone())
    }
}

/// Accepts whatever the context was seeded with.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptDefaults;

#[async_trait(?Send)]
impl Prompt for AcceptDefaults {
    async fn collect(&self, context: &PublishContext) -> Result<Option<UserInput>, Error> {
        Ok(Some(context.defaults.clone()))
    }
}
