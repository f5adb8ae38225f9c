use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;

use publish_api::{
    errors::{status_line, Error as ApiError},
    responses::{PublishRecord, Published},
    PublishService, UploadRequest,
};

use tokio::sync::Mutex;

use crate::{
    errors::Error,
    host::Host,
    metadata::{read_publish_record, write_publish_record},
    prompt::{Prompt, PublishContext, UserInput},
    settings::Settings,
    utils::{file_name, slug},
};

/// Uploads documents and keeps their publish record in sync with the server.
pub struct Publisher<H>
where
    H: Host,
{
    host: H,
    service: PublishService,

    /// One upload at a time per document.
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl<H> Publisher<H>
where
    H: Host,
{
    pub fn new(host: H, settings: &Settings) -> Result<Self, Error> {
        if settings.publish_url.trim().is_empty() {
            return Err(Error::MissingSetting("publishUrl"));
        }

        if settings.token.is_empty() {
            tracing::warn!("no token configured, requests will not be authorized");
        }

        let service = PublishService::new(&settings.publish_url, &settings.token)?;

        Ok(Self {
            host,
            service,
            locks: DashMap::new(),
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn lock(&self, key: &Path) -> Arc<Mutex<()>> {
        Arc::clone(&self.locks.entry(key.to_path_buf()).or_default())
    }

    /// Drop the lock once no other upload holds or waits on it.
    fn release(&self, key: &Path, lock: Arc<Mutex<()>>) {
        drop(lock);

        self.locks.remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// State the prompt is seeded with.
    pub async fn context(&self, path: &Path) -> Result<PublishContext, Error> {
        let existing = read_publish_record(&self.host, path).await?;

        Ok(PublishContext::new(
            path.to_path_buf(),
            file_name(path),
            existing,
        ))
    }

    /// Create or update the remote record for this document.
    ///
    /// The stored record only changes once the server accepted the upload.
    pub async fn publish(&self, path: &Path, input: UserInput) -> Result<PublishRecord, Error> {
        let key = lock_key(path);
        let lock = self.lock(&key);

        let result = {
            let _guard = lock.lock().await;

            self.publish_locked(path, input).await
        };

        self.release(&key, lock);

        result
    }

    async fn publish_locked(&self, path: &Path, input: UserInput) -> Result<PublishRecord, Error> {
        let existing = read_publish_record(&self.host, path).await?;
        let document_content = self.host.read_document(path).await?;

        let request = UploadRequest {
            document_content,
            file_name: file_name(path),
            slug: slug(&input.title, path),
            title: input.title,
            status: input.status,
            publish_date: input.publish_date,
            record_id: existing.and_then(|record| record.id),
        };

        let Published { record, raw } = self.service.upload(request).await?;

        write_publish_record(&self.host, path, &raw).await?;

        match &record.id {
            Some(id) => tracing::info!(path = %path.display(), %id, "document published"),
            None => tracing::info!(path = %path.display(), "document published without id"),
        }

        Ok(record)
    }

    /// Ask for input, publish, and report the outcome through the host.
    ///
    /// `Ok(None)` when the prompt was cancelled. Every error has been notified already.
    pub async fn run<P>(&self, path: &Path, prompt: &P) -> Result<Option<PublishRecord>, Error>
    where
        P: Prompt + ?Sized,
    {
        let result = self.collect_and_publish(path, prompt).await;

        match &result {
            Ok(Some(_)) => self.host.notify("✅ File Uploaded"),
            Ok(None) => tracing::debug!(path = %path.display(), "publish cancelled"),
            Err(e) => self
                .host
                .notify(&failure_message(e, self.service.base_url())),
        }

        result
    }

    async fn collect_and_publish<P>(
        &self,
        path: &Path,
        prompt: &P,
    ) -> Result<Option<PublishRecord>, Error>
    where
        P: Prompt + ?Sized,
    {
        let context = self.context(path).await?;

        let input = match prompt.collect(&context).await? {
            Some(input) => input,
            None => return Ok(None),
        };

        let record = self.publish(path, input).await?;

        Ok(Some(record))
    }
}

/// `a.md` and `./a.md` are the same document.
fn lock_key(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

/// What the user is told when an upload fails.
pub fn failure_message(error: &Error, base_url: &str) -> String {
    match error {
        Error::PublishApi(ApiError::Rejected {
            status,
            status_text,
            body,
        }) => {
            let mut message = format!(
                "❗ File Upload Failed: {}",
                status_line(*status, status_text)
            );

            if let Some(body) = body {
                message.push('\n');
                message.push_str(body);
            }

            message
        }
        Error::PublishApi(ApiError::Transport(e)) => {
            format!("❗ File Upload Failed: cannot reach {}: {}", base_url, e)
        }
        e => format!("❗ File Upload Failed: {}", e),
    }
}
