pub mod errors;
pub mod responses;

use std::sync::Arc;

use errors::Error;

use crate::responses::*;

use reqwest::{
    header::AUTHORIZATION,
    multipart::{Form, Part},
    Client, Method, Url,
};

type Result<T> = std::result::Result<T, Error>;

/// Everything sent for one upload. Built per operation and consumed by [`PublishService::upload`].
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub document_content: Vec<u8>,
    pub file_name: String,
    pub title: String,
    pub slug: String,
    pub status: PublishStatus,
    pub publish_date: String,
    pub record_id: Option<RecordId>,
}

/// Create vs. update, decided by the presence of a prior identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Create,
    Update(RecordId),
}

impl Dispatch {
    pub fn method(&self) -> Method {
        match self {
            Self::Create => Method::POST,
            Self::Update(_) => Method::PATCH,
        }
    }
}

impl UploadRequest {
    pub fn dispatch(&self) -> Dispatch {
        match &self.record_id {
            Some(id) => Dispatch::Update(id.clone()),
            None => Dispatch::Create,
        }
    }

    fn into_form(self) -> Result<Form> {
        let UploadRequest {
            document_content,
            file_name,
            title,
            slug,
            status,
            publish_date,
            ..
        } = self;

        let mime_type = mime_guess::from_path(&file_name).first_or_octet_stream();

        let part = Part::bytes(document_content)
            .file_name(file_name)
            .mime_str(mime_type.essence_str())
            .map_err(Error::Multipart)?;

        let form = Form::new()
            .part("markdown_file", part)
            .text("title", title)
            .text("slug", slug)
            .text("status", status.to_string())
            .text("publish_date", publish_date);

        Ok(form)
    }
}

#[derive(Clone)]
pub struct PublishService {
    client: Client,
    base_url: Arc<str>,
    token: Arc<str>,
}

impl PublishService {
    /// The base URL must parse but is otherwise used as is; update targets are `{base}{id}/`.
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Url::parse(base_url)?;

        let client = Client::new();

        Ok(Self {
            client,
            base_url: Arc::from(base_url),
            token: Arc::from(token),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Target URL for this dispatch.
    pub fn endpoint(&self, dispatch: &Dispatch) -> Result<Url> {
        let url = match dispatch {
            Dispatch::Create => Url::parse(&self.base_url)?,
            Dispatch::Update(id) => {
                let mut url = self.base_url.to_string();

                if !url.ends_with('/') {
                    url.push('/');
                }

                url.push_str(&id.to_string());
                url.push('/');

                Url::parse(&url)?
            }
        };

        Ok(url)
    }

    /// Create or update the remote record depending on `request.record_id`.
    pub async fn upload(&self, request: UploadRequest) -> Result<Published> {
        let dispatch = request.dispatch();
        let url = self.endpoint(&dispatch)?;
        let method = dispatch.method();

        tracing::debug!(%method, %url, file = %request.file_name, "uploading document");

        let form = request.into_form()?;

        let response = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    Error::Request(e)
                } else {
                    Error::Transport(e)
                }
            })?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body = (!bytes.is_empty()).then(|| String::from_utf8_lossy(&bytes).into_owned());

            // Empty for codes without a reason phrase, rendered by `errors::status_line`.
            return Err(Error::Rejected {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_owned(),
                body,
            });
        }

        let raw = serde_json::from_slice::<serde_json::Value>(&bytes)?;

        if !raw.is_object() {
            return Err(Error::NotAnObject);
        }

        let record = serde_json::from_value::<PublishRecord>(raw.clone())?;

        if record.id.is_none() {
            return Err(Error::MissingId);
        }

        Ok(Published { record, raw })
    }
}
