use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Publish: {0}")]
    PublishApi(#[from] publish_api::errors::Error),

    #[error("IO: {0}")]
    IO(#[from] std::io::Error),

    #[error("Yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Url: {0}")]
    Url(#[from] url::ParseError),

    #[error("REST Publish: Setting {0} is not configured")]
    MissingSetting(&'static str),

    #[error("REST Publish: Cannot process file, please use a markdown file")]
    Markdown,

    #[error("REST Publish: Front matter must be a mapping")]
    FrontMatter,

    #[error("REST Publish: Document not found")]
    DocumentNotFound,
}

impl Error {
    /// The request never reached the server or the connection dropped.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::PublishApi(e) if e.is_transport())
    }

    /// The server answered with a non-success status.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::PublishApi(e) if e.is_rejected())
    }
}
