use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The request never got a response.
    #[error("Transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request could not be built, nothing was sent.
    #[error("Request: {0}")]
    Request(reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Rejected: {}", status_line(*.status, .status_text))]
    Rejected {
        status: u16,
        status_text: String,
        body: Option<String>,
    },

    #[error("Response: {0}")]
    ResponseParse(#[from] serde_json::error::Error),

    #[error("Response: expected a JSON object")]
    NotAnObject,

    #[error("Response: no record id")]
    MissingId,

    #[error("Multipart: {0}")]
    Multipart(reqwest::Error),

    #[error("Parse: {0}")]
    Parse(#[from] url::ParseError),
}

/// `403 Forbidden`, or only the code when there is no reason phrase.
pub fn status_line(status: u16, status_text: &str) -> String {
    if status_text.is_empty() {
        status.to_string()
    } else {
        format!("{} {}", status, status_text)
    }
}

impl Error {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
