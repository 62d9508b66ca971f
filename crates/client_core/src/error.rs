use thiserror::Error;

/// The request never produced a usable response body.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid service url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("service responded with status {status}")]
    Status { status: u16 },
    /// Raised by transports that are not backed by reqwest.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
    /// The transport call panicked or was cancelled.
    #[error("transport task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// The response body does not have the `TopicResult` shape.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty response body")]
    EmptyBody,
    #[error("malformed topic payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl SubmitError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
        }
    }
}
