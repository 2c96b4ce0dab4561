use thiserror::Error;

/// Failures talking to the dashboard REST endpoints
#[derive(Error, Debug)]
pub enum FetchError {
    /// Request could not be sent or the body could not be read
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("server responded with status {0}")]
    Status(reqwest::StatusCode),

    /// Endpoint path could not be joined onto the backend URL
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    /// Downloaded report could not be written to disk
    #[error("failed to save report: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures on the push channel
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("malformed packet: {0}")]
    Malformed(String),

    #[error("invalid channel url: {0}")]
    Url(String),

    /// Server refused the namespace connection
    #[error("connection refused by server: {0}")]
    Refused(String),

    #[error("channel closed by server")]
    Closed,

    /// Nothing arrived from the server within one ping interval plus timeout
    #[error("no frame from server for {0:?}")]
    HeartbeatTimeout(std::time::Duration),
}

/// Failures enabling the alarm sound
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// Host refused audio output
    #[error("sound permission denied: {0}")]
    PermissionDenied(String),

    /// No usable audio output
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
}
