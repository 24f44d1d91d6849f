use thiserror::Error;

#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid JSON line {line:?}: {source}")]
    Decode {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response line is not valid UTF-8")]
    Utf8,

    /// An `error` field reported by the server inside the stream
    #[error("{0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, OllamaError>;
