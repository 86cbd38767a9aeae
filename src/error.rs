use thiserror::Error;

#[derive(Error, Debug)]
pub enum TdError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("tournament endpoint returned an empty document")]
    EmptyTournament,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("unrated input: {0}")]
    UnratedInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TdError>;
