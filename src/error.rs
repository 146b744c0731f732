use thiserror::Error;

#[derive(Error, Debug)]
pub enum DexError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Malformed entry URL: {0}")]
    EntryUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DexError>;
