use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid roster: {0}")]
    InvalidRoster(String),
}

impl Error {
    pub fn invalid_roster(msg: impl Into<String>) -> Self {
        Self::InvalidRoster(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
