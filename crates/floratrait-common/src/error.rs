use thiserror::Error;

#[derive(Debug, Error)]
pub enum FloratraitError {
    #[error("Vocabulary table error: {0}")]
    Vocabulary(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FloratraitError>;
