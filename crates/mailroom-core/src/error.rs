use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailroomError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("chat directory: {0}")]
    Directory(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MailroomError>;
