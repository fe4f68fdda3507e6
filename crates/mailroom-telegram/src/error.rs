use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    /// Caller handed `send_media_group` an empty upload list.
    #[error("media group requires at least one upload")]
    EmptyMediaGroup,

    #[error("read upload {file_name:?}: {source}")]
    ReadUpload {
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("encode media descriptors: {0}")]
    EncodeMedia(#[from] serde_json::Error),

    /// The Bot API answered with a non-success status.
    #[error("telegram returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, TelegramError>;
