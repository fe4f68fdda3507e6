pub mod client;
pub mod error;

pub use client::{ByteSource, Client, MediaUpload};
pub use error::TelegramError;
