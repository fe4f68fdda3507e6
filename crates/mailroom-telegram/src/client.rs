//! Thin client for the Telegram Bot API.
//!
//! Two operations: a plain text send and a media-group send that bundles
//! several attachments into one message. Exactly one HTTP call per
//! operation — no retries; callers wanting stronger delivery semantics build
//! them on top.

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Result, TelegramError};

const DEFAULT_API_URL: &str = "https://api.telegram.org";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Readable byte source backing a media upload. The client reads it to
/// completion exactly once; where the bytes live (memory, disk, a socket)
/// is the caller's business.
pub type ByteSource = Box<dyn AsyncRead + Send + Unpin>;

/// A single attachment inside a media group.
pub struct MediaUpload {
    /// Media kind for the descriptor array; `None` means `"document"`.
    pub kind: Option<String>,
    /// Original filename; empty falls back to the generated part name.
    pub file_name: String,
    /// MIME type; empty falls back to `application/octet-stream`.
    pub content_type: String,
    /// Caption rendered with this item. Telegram shows a media-group caption
    /// only when exactly one item carries it, so callers set it on the first.
    pub caption: Option<String>,
    pub content: ByteSource,
}

/// One JSON entry of the `media` field in a sendMediaGroup call.
#[derive(Serialize)]
struct MediaItem<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
}

/// Client for the Telegram Bot API.
pub struct Client {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl Client {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_url(token, DEFAULT_API_URL)
    }

    /// Point the client at a different API origin (tests, proxies).
    pub fn with_api_url(token: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            token: token.into(),
        }
    }

    /// Send a plain text message to `chat_id`.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.token);
        let resp = self
            .http
            .post(&url)
            .form(&[("chat_id", chat_id), ("text", text)])
            .send()
            .await?;
        check_status(resp).await
    }

    /// Upload `uploads` as one media group.
    ///
    /// Builds a single multipart request: the `media` field holds a JSON
    /// array of descriptors, each pointing at its binary part through an
    /// `attach://file<i>` reference. Every upload's source is read to
    /// completion before the request goes out; a read failure on any one of
    /// them aborts the whole send.
    pub async fn send_media_group(&self, chat_id: &str, uploads: Vec<MediaUpload>) -> Result<()> {
        if uploads.is_empty() {
            return Err(TelegramError::EmptyMediaGroup);
        }

        let items: Vec<MediaItem<'_>> = uploads
            .iter()
            .enumerate()
            .map(|(i, upload)| MediaItem {
                kind: upload.kind.as_deref().unwrap_or("document"),
                media: format!("attach://file{i}"),
                caption: upload.caption.as_deref(),
            })
            .collect();
        let media_json = serde_json::to_string(&items)?;

        let mut form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("media", media_json);

        for (i, upload) in uploads.into_iter().enumerate() {
            let mut content = upload.content;
            let mut buf = Vec::new();
            content
                .read_to_end(&mut buf)
                .await
                .map_err(|source| TelegramError::ReadUpload {
                    file_name: upload.file_name.clone(),
                    source,
                })?;

            let file_name = if upload.file_name.is_empty() {
                format!("file{i}")
            } else {
                upload.file_name
            };
            let content_type = if upload.content_type.is_empty() {
                FALLBACK_CONTENT_TYPE.to_string()
            } else {
                upload.content_type
            };

            let part = reqwest::multipart::Part::bytes(buf)
                .file_name(file_name)
                .mime_str(&content_type)?;
            form = form.part(format!("file{i}"), part);
        }

        let url = format!("{}/bot{}/sendMediaGroup", self.api_url, self.token);
        let resp = self.http.post(&url).multipart(form).send().await?;
        check_status(resp).await
    }
}

async fn check_status(resp: reqwest::Response) -> Result<()> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(TelegramError::Api {
        status: status.as_u16(),
        body,
    })
}
