//! Content-type sniffing for uploads that did not declare one.
//!
//! Works on any byte stream: the first bytes are peeked for the guess and
//! then chained back in front of the remainder, so downstream readers see
//! the exact original sequence. No seeking required.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

/// Number of leading bytes inspected when guessing a content type.
const SNIFF_LEN: usize = 512;

const OCTET_STREAM: &str = "application/octet-stream";
const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

/// Guess the MIME type of `source` from its first [`SNIFF_LEN`] bytes.
///
/// Returns the guess together with a reader reproducing the full original
/// stream. A stream shorter than [`SNIFF_LEN`] is sniffed on whatever prefix
/// exists; only read errors other than end-of-stream are surfaced.
pub async fn sniff<R>(mut source: R) -> io::Result<(String, impl AsyncRead + Send + Unpin)>
where
    R: AsyncRead + Send + Unpin,
{
    let mut head = Vec::with_capacity(SNIFF_LEN);
    (&mut source)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .await?;

    let content_type = detect(&head);
    Ok((content_type, io::Cursor::new(head).chain(source)))
}

/// Magic bytes first; otherwise NUL-free UTF-8 counts as plain text and
/// anything else is an opaque octet stream. An empty prefix reads as text.
fn detect(head: &[u8]) -> String {
    if let Some(kind) = infer::get(head) {
        return kind.mime_type().to_string();
    }
    if !head.contains(&0) && std::str::from_utf8(head).is_ok() {
        return PLAIN_TEXT.to_string();
    }
    OCTET_STREAM.to_string()
}
