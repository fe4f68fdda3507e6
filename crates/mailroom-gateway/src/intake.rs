//! Multipart form intake: submission text plus ordered upload descriptors.

use std::io;

use axum::extract::multipart::{Multipart, MultipartError};
use thiserror::Error;

use mailroom_telegram::ByteSource;

use crate::sniff;

/// One submitted file part, ready for delivery.
pub struct Upload {
    pub file_name: String,
    /// Declared multipart header value when non-empty, else the sniffed type.
    pub content_type: String,
    pub content: ByteSource,
}

/// Everything extracted from one multipart submission.
pub struct Submission {
    /// Trimmed value of the `text` field; empty when absent.
    pub text: String,
    /// File parts in submission order.
    pub uploads: Vec<Upload>,
}

impl std::fmt::Debug for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submission")
            .field("text", &self.text)
            .field(
                "uploads",
                &self
                    .uploads
                    .iter()
                    .map(|u| (u.file_name.as_str(), u.content_type.as_str()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum IntakeError {
    /// The form itself could not be parsed.
    #[error("invalid multipart payload: {0}")]
    Form(#[from] MultipartError),

    /// A file part was received but its bytes could not be consumed.
    #[error("reading file {file_name:?}: {source}")]
    File {
        file_name: String,
        #[source]
        source: io::Error,
    },
}

/// Drain the whole form. Any failure on a single file part aborts the
/// collection — partial upload lists are never returned. Buffers behind the
/// consumed parts are dropped with the returned values.
pub async fn read_form(mut form: Multipart) -> Result<Submission, IntakeError> {
    let mut text: Option<String> = None;
    let mut uploads = Vec::new();

    while let Some(field) = form.next_field().await? {
        match field.file_name().map(str::to_owned) {
            None => {
                // First `text` field wins; other bare fields are ignored.
                if field.name() == Some("text") && text.is_none() {
                    text = Some(field.text().await?);
                }
            }
            Some(file_name) => {
                let declared = field
                    .content_type()
                    .filter(|value| !value.is_empty())
                    .map(str::to_owned);
                let data = field.bytes().await.map_err(|err| IntakeError::File {
                    file_name: file_name.clone(),
                    source: io::Error::other(err),
                })?;

                let upload = match declared {
                    Some(content_type) => Upload {
                        file_name,
                        content_type,
                        content: Box::new(io::Cursor::new(data)),
                    },
                    None => {
                        let (content_type, content) = sniff::sniff(io::Cursor::new(data))
                            .await
                            .map_err(|source| IntakeError::File {
                                file_name: file_name.clone(),
                                source,
                            })?;
                        Upload {
                            file_name,
                            content_type,
                            content: Box::new(content),
                        }
                    }
                };
                uploads.push(upload);
            }
        }
    }

    Ok(Submission {
        text: text.map(|t| t.trim().to_string()).unwrap_or_default(),
        uploads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;
    use tokio::io::AsyncReadExt;

    const BOUNDARY: &str = "form-seam";

    /// Assemble a raw multipart body from (headers, payload) pairs.
    fn multipart_body(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (headers, payload) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n{headers}\r\n\r\n").as_bytes());
            body.extend_from_slice(payload);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn form_from(body: Vec<u8>) -> Multipart {
        let request = Request::builder()
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request");
        Multipart::from_request(request, &()).await.expect("extract")
    }

    async fn read_back(mut content: ByteSource) -> Vec<u8> {
        let mut buf = Vec::new();
        content.read_to_end(&mut buf).await.expect("read");
        buf
    }

    #[tokio::test]
    async fn empty_form_yields_nothing() {
        let form = form_from(format!("--{BOUNDARY}--\r\n").into_bytes()).await;
        let submission = read_form(form).await.expect("read");
        assert_eq!(submission.text, "");
        assert!(submission.uploads.is_empty());
    }

    #[tokio::test]
    async fn text_field_is_trimmed() {
        let body = multipart_body(&[(
            r#"Content-Disposition: form-data; name="text""#,
            b"  hello world \n",
        )]);
        let submission = read_form(form_from(body).await).await.expect("read");
        assert_eq!(submission.text, "hello world");
        assert!(submission.uploads.is_empty());
    }

    #[tokio::test]
    async fn declared_content_type_wins_over_sniffing() {
        // Payload bytes look like plain text; the declared value must be
        // used verbatim anyway.
        let body = multipart_body(&[(
            "Content-Disposition: form-data; name=\"file\"; filename=\"data.custom\"\r\nContent-Type: application/x-custom",
            b"just some text bytes",
        )]);
        let submission = read_form(form_from(body).await).await.expect("read");
        assert_eq!(submission.uploads.len(), 1);
        assert_eq!(submission.uploads[0].content_type, "application/x-custom");
    }

    #[tokio::test]
    async fn missing_content_type_is_sniffed() {
        let png: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let body = multipart_body(&[(
            r#"Content-Disposition: form-data; name="file"; filename="pic""#,
            png,
        )]);
        let submission = read_form(form_from(body).await).await.expect("read");
        assert_eq!(submission.uploads[0].content_type, "image/png");
    }

    #[tokio::test]
    async fn sniffed_upload_replays_original_bytes() {
        let payload: Vec<u8> = (0..1500u32).map(|i| (i % 250) as u8 + 1).collect();
        let body = multipart_body(&[(
            r#"Content-Disposition: form-data; name="file"; filename="blob""#,
            &payload,
        )]);
        let mut submission = read_form(form_from(body).await).await.expect("read");
        let upload = submission.uploads.remove(0);
        assert_eq!(read_back(upload.content).await, payload);
    }

    #[tokio::test]
    async fn uploads_keep_submission_order() {
        let body = multipart_body(&[
            (
                "Content-Disposition: form-data; name=\"a\"; filename=\"one.txt\"\r\nContent-Type: text/plain",
                b"1".as_slice(),
            ),
            (
                r#"Content-Disposition: form-data; name="text""#,
                b"caption".as_slice(),
            ),
            (
                "Content-Disposition: form-data; name=\"b\"; filename=\"two.txt\"\r\nContent-Type: text/plain",
                b"2".as_slice(),
            ),
            (
                "Content-Disposition: form-data; name=\"a\"; filename=\"three.txt\"\r\nContent-Type: text/plain",
                b"3".as_slice(),
            ),
        ]);
        let submission = read_form(form_from(body).await).await.expect("read");
        assert_eq!(submission.text, "caption");
        let names: Vec<&str> = submission
            .uploads
            .iter()
            .map(|u| u.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["one.txt", "two.txt", "three.txt"]);
    }

    #[tokio::test]
    async fn malformed_form_is_an_error() {
        // Truncated: opening boundary, no terminator.
        let body = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\nhi");
        let form = form_from(body.into_bytes()).await;
        let err = read_form(form).await.unwrap_err();
        assert!(matches!(err, IntakeError::Form(_)));
    }
}
