//! Uploaded files and multipart body encoding.

use bytes::Bytes;
use uuid::Uuid;

/// In-memory stand-in for a file a client would upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

impl UploadedFile {
    /// File with the given name and contents, typed `application/octet-stream`.
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: "application/octet-stream".to_string(),
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }
}

/// An uploaded file bound to the form field that carries it.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub name: String,
    pub file: UploadedFile,
}

/// Fresh boundary marker, unique per request so payload text cannot collide.
pub(crate) fn boundary() -> String {
    format!("fixture-{}", Uuid::now_v7().simple())
}

/// `Content-Disposition` quoted strings cannot carry `"` or line breaks;
/// encode them `%22`/`%0D`/`%0A`, the way browsers submit such names.
fn escape_disposition(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Encode text fields and file parts as a `multipart/form-data` body.
///
/// Wire shape per RFC 7578: each part opens with `--boundary`, carries its
/// `Content-Disposition` (and `Content-Type` for files), and the body closes
/// with `--boundary--`. Lines end CRLF throughout.
pub(crate) fn encode_multipart(
    fields: &[(&str, &str)],
    parts: &[FilePart],
    boundary: &str,
) -> Bytes {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                escape_disposition(name)
            )
            .as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    for part in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                escape_disposition(&part.name),
                escape_disposition(part.file.filename())
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!("Content-Type: {}\r\n\r\n", part.file.content_type()).as_bytes(),
        );
        body.extend_from_slice(part.file.bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    Bytes::from(body)
}
