//! `multipart/form-data` bodies for binary uploads.

use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

const CRLF: &[u8] = b"\r\n";

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Form field name.
    pub name: String,
    /// File name, set for binary fields.
    pub filename: Option<String>,
    /// Content type, set for binary fields.
    pub content_type: Option<String>,
    /// Raw field value.
    pub data: Bytes,
}

/// An ordered multipart form with its own boundary token.
///
/// Each form gets a fresh random boundary. If a part happens to contain the
/// boundary, a new one is drawn.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<Part>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self {
            boundary: fresh_boundary(),
            parts: Vec::new(),
        }
    }

    /// Adds a text field.
    #[must_use]
    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.part(Part {
            name: name.into(),
            filename: None,
            content_type: None,
            data: Bytes::from(value.into()),
        })
    }

    /// Adds a text field when `value` is present.
    #[must_use]
    pub fn text_opt(self, name: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.text(name, v.to_string()),
            None => self,
        }
    }

    /// Adds a binary field. The content type is guessed from `filename`.
    #[must_use]
    pub fn file(
        self,
        name: impl Into<String>,
        filename: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .essence_str()
            .to_owned();
        self.file_with_type(name, filename, content_type, data)
    }

    /// Adds a binary field with an explicit content type.
    #[must_use]
    pub fn file_with_type(
        self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.part(Part {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
            data: data.into(),
        })
    }

    fn part(mut self, part: Part) -> Self {
        while contains(&part.data, self.boundary.as_bytes()) {
            self.boundary = fresh_boundary();
        }
        self.parts.push(part);
        self
    }

    /// The boundary token, without leading dashes.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Fields in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Value for the `Content-Type` request header.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Serializes the form into a request body.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let size: usize = self
            .parts
            .iter()
            .map(|p| p.data.len() + p.name.len() + self.boundary.len() + 128)
            .sum();
        let mut buf = BytesMut::with_capacity(size + self.boundary.len() + 8);

        for part in &self.parts {
            buf.put_slice(b"--");
            buf.put_slice(self.boundary.as_bytes());
            buf.put_slice(CRLF);

            buf.put_slice(b"Content-Disposition: form-data; name=\"");
            buf.put_slice(escape_quoted(&part.name).as_bytes());
            buf.put_u8(b'"');
            if let Some(filename) = &part.filename {
                buf.put_slice(b"; filename=\"");
                buf.put_slice(escape_quoted(filename).as_bytes());
                buf.put_u8(b'"');
            }
            buf.put_slice(CRLF);

            if let Some(content_type) = &part.content_type {
                buf.put_slice(b"Content-Type: ");
                buf.put_slice(content_type.as_bytes());
                buf.put_slice(CRLF);
            }

            buf.put_slice(CRLF);
            buf.put_slice(&part.data);
            buf.put_slice(CRLF);
        }

        buf.put_slice(b"--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(b"--");
        buf.put_slice(CRLF);

        buf.freeze()
    }
}

fn fresh_boundary() -> String {
    format!("relay-{}", Uuid::new_v4().simple())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

// Percent-encodes the characters that would end the quoted string or the
// header line, as browsers do for form-data names and filenames.
fn escape_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("%22"),
            '\r' => out.push_str("%0D"),
            '\n' => out.push_str("%0A"),
            c => out.push(c),
        }
    }
    out
}
