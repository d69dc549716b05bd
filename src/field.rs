use std::borrow::Cow;
use std::path::Path;

use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use http::header::{self, HeaderMap};

use crate::constants;
use crate::content_disposition::ContentDisposition;

/// One boundary-delimited segment as extracted from the stream: the part's
/// header map (absent when the stream ended before any header line) and its
/// raw content bytes. Produced once per part, consumed once by the
/// aggregator.
pub(crate) struct RawField {
    pub(crate) headers: Option<HeaderMap>,
    pub(crate) body: Bytes,
}

/// A decoded form field, either a text value or a file attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    name: String,
    file_name: Option<String>,
    content_type: mime::Mime,
    extension: String,
    content: FieldContent,
}

/// Field payload: decoded text for plain fields, raw bytes for files.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldContent {
    Text(String),
    Bytes(Bytes),
}

impl FieldInfo {
    /// Applies the classification rule to a raw part: a `filename` parameter
    /// makes it a file (bytes kept raw), otherwise it is a text field decoded
    /// with the charset named in its content type. Parts without a usable
    /// `name` are skipped.
    pub(crate) fn classify(raw: RawField, disposition: ContentDisposition) -> Option<FieldInfo> {
        let name = disposition.field_name?;

        let content_type = raw
            .headers
            .as_ref()
            .and_then(|headers| headers.get(header::CONTENT_TYPE))
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<mime::Mime>().ok());

        match disposition.file_name {
            Some(file_name) => {
                let extension = file_extension(&file_name);
                Some(FieldInfo {
                    name,
                    extension,
                    content_type: content_type.unwrap_or(mime::APPLICATION_OCTET_STREAM),
                    content: FieldContent::Bytes(raw.body),
                    file_name: Some(file_name),
                })
            }
            None => {
                let content_type = content_type.unwrap_or(mime::TEXT_PLAIN);
                let text = decode_text(&raw.body, &content_type);
                Some(FieldInfo {
                    name,
                    file_name: None,
                    content_type,
                    extension: constants::TEXT_EXTENSION.to_owned(),
                    content: FieldContent::Text(text),
                })
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The original filename from the Content-Disposition header, for file
    /// fields that carried one.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn content_type(&self) -> &mime::Mime {
        &self.content_type
    }

    /// Extension with a leading dot, derived from the filename; `.txt` for
    /// text fields, empty when a filename has no extension.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn content(&self) -> &FieldContent {
        &self.content
    }

    pub fn is_file(&self) -> bool {
        matches!(self.content, FieldContent::Bytes(_))
    }

    /// The decoded value of a text field.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            FieldContent::Text(text) => Some(text),
            FieldContent::Bytes(_) => None,
        }
    }

    /// The raw bytes of a file field.
    pub fn bytes(&self) -> Option<&Bytes> {
        match &self.content {
            FieldContent::Bytes(bytes) => Some(bytes),
            FieldContent::Text(_) => None,
        }
    }
}

/// Decodes text content with the charset declared in the part's content type,
/// defaulting to UTF-8. Decoder state is local to the call.
fn decode_text(bytes: &[u8], content_type: &mime::Mime) -> String {
    let encoding = content_type
        .get_param(mime::CHARSET)
        .and_then(|charset| Encoding::for_label(charset.as_str().as_bytes()))
        .unwrap_or(UTF_8);

    let (text, _, _) = encoding.decode(bytes);

    match text {
        Cow::Owned(s) => s,
        Cow::Borrowed(s) => String::from(s),
    }
}

fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
