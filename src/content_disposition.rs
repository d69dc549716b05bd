use http::header::{self, HeaderMap};

use crate::constants;

/// The `name` and `filename` parameters of a part's Content-Disposition
/// header. Parsed from the raw header bytes so non-ASCII values survive; a
/// part with no usable `name` is skipped by the aggregator.
#[derive(Default)]
pub(crate) struct ContentDisposition {
    pub(crate) field_name: Option<String>,
    pub(crate) file_name: Option<String>,
}

impl ContentDisposition {
    pub fn parse(headers: &HeaderMap) -> ContentDisposition {
        let content_disposition = headers
            .get(header::CONTENT_DISPOSITION)
            .map(|val| val.as_bytes());

        let field_name = content_disposition
            .and_then(|val| constants::CONTENT_DISPOSITION_FIELD_NAME_RE.captures(val))
            .and_then(|cap| cap.get(1))
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned());

        let file_name = content_disposition
            .and_then(|val| constants::CONTENT_DISPOSITION_FILE_NAME_RE.captures(val))
            .and_then(|cap| cap.get(1))
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned());

        ContentDisposition { field_name, file_name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::HeaderValue;

    fn headers_with_disposition(val: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(val).unwrap(),
        );
        headers
    }

    #[test]
    fn test_text_part() {
        let headers = headers_with_disposition(r#"form-data; name="title""#);
        let cd = ContentDisposition::parse(&headers);
        assert_eq!(cd.field_name.as_deref(), Some("title"));
        assert_eq!(cd.file_name, None);
    }

    #[test]
    fn test_file_part() {
        let headers = headers_with_disposition(r#"form-data; name="upload"; filename="cat photo.png""#);
        let cd = ContentDisposition::parse(&headers);
        assert_eq!(cd.field_name.as_deref(), Some("upload"));
        assert_eq!(cd.file_name.as_deref(), Some("cat photo.png"));
    }

    #[test]
    fn test_missing_header() {
        let cd = ContentDisposition::parse(&HeaderMap::new());
        assert_eq!(cd.field_name, None);
        assert_eq!(cd.file_name, None);
    }
}
